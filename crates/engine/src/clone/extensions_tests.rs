// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::{FakeSourceConnection, FakeTargetConnection, SourceCall, TargetCall};
use pgcopy_core::{FilterDecision, FilterKey};

fn extension(oid: u32, name: &str, config_relations: Vec<ExtConfigRelation>) -> SourceExtension {
    SourceExtension {
        oid,
        extname: name.to_string(),
        extversion: "1.2".to_string(),
        restore_list_name: name.to_string(),
        config_relations,
    }
}

fn table_relation(condition: Option<&str>) -> ExtConfigRelation {
    ExtConfigRelation {
        namespace: "public".to_string(),
        relname: "spatial_ref_sys".to_string(),
        relkind: 'r',
        condition: condition.map(str::to_string),
    }
}

fn sequence_relation() -> ExtConfigRelation {
    ExtConfigRelation {
        namespace: "public".to_string(),
        relname: "my_ext_seq".to_string(),
        relkind: 'S',
        condition: None,
    }
}

#[tokio::test]
async fn extensions_are_created_with_their_source_version() {
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let extensions = vec![extension(1, "pgcrypto", Vec::new())];
    let filters = FilterSet::new();

    let outcome = restore_extensions(&source, &target, &extensions, &filters).await.unwrap();
    assert_eq!(outcome.extensions_created, 1);
    assert_eq!(outcome.config_relations_copied, 0);
    assert_eq!(
        target.calls(),
        vec![TargetCall::CreateExtensionIfNotExists {
            name: "pgcrypto".to_string(),
            version: Some("1.2".to_string()),
        }]
    );
}

#[tokio::test]
async fn a_skipped_extension_is_not_created() {
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let extensions = vec![extension(1, "postgis", vec![table_relation(None)])];
    let mut filters = FilterSet::new();
    filters.insert(FilterDecision {
        key: FilterKey::Oid(1),
        kind: FilterKind::SkipExtension,
    });

    let outcome = restore_extensions(&source, &target, &extensions, &filters).await.unwrap();
    assert_eq!(outcome.extensions_created, 0);
    assert_eq!(outcome.config_relations_copied, 0);
    assert!(target.calls().is_empty());
}

#[tokio::test]
async fn config_table_is_copied_with_its_where_condition() {
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_copy_payload(
        "COPY (SELECT * FROM public.spatial_ref_sys WHERE auth_name = 'postgis') TO STDOUT",
        b"1\tpostgis\n".to_vec(),
    );
    let extensions = vec![extension(
        1,
        "postgis",
        vec![table_relation(Some("WHERE auth_name = 'postgis'"))],
    )];
    let filters = FilterSet::new();

    let outcome = restore_extensions(&source, &target, &extensions, &filters).await.unwrap();
    assert_eq!(outcome.extensions_created, 1);
    assert_eq!(outcome.config_relations_copied, 1);
    assert!(source.calls().contains(&SourceCall::CopyTableTo {
        copy_query: "COPY (SELECT * FROM public.spatial_ref_sys WHERE auth_name = 'postgis') TO STDOUT".to_string(),
    }));
    assert!(target.calls().iter().any(|call| matches!(
        call,
        TargetCall::CopyExtensionConfig { copy_query, .. } if copy_query == "COPY public.spatial_ref_sys FROM STDIN"
    )));
}

#[tokio::test]
async fn config_sequence_is_restarted_with_setval_instead_of_copied() {
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_sequence_value("public.my_ext_seq", (42, true));
    let extensions = vec![extension(1, "some_ext", vec![sequence_relation()])];
    let filters = FilterSet::new();

    let outcome = restore_extensions(&source, &target, &extensions, &filters).await.unwrap();
    assert_eq!(outcome.config_relations_copied, 1);
    assert_eq!(
        target.calls(),
        vec![
            TargetCall::CreateExtensionIfNotExists {
                name: "some_ext".to_string(),
                version: Some("1.2".to_string()),
            },
            TargetCall::Setval {
                qualified_name: "public.my_ext_seq".to_string(),
                last_value: 42,
                is_called: true,
            },
        ]
    );
}
