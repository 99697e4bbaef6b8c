// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_table() -> SourceTable {
    SourceTable {
        oid: 16400,
        namespace: "public".into(),
        relname: "accounts".into(),
        est_row_count: 1_000_000,
        relation_size: 256 * 1024 * 1024,
        partition_key: PartitionKey::PrimaryKey("id".into()),
        restore_list_name: "public accounts postgres".into(),
    }
}

#[test]
fn qualified_name_joins_namespace_and_relname() {
    assert_eq!(sample_table().qualified_name(), "public.accounts");
}

#[test]
fn partition_key_variants_roundtrip_via_serde() {
    let pk = PartitionKey::Ctid;
    let json = serde_json::to_string(&pk).unwrap();
    let back: PartitionKey = serde_json::from_str(&json).unwrap();
    assert_eq!(pk, back);
}

#[test]
fn source_index_flags_are_independent() {
    let idx = SourceIndex {
        oid: 1,
        table_oid: 16400,
        index_name: "accounts_pkey".into(),
        is_constraint: true,
        is_primary: true,
        definition: "CREATE UNIQUE INDEX accounts_pkey ON public.accounts USING btree (id)".into(),
        restore_list_name: "public accounts_pkey postgres".into(),
    };
    assert!(idx.is_constraint);
    assert!(idx.is_primary);
}

#[test]
fn source_sequence_is_copy() {
    let seq = SourceSequence {
        oid: 2,
        last_value: 42,
        is_called: true,
    };
    let copied = seq;
    assert_eq!(seq.last_value, copied.last_value);
}
