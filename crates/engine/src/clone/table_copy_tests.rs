// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::{FakeSourceConnection, FakeTargetConnection, SourceCall};
use pgcopy_core::{FakeClock, FilterDecision, FilterKey, FilterKind, PartitionKey, Workdir};

fn table() -> SourceTable {
    SourceTable {
        oid: 42,
        namespace: "public".to_string(),
        relname: "accounts".to_string(),
        est_row_count: 10,
        relation_size: 100,
        partition_key: PartitionKey::PrimaryKey("id".to_string()),
        restore_list_name: "public.accounts".to_string(),
    }
}

fn new_ctx(dir: &std::path::Path) -> Ctx<FakeClock> {
    let workdir = Workdir::new(dir);
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    Ctx::new(workdir, RunOptions::default(), FakeClock::new())
}

#[tokio::test]
async fn a_table_excluded_from_data_copy_is_skipped_without_touching_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let mut filters = FilterSet::new();
    filters.insert(FilterDecision {
        key: FilterKey::Oid(42),
        kind: FilterKind::ExcludeTableData,
    });

    let outcome = copy_table(&ctx, &source, &target, &table(), &filters, false).await.unwrap();
    assert_eq!(outcome, TableCopyOutcome::FilteredOut);
    assert!(source.calls().is_empty());
    assert!(!ctx.workdir.tables_dir().join("42.lock").exists());
}

#[tokio::test]
async fn a_fresh_table_copies_its_rows_and_writes_a_donefile() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_copy_payload("COPY public.accounts TO STDOUT", b"1\tAlice\n2\tBob\n".to_vec());
    let filters = FilterSet::new();

    let outcome = copy_table(&ctx, &source, &target, &table(), &filters, false).await.unwrap();
    assert_eq!(
        outcome,
        TableCopyOutcome::Copied {
            parts: 1,
            bytes: "1\tAlice\n2\tBob\n".len() as u64,
        }
    );

    let done_path = ctx.workdir.done_dir().join("table-42.done");
    assert!(done_path.exists());
    assert!(!ctx.workdir.tables_dir().join("42.lock").exists());

    let target_calls = target.calls();
    assert_eq!(target_calls.len(), 1);
}

#[tokio::test]
async fn a_table_already_marked_done_is_skipped_without_reconnecting() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    std::fs::write(ctx.workdir.done_dir().join("table-42.done"), "{}").unwrap();
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let filters = FilterSet::new();

    let outcome = copy_table(&ctx, &source, &target, &table(), &filters, false).await.unwrap();
    assert_eq!(outcome, TableCopyOutcome::AlreadyDone);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn a_table_locked_by_a_live_sibling_is_reported_as_owned_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    std::fs::write(ctx.workdir.tables_dir().join("42.lock"), std::process::id().to_string()).unwrap();
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let filters = FilterSet::new();

    let outcome = copy_table(&ctx, &source, &target, &table(), &filters, false).await.unwrap();
    assert_eq!(outcome, TableCopyOutcome::OwnedElsewhere);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn a_large_table_copies_one_part_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let workdir = Workdir::new(dir.path());
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    let ctx = Ctx::new(
        workdir,
        RunOptions {
            split_threshold_bytes: 1_000,
            split_max_parts: 2,
            ..RunOptions::default()
        },
        FakeClock::new(),
    );
    let mut big_table = table();
    big_table.relation_size = 1_000_000;

    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    let filters = FilterSet::new();

    let outcome = copy_table(&ctx, &source, &target, &big_table, &filters, false).await.unwrap();
    assert_eq!(outcome, TableCopyOutcome::Copied { parts: 2, bytes: 0 });

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        match call {
            SourceCall::CopyTableTo { copy_query } => {
                assert!(copy_query.contains("hashtext(\"id\"::text) % 2"));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}
