// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pgcopy_adapters::FakeApplyConnection;
use pgcopy_core::{ChangeAction, ColumnValue, DecodedMessage, FakeClock, Lsn, Tuple, Workdir};
use pgcopy_storage::CatalogStore;

use super::*;
use crate::follow::transformer::transform_segment;
use crate::RunOptions;

fn new_ctx(dir: &std::path::Path) -> Ctx<FakeClock> {
    let workdir = Workdir::new(dir);
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    std::fs::create_dir_all(workdir.cdc_dir()).unwrap();
    Ctx::new(workdir, RunOptions::default(), FakeClock::new())
}

fn write_segment(cdc_dir: &std::path::Path, id: SegmentId, messages: &[DecodedMessage]) {
    let rendered = transform_segment(messages);
    let paths = pgcopy_core::SegmentPaths::new(cdc_dir, id);
    std::fs::write(paths.sql_path, rendered).unwrap();
}

fn one_row_transaction(begin_lsn: Lsn, commit_lsn: Lsn) -> Vec<DecodedMessage> {
    vec![
        DecodedMessage {
            action: ChangeAction::Begin,
            xid: Some(1),
            lsn: begin_lsn,
            timestamp: Some(1000),
            schema: None,
            table: None,
            new: None,
            old: None,
        },
        DecodedMessage {
            action: ChangeAction::Insert,
            xid: Some(1),
            lsn: begin_lsn,
            timestamp: Some(1000),
            schema: Some("public".to_string()),
            table: Some("accounts".to_string()),
            new: Some(Tuple {
                cols: vec!["id".to_string()],
                values: vec![ColumnValue {
                    oid: 0,
                    val: Some("1".to_string()),
                    is_null: false,
                    is_quoted: false,
                }],
            }),
            old: None,
        },
        DecodedMessage {
            action: ChangeAction::Commit,
            xid: Some(1),
            lsn: commit_lsn,
            timestamp: Some(1001),
            schema: None,
            table: None,
            new: None,
            old: None,
        },
    ]
}

#[tokio::test]
async fn a_transaction_is_applied_and_recorded_in_the_lsn_tracking_table() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let catalog = CatalogStore::open_with_clock(ctx.workdir.catalog_db_file(), FakeClock::new()).unwrap();
    catalog.setup_sentinel(Lsn::ZERO).unwrap();

    let begin_lsn = Lsn::new(0, 0x10);
    let commit_lsn = Lsn::new(0, 0x20);
    write_segment(&ctx.workdir.cdc_dir(), SegmentId(begin_lsn), &one_row_transaction(begin_lsn, commit_lsn));

    let conn = FakeApplyConnection::new();
    let options = ApplierOptions {
        origin_name: "pgcopydb".to_string(),
    };

    let report = run_applier(&ctx, &catalog, &conn, &options).await.unwrap();
    assert_eq!(report.transactions_applied, 1);
    assert_eq!(report.transactions_skipped, 0);
    assert_eq!(report.segments_applied, 1);
    assert_eq!(report.last_lsn, commit_lsn);

    let committed = conn.committed_statements();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].0, begin_lsn);
    assert_eq!(committed[0].1.len(), 1);
    assert!(committed[0].1[0].starts_with("INSERT INTO"));

    let mappings = catalog.lsn_mappings_newest_first().unwrap();
    assert_eq!(mappings[0].source_lsn, begin_lsn);

    let sentinel = catalog.sentinel().unwrap().unwrap();
    assert_eq!(sentinel.replay_lsn, commit_lsn);
}

#[tokio::test]
async fn a_transaction_already_applied_under_the_origin_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let catalog = CatalogStore::open_with_clock(ctx.workdir.catalog_db_file(), FakeClock::new()).unwrap();
    catalog.setup_sentinel(Lsn::ZERO).unwrap();

    let begin_lsn = Lsn::new(0, 0x10);
    let commit_lsn = Lsn::new(0, 0x20);
    write_segment(&ctx.workdir.cdc_dir(), SegmentId(begin_lsn), &one_row_transaction(begin_lsn, commit_lsn));

    let conn = FakeApplyConnection::new();
    conn.set_origin_progress("pgcopydb", Lsn::new(0, 0x30));
    let options = ApplierOptions {
        origin_name: "pgcopydb".to_string(),
    };

    let report = run_applier(&ctx, &catalog, &conn, &options).await.unwrap();
    assert_eq!(report.transactions_applied, 0);
    assert_eq!(report.transactions_skipped, 1);
    assert!(conn.committed_statements().is_empty());
    assert!(conn.calls().iter().all(|call| !matches!(call, pgcopy_adapters::ApplyCall::BeginWithOrigin { .. })));
}

#[tokio::test]
async fn already_reached_endpos_returns_immediately_without_touching_segments() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let catalog = CatalogStore::open_with_clock(ctx.workdir.catalog_db_file(), FakeClock::new()).unwrap();
    catalog.setup_sentinel(Lsn::ZERO).unwrap();
    catalog.update_endpos(Lsn::ZERO).unwrap();

    let conn = FakeApplyConnection::new();
    let options = ApplierOptions {
        origin_name: "pgcopydb".to_string(),
    };

    let report = run_applier(&ctx, &catalog, &conn, &options).await.unwrap();
    assert!(report.reached_endpos);
    assert!(conn.calls().iter().all(|call| matches!(call, pgcopy_adapters::ApplyCall::SetupOrigin { .. })));
}

#[tokio::test]
async fn resuming_republishes_sentinel_startpos_from_a_caught_up_tracked_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let catalog = CatalogStore::open_with_clock(ctx.workdir.catalog_db_file(), FakeClock::new()).unwrap();
    catalog.setup_sentinel(Lsn::ZERO).unwrap();

    // Simulate a prior run's tracked mappings, the last of which the
    // target has actually reached (target_insert_lsn 2).
    catalog.add_lsn_mapping(Lsn::new(0, 0x10), Lsn::new(0, 1)).unwrap();
    catalog.add_lsn_mapping(Lsn::new(0, 0x20), Lsn::new(0, 2)).unwrap();

    let conn = FakeApplyConnection::new();
    conn.set_target_insert_lsn(Lsn::new(0, 2));
    let options = ApplierOptions {
        origin_name: "pgcopydb".to_string(),
    };

    run_applier(&ctx, &catalog, &conn, &options).await.unwrap();

    let sentinel = catalog.sentinel().unwrap().unwrap();
    assert_eq!(sentinel.startpos, Lsn::new(0, 0x20));
}

#[tokio::test]
async fn a_keepalive_marker_outside_a_transaction_advances_replay_lsn() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let catalog = CatalogStore::open_with_clock(ctx.workdir.catalog_db_file(), FakeClock::new()).unwrap();
    catalog.setup_sentinel(Lsn::ZERO).unwrap();

    let keepalive_lsn = Lsn::new(0, 0x40);
    write_segment(
        &ctx.workdir.cdc_dir(),
        SegmentId(keepalive_lsn),
        &[DecodedMessage::keepalive(keepalive_lsn)],
    );

    let conn = FakeApplyConnection::new();
    let options = ApplierOptions {
        origin_name: "pgcopydb".to_string(),
    };

    let report = run_applier(&ctx, &catalog, &conn, &options).await.unwrap();
    assert_eq!(report.last_lsn, keepalive_lsn);
    assert_eq!(catalog.sentinel().unwrap().unwrap().replay_lsn, keepalive_lsn);
}
