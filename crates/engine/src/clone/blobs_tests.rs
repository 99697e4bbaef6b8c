// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::{FakeSourceConnection, FakeTargetConnection};
use pgcopy_core::{FakeClock, Workdir};

fn new_ctx(dir: &std::path::Path) -> Ctx<FakeClock> {
    let workdir = Workdir::new(dir);
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    Ctx::new(workdir, RunOptions::default(), FakeClock::new())
}

#[tokio::test]
async fn a_fresh_blob_is_copied_and_marked_done() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_large_object(99, b"blob bytes".to_vec());

    let outcome = copy_blob(&ctx, &source, &target, 99, false).await.unwrap();
    assert_eq!(outcome, BlobCopyOutcome::Copied { bytes: 10 });
    assert!(ctx.workdir.done_dir().join("lo-99.done").exists());
}

#[tokio::test]
async fn an_already_done_blob_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    std::fs::write(ctx.workdir.done_dir().join("lo-99.done"), "{}").unwrap();
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();

    let outcome = copy_blob(&ctx, &source, &target, 99, false).await.unwrap();
    assert_eq!(outcome, BlobCopyOutcome::AlreadyDone);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn copy_all_blobs_is_a_no_op_when_skip_large_objects_is_set() {
    let dir = tempfile::tempdir().unwrap();
    let workdir = Workdir::new(dir.path());
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    let ctx = Ctx::new(
        workdir,
        RunOptions {
            skip_large_objects: true,
            ..RunOptions::default()
        },
        FakeClock::new(),
    );
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_large_object(1, b"x".to_vec());

    let total = copy_all_blobs(&ctx, &source, &target, false).await.unwrap();
    assert_eq!(total, 0);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn copy_all_blobs_copies_every_fetched_oid() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let source = FakeSourceConnection::new();
    let target = FakeTargetConnection::new();
    source.set_large_object(1, b"aa".to_vec());
    source.set_large_object(2, b"bbbb".to_vec());

    let total = copy_all_blobs(&ctx, &source, &target, false).await.unwrap();
    assert_eq!(total, 6);
}
