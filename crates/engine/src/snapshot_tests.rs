// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::FakeSourceConnection;

#[tokio::test]
async fn not_consistent_mode_skips_without_touching_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSourceConnection::new();
    let manager = SnapshotManager::new(&source, dir.path().join("snapshot"));

    let snapshot = manager.prepare("postgres://source", None, false).await.unwrap();
    assert_eq!(snapshot.state, SnapshotState::Skipped);
    assert!(source.adopted_token().is_none());
}

#[tokio::test]
async fn consistent_mode_with_no_token_exports_a_fresh_one() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSourceConnection::new();
    let manager = SnapshotManager::new(&source, dir.path().join("snapshot"));

    let snapshot = manager.prepare("postgres://source", None, true).await.unwrap();
    assert_eq!(snapshot.state, SnapshotState::Exported);
    assert!(!snapshot.token.is_empty());
}

#[tokio::test]
async fn consistent_mode_with_a_token_adopts_it_instead_of_exporting() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSourceConnection::new();
    let manager = SnapshotManager::new(&source, dir.path().join("snapshot"));

    let snapshot = manager
        .prepare("postgres://source", Some("existing-token"), true)
        .await
        .unwrap();
    assert_eq!(snapshot.token, "existing-token");
    assert_eq!(source.adopted_token(), Some("existing-token".to_string()));
}

#[tokio::test]
async fn a_resumed_run_reuses_the_persisted_token_without_exporting_again() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSourceConnection::new();
    let manager = SnapshotManager::new(&source, dir.path().join("snapshot"));

    let first = manager.prepare("postgres://source", None, true).await.unwrap();

    let resumed = manager
        .prepare("postgres://source", Some(&first.token), true)
        .await
        .unwrap();
    assert_eq!(resumed.token, first.token);
    assert_eq!(resumed.state, SnapshotState::Set);
}

#[tokio::test]
async fn close_removes_the_persisted_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot");
    let source = FakeSourceConnection::new();
    let manager = SnapshotManager::new(&source, &snapshot_path);

    manager.prepare("postgres://source", None, true).await.unwrap();
    assert!(snapshot_path.exists());

    manager.close().unwrap();
    assert!(!snapshot_path.exists());
}
