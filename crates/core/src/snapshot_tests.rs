// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_snapshot_starts_exported() {
    let snap = Snapshot::new("postgres://src", SnapshotKind::Sql, "00000003-0000001A-1");
    assert!(snap.exported);
    assert_eq!(snap.state, SnapshotState::Exported);
}

#[test]
fn matches_resume_requires_both_uri_and_token() {
    let snap = Snapshot::new("postgres://src", SnapshotKind::Logical, "tok-1");
    assert!(snap.matches_resume("postgres://src", "tok-1"));
    assert!(!snap.matches_resume("postgres://other", "tok-1"));
    assert!(!snap.matches_resume("postgres://src", "tok-2"));
}

#[test]
fn kind_display_is_lowercase() {
    assert_eq!(SnapshotKind::Logical.to_string(), "logical");
    assert_eq!(SnapshotKind::Sql.to_string(), "sql");
}
