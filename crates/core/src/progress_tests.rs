// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn done_is_resumable_skip_failed_is_not() {
    assert!(PhaseStamp::Done.is_resumable_skip());
    assert!(!PhaseStamp::Failed.is_resumable_skip());
    assert!(PhaseStamp::Failed.is_terminal());
    assert!(!PhaseStamp::InProgress.is_terminal());
}

#[test]
fn table_progress_starts_pending() {
    let p = TableProgress::pending(100, 4);
    assert_eq!(p.stamp, PhaseStamp::Pending);
    assert_eq!(p.parts_done, 0);
}

#[test]
fn table_progress_marks_done_after_last_part() {
    let mut p = TableProgress::pending(100, 2);
    p.part_finished(1024, Duration::from_secs(1));
    assert_eq!(p.stamp, PhaseStamp::Pending);
    p.part_finished(2048, Duration::from_secs(1));
    assert_eq!(p.stamp, PhaseStamp::Done);
    assert_eq!(p.bytes_copied, 3072);
    assert_eq!(p.duration, Duration::from_secs(2));
}

#[test]
fn single_part_table_finishes_after_one_call() {
    let mut p = TableProgress::pending(1, 1);
    p.part_finished(10, Duration::from_millis(5));
    assert_eq!(p.stamp, PhaseStamp::Done);
}

#[test]
fn index_progress_tracks_constraint_flag() {
    let p = IndexProgress::pending(5, 1, true);
    assert!(p.is_constraint);
    assert_eq!(p.stamp, PhaseStamp::Pending);
}
