// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn lsn(s: &str) -> Lsn {
    s.parse().unwrap()
}

#[test]
fn new_sentinel_starts_idle_at_startpos() {
    let s = Sentinel::new(lsn("0/100"));
    assert_eq!(s.write_lsn, lsn("0/100"));
    assert_eq!(s.flush_lsn, lsn("0/100"));
    assert_eq!(s.replay_lsn, lsn("0/100"));
    assert!(!s.apply);
    assert_eq!(s.endpos, None);
}

#[test]
fn reached_endpos_false_without_one_configured() {
    let s = Sentinel::new(lsn("0/0"));
    assert!(!s.reached_endpos());
}

#[test]
fn reached_endpos_true_once_replay_catches_up() {
    let mut s = Sentinel::new(lsn("0/0"));
    s.endpos = Some(lsn("0/50"));
    assert!(!s.reached_endpos());
    s.advance_replay(lsn("0/50"));
    assert!(s.reached_endpos());
}

#[test]
fn advance_receive_never_moves_backwards() {
    let mut s = Sentinel::new(lsn("0/10"));
    s.advance_receive(lsn("0/20"), lsn("0/15"));
    assert_eq!(s.write_lsn, lsn("0/20"));
    assert_eq!(s.flush_lsn, lsn("0/15"));
    s.advance_receive(lsn("0/5"), lsn("0/5"));
    assert_eq!(s.write_lsn, lsn("0/20"));
    assert_eq!(s.flush_lsn, lsn("0/15"));
}

#[test]
fn advance_replay_never_moves_backwards() {
    let mut s = Sentinel::new(lsn("0/10"));
    s.advance_replay(lsn("0/30"));
    s.advance_replay(lsn("0/1"));
    assert_eq!(s.replay_lsn, lsn("0/30"));
}
