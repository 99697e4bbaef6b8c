// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fresh_flags_do_not_request_stop() {
    let flags = SignalFlags::new();
    assert!(!flags.should_stop());
    assert!(!flags.should_stop_fast());
    assert!(!flags.should_quit());
}

#[test]
fn stop_fast_implies_stop() {
    let flags = SignalFlags::new();
    flags.set_stop_fast();
    assert!(flags.should_stop());
    assert!(flags.should_stop_fast());
}

#[test]
fn quit_implies_stop_but_not_stop_fast() {
    let flags = SignalFlags::new();
    flags.set_quit();
    assert!(flags.should_stop());
    assert!(flags.should_quit());
    assert!(!flags.should_stop_fast());
}

#[test]
fn reload_can_be_cleared_independently() {
    let flags = SignalFlags::new();
    flags.set_reload();
    assert!(flags.reload_requested());
    flags.clear_reload();
    assert!(!flags.reload_requested());
}

#[test]
fn clone_shares_underlying_state() {
    let flags = SignalFlags::new();
    let clone = flags.clone();
    clone.set_stop();
    assert!(flags.should_stop());
}
