// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn codes_match_the_fixed_table() {
    assert_eq!(ExitCode::Clean.code(), 0);
    assert_eq!(ExitCode::BadArgs.code(), 1);
    assert_eq!(ExitCode::BadConfig.code(), 2);
    assert_eq!(ExitCode::BadState.code(), 3);
    assert_eq!(ExitCode::Pgsql.code(), 4);
    assert_eq!(ExitCode::Source.code(), 6);
    assert_eq!(ExitCode::Target.code(), 7);
    assert_eq!(ExitCode::Internal.code(), 12);
    assert_eq!(ExitCode::Fatal.code(), 122);
}

#[test]
fn display_is_human_readable() {
    assert_eq!(ExitCode::BadState.to_string(), "bad state");
}
