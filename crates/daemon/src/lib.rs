// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process-level lifecycle primitives (spec §4.1) shared by every
//! long-running role the CLI launches: primary/service pidfile
//! claim-and-reclaim, and the liveness probe `decide_startup` (in
//! `pgcopy-core`) needs to arbitrate `--restart`/`--resume`.

pub mod error;
pub mod pidfile;

pub use error::DaemonError;
pub use pidfile::{claim, is_alive, read, reclaim_stale, Pidfile, PidfileGuard};
