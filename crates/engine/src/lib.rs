// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgcopy-engine: the Clone Orchestrator and Replication Follower built
//! on top of `pgcopy-adapters`' connections and `pgcopy-storage`'s
//! catalog store.

pub mod clone;
pub mod ctx;
pub mod donefile;
pub mod error;
pub mod follow;
pub mod snapshot;

pub use ctx::{Ctx, RunOptions};
pub use error::EngineError;
pub use snapshot::SnapshotManager;
