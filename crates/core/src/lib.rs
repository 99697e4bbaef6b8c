// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgcopy-core: domain types shared by every pgcopydb component.

pub mod macros;

pub mod catalog_types;
pub mod clock;
pub mod decoded;
pub mod exit_code;
pub mod filter;
pub mod id;
pub mod lsn;
pub mod progress;
pub mod segment;
pub mod sentinel;
pub mod signal;
pub mod snapshot;
pub mod workdir;

pub use catalog_types::{
    ExtConfigRelation, PartitionKey, SourceExtension, SourceIndex, SourceSequence, SourceTable,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use decoded::{ChangeAction, ColumnValue, DecodedMessage, Tuple};
pub use exit_code::{ExitCode, HasExitCode};
pub use filter::{FilterDecision, FilterKey, FilterKind};
pub use id::short;
pub use lsn::{InvalidLsn, Lsn};
pub use progress::{IndexProgress, PhaseStamp, TableProgress};
pub use segment::{SegmentId, SegmentPaths};
pub use sentinel::Sentinel;
pub use signal::SignalFlags;
pub use snapshot::{Snapshot, SnapshotKind, SnapshotState};
pub use workdir::{decide_startup, RefuseReason, Role, StartupDecision, Workdir};
