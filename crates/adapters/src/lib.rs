// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Trait-seamed adapters to the outside world: the source/target
//! Postgres connections and the external dump/restore/vacuum binaries.
//! Every trait here has a real implementation and, behind
//! `cfg(test)`/`feature = "test-support"`, an in-memory `Fake*`
//! implementation that records calls for assertions.

mod apply_connection;
mod dumper;
mod error;
mod replication_connection;
mod restorer;
mod schema_section;
mod source_connection;
mod target_connection;
mod vacuumer;

pub use apply_connection::{ApplyConnection, PgApplyConnection};
pub use dumper::{Dumper, ExternalDumper};
pub use error::AdapterError;
pub use replication_connection::{
    PgReplicationConnection, RawReplicationMessage, ReplicationConnection, SystemIdentification,
};
pub use restorer::{ExternalRestorer, Restorer};
pub use schema_section::SchemaSection;
pub use source_connection::{CopyOutcome, PgSourceConnection, SourceConnection};
pub use target_connection::{PgTargetConnection, TargetConnection};
pub use vacuumer::{ExternalVacuumer, Vacuumer};

#[cfg(any(test, feature = "test-support"))]
pub use apply_connection::fake::{ApplyCall, FakeApplyConnection};
#[cfg(any(test, feature = "test-support"))]
pub use dumper::fake::{DumpCall, FakeDumper};
#[cfg(any(test, feature = "test-support"))]
pub use replication_connection::fake::{FakeReplicationConnection, ReplicationCall};
#[cfg(any(test, feature = "test-support"))]
pub use restorer::fake::{FakeRestorer, RestoreCall};
#[cfg(any(test, feature = "test-support"))]
pub use source_connection::fake::{FakeSourceConnection, SourceCall};
#[cfg(any(test, feature = "test-support"))]
pub use target_connection::fake::{FakeTargetConnection, TargetCall};
#[cfg(any(test, feature = "test-support"))]
pub use vacuumer::fake::{FakeVacuumer, VacuumCall};
