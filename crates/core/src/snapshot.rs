// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The snapshot token every source reader adopts during a clone (spec
//! §3/§4.3). Exporting and adopting a real Postgres snapshot is the
//! Snapshot Manager's job; this type is the persisted record of it.

use serde::{Deserialize, Serialize};

/// How a snapshot was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// A plain `pg_export_snapshot()` from a serializable read-only
    /// deferrable transaction.
    Sql,
    /// A snapshot exported as a side effect of creating a logical
    /// replication slot.
    Logical,
}

crate::simple_display! {
    SnapshotKind {
        Sql => "sql",
        Logical => "logical",
    }
}

/// Lifecycle state of a snapshot across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    Unknown,
    Exported,
    Set,
    Closed,
    Skipped,
}

crate::simple_display! {
    SnapshotState {
        Unknown => "unknown",
        Exported => "exported",
        Set => "set",
        Closed => "closed",
        Skipped => "skipped",
    }
}

/// An opaque snapshot token plus the metadata needed to validate reuse
/// across a `--resume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub source_uri: String,
    pub kind: SnapshotKind,
    pub token: String,
    pub exported: bool,
    pub state: SnapshotState,
}

impl Snapshot {
    pub fn new(source_uri: impl Into<String>, kind: SnapshotKind, token: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            kind,
            token: token.into(),
            exported: true,
            state: SnapshotState::Exported,
        }
    }

    /// Whether a `--resume` using this persisted snapshot against
    /// `requested_uri`/`requested_token` is consistent, per the restart
    /// safety invariant (spec §3).
    pub fn matches_resume(&self, requested_uri: &str, requested_token: &str) -> bool {
        self.source_uri == requested_uri && self.token == requested_token
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
