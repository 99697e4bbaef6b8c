// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-object progress tracking for the Clone Orchestrator (spec §4.4),
//! letting a restarted run skip objects already copied/indexed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle stamp recorded against a single catalog object (table, index,
/// sequence, LO, extension) as a worker claims, finishes, or fails it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStamp {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl PhaseStamp {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PhaseStamp::Done | PhaseStamp::Failed)
    }

    /// Whether a worker restarting the run may skip this object outright.
    pub fn is_resumable_skip(&self) -> bool {
        matches!(self, PhaseStamp::Done)
    }
}

crate::simple_display! {
    PhaseStamp {
        Pending => "pending",
        InProgress => "in progress",
        Done => "done",
        Failed => "failed",
    }
}

/// Progress of copying a single table's row data, including its COPY
/// partitions when the table was split (spec §4.4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProgress {
    pub oid: u32,
    pub stamp: PhaseStamp,
    pub parts_total: u32,
    pub parts_done: u32,
    pub bytes_copied: u64,
    pub duration: Duration,
}

impl TableProgress {
    pub fn pending(oid: u32, parts_total: u32) -> Self {
        Self {
            oid,
            stamp: PhaseStamp::Pending,
            parts_total,
            parts_done: 0,
            bytes_copied: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn part_finished(&mut self, bytes: u64, elapsed: Duration) {
        self.parts_done += 1;
        self.bytes_copied += bytes;
        self.duration += elapsed;
        if self.parts_done >= self.parts_total {
            self.stamp = PhaseStamp::Done;
        }
    }
}

/// Progress of building a single index (spec §4.4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexProgress {
    pub oid: u32,
    pub table_oid: u32,
    pub stamp: PhaseStamp,
    pub is_constraint: bool,
}

impl IndexProgress {
    pub fn pending(oid: u32, table_oid: u32, is_constraint: bool) -> Self {
        Self {
            oid,
            table_oid,
            stamp: PhaseStamp::Pending,
            is_constraint,
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
