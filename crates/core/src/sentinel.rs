// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sentinel record (spec §3/§4.2): the single row of mutable state that
//! the Receiver, Transformer, Applier and the operator's `stream sentinel`
//! commands all read and write to coordinate where the follower is, and
//! whether it should keep applying.

use crate::lsn::Lsn;
use serde::{Deserialize, Serialize};

/// Coordination state for a logical replication follower run.
///
/// `write_lsn`/`flush_lsn`/`replay_lsn` track the three positions the
/// Receiver reports back to the source over the replication protocol;
/// `apply` is the operator-controlled switch that lets catchup run with
/// apply disabled before being flipped on for cutover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinel {
    pub startpos: Lsn,
    pub endpos: Option<Lsn>,
    pub apply: bool,
    pub write_lsn: Lsn,
    pub flush_lsn: Lsn,
    pub replay_lsn: Lsn,
}

impl Sentinel {
    pub fn new(startpos: Lsn) -> Self {
        Self {
            startpos,
            endpos: None,
            apply: false,
            write_lsn: startpos,
            flush_lsn: startpos,
            replay_lsn: startpos,
        }
    }

    /// True once `replay_lsn` has reached (or passed) a configured endpos.
    /// A sentinel with no endpos never reports caught up by this measure.
    pub fn reached_endpos(&self) -> bool {
        match self.endpos {
            Some(end) => self.replay_lsn >= end,
            None => false,
        }
    }

    /// Record progress from the Receiver after a feedback round-trip.
    pub fn advance_receive(&mut self, write_lsn: Lsn, flush_lsn: Lsn) {
        self.write_lsn = self.write_lsn.max(write_lsn);
        self.flush_lsn = self.flush_lsn.max(flush_lsn);
    }

    /// Record progress from the Applier after a transaction commits.
    pub fn advance_replay(&mut self, replay_lsn: Lsn) {
        self.replay_lsn = self.replay_lsn.max(replay_lsn);
    }
}

#[cfg(test)]
#[path = "sentinel_tests.rs"]
mod tests;
