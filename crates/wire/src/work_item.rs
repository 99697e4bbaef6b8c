// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items handed from an orchestrator to its worker pool over the IPC
//! queue (spec §4.4, §4.7). One queue per phase (tables, indexes,
//! sequences/LOs); `Stop` is the poison pill a worker sees once the
//! orchestrator has no more items for it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum WorkItem {
    TableOid(u32),
    IndexOid(u32),
    LoOid(u32),
    Stop,
}

impl WorkItem {
    pub fn is_stop(&self) -> bool {
        matches!(self, WorkItem::Stop)
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
