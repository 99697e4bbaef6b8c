// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake replication connection for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use pgcopy_core::Lsn;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{RawReplicationMessage, ReplicationConnection, SystemIdentification};
use crate::error::AdapterError;

/// Recorded replication connection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationCall {
    IdentifySystem,
    TimelineHistory { timeline: u32 },
    WalSegmentSize,
    CreateSlotIfNotExists { slot_name: String, plugin: String },
    StartReplication { slot_name: String, plugin: String, start_lsn: Lsn },
    ReceiveMessage,
    SendFeedback { write_lsn: Lsn, flush_lsn: Lsn, apply_lsn: Lsn, reply_requested: bool },
}

struct FakeState {
    calls: Vec<ReplicationCall>,
    identification: SystemIdentification,
    history: Vec<u8>,
    wal_segment_size: u64,
    slot_consistent_point: Lsn,
    queue: VecDeque<RawReplicationMessage>,
    feedback_sent: Vec<(Lsn, Lsn, Lsn)>,
    started: bool,
}

/// In-memory `ReplicationConnection` for tests. A test enqueues the
/// exact message sequence it wants `receive_message` to hand back.
#[derive(Clone)]
pub struct FakeReplicationConnection {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeReplicationConnection {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                identification: SystemIdentification {
                    system_id: "6821810520547102208".to_string(),
                    timeline: 1,
                    xlogpos: Lsn::new(0, 0x2000000),
                    dbname: Some("postgres".to_string()),
                },
                history: Vec::new(),
                wal_segment_size: 16 * 1024 * 1024,
                slot_consistent_point: Lsn::ZERO,
                queue: VecDeque::new(),
                feedback_sent: Vec::new(),
                started: false,
            })),
        }
    }
}

impl FakeReplicationConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ReplicationCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_identification(&self, identification: SystemIdentification) {
        self.inner.lock().identification = identification;
    }

    pub fn set_history(&self, history: Vec<u8>) {
        self.inner.lock().history = history;
    }

    pub fn set_wal_segment_size(&self, size: u64) {
        self.inner.lock().wal_segment_size = size;
    }

    pub fn set_slot_consistent_point(&self, lsn: Lsn) {
        self.inner.lock().slot_consistent_point = lsn;
    }

    pub fn enqueue(&self, message: RawReplicationMessage) {
        self.inner.lock().queue.push_back(message);
    }

    pub fn feedback_sent(&self) -> Vec<(Lsn, Lsn, Lsn)> {
        self.inner.lock().feedback_sent.clone()
    }
}

#[async_trait]
impl ReplicationConnection for FakeReplicationConnection {
    async fn identify_system(&self) -> Result<SystemIdentification, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::IdentifySystem);
        Ok(inner.identification.clone())
    }

    async fn timeline_history(&self, timeline: u32) -> Result<Vec<u8>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::TimelineHistory { timeline });
        Ok(inner.history.clone())
    }

    async fn wal_segment_size(&self) -> Result<u64, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::WalSegmentSize);
        Ok(inner.wal_segment_size)
    }

    async fn create_slot_if_not_exists(&self, slot_name: &str, plugin: &str) -> Result<Lsn, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::CreateSlotIfNotExists {
            slot_name: slot_name.to_string(),
            plugin: plugin.to_string(),
        });
        Ok(inner.slot_consistent_point)
    }

    async fn start_replication(&self, slot_name: &str, plugin: &str, start_lsn: Lsn, _options: &[(String, String)]) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::StartReplication {
            slot_name: slot_name.to_string(),
            plugin: plugin.to_string(),
            start_lsn,
        });
        inner.started = true;
        Ok(())
    }

    async fn receive_message(&self) -> Result<Option<RawReplicationMessage>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::ReceiveMessage);
        if !inner.started {
            return Err(AdapterError::Malformed("receive_message called before start_replication".to_string()));
        }
        Ok(inner.queue.pop_front())
    }

    async fn send_feedback(&self, write_lsn: Lsn, flush_lsn: Lsn, apply_lsn: Lsn, reply_requested: bool) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ReplicationCall::SendFeedback {
            write_lsn,
            flush_lsn,
            apply_lsn,
            reply_requested,
        });
        inner.feedback_sent.push((write_lsn, flush_lsn, apply_lsn));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_replication_connection_tests.rs"]
mod tests;
