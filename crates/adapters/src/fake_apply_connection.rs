// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake apply connection for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use pgcopy_core::Lsn;
use std::collections::HashMap;
use std::sync::Arc;

use super::ApplyConnection;
use crate::error::AdapterError;

/// Recorded apply connection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyCall {
    SetupOrigin { origin_name: String },
    BeginWithOrigin { source_lsn: Lsn },
    Execute { statement: String },
    Commit,
}

struct FakeState {
    calls: Vec<ApplyCall>,
    origin_progress: HashMap<String, Lsn>,
    open_transaction: Option<Lsn>,
    committed_statements: Vec<(Lsn, Vec<String>)>,
    pending_statements: Vec<String>,
    fail_next_commit: bool,
    target_insert_lsn: Lsn,
}

/// In-memory `ApplyConnection` for tests. Tracks the same
/// at-most-once-per-origin invariant the real Postgres function enforces:
/// `commit()` only advances `origin_progress` when `source_lsn` is
/// strictly greater than what's already recorded.
#[derive(Clone)]
pub struct FakeApplyConnection {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeApplyConnection {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                origin_progress: HashMap::new(),
                open_transaction: None,
                committed_statements: Vec::new(),
                pending_statements: Vec::new(),
                fail_next_commit: false,
                target_insert_lsn: Lsn::ZERO,
            })),
        }
    }
}

impl FakeApplyConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ApplyCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_origin_progress(&self, origin_name: &str, lsn: Lsn) {
        self.inner.lock().origin_progress.insert(origin_name.to_string(), lsn);
    }

    pub fn committed_statements(&self) -> Vec<(Lsn, Vec<String>)> {
        self.inner.lock().committed_statements.clone()
    }

    pub fn fail_next_commit(&self) {
        self.inner.lock().fail_next_commit = true;
    }

    /// Pin the value the next `target_insert_lsn()` call returns, instead
    /// of letting it advance automatically on commit.
    pub fn set_target_insert_lsn(&self, lsn: Lsn) {
        self.inner.lock().target_insert_lsn = lsn;
    }
}

#[async_trait]
impl ApplyConnection for FakeApplyConnection {
    async fn setup_origin(&self, origin_name: &str) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplyCall::SetupOrigin {
            origin_name: origin_name.to_string(),
        });
        inner.origin_progress.entry(origin_name.to_string()).or_insert(Lsn::ZERO);
        Ok(())
    }

    async fn origin_progress(&self, origin_name: &str) -> Result<Option<Lsn>, AdapterError> {
        Ok(self.inner.lock().origin_progress.get(origin_name).copied())
    }

    async fn begin_with_origin(&self, source_lsn: Lsn, _source_timestamp: Option<i64>) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplyCall::BeginWithOrigin { source_lsn });
        inner.open_transaction = Some(source_lsn);
        inner.pending_statements.clear();
        Ok(())
    }

    async fn execute_in_transaction(&self, statement: &str) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplyCall::Execute {
            statement: statement.to_string(),
        });
        inner.pending_statements.push(statement.to_string());
        Ok(())
    }

    async fn commit(&self) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ApplyCall::Commit);
        if inner.fail_next_commit {
            inner.fail_next_commit = false;
            return Err(AdapterError::Malformed("forced commit failure".to_string()));
        }
        let source_lsn = inner
            .open_transaction
            .take()
            .ok_or_else(|| AdapterError::Malformed("commit called with no open transaction".to_string()))?;
        let statements = std::mem::take(&mut inner.pending_statements);
        inner.committed_statements.push((source_lsn, statements));
        inner.target_insert_lsn = Lsn(inner.target_insert_lsn.0 + 1);
        Ok(())
    }

    async fn target_insert_lsn(&self) -> Result<Lsn, AdapterError> {
        Ok(self.inner.lock().target_insert_lsn)
    }
}

#[cfg(test)]
#[path = "fake_apply_connection_tests.rs"]
mod tests;
