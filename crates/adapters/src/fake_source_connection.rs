// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake source connection for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use pgcopy_core::{SourceExtension, SourceIndex, SourceSequence, SourceTable};
use std::collections::HashMap;
use std::sync::Arc;

use super::{CopyOutcome, SourceConnection};
use crate::error::AdapterError;

/// Recorded source connection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    ExportSnapshot,
    AdoptSnapshot { token: String },
    FetchTables,
    FetchIndexes,
    FetchSequences,
    FetchExtensions,
    SequenceValue { qualified_name: String },
    CopyTableTo { copy_query: String },
    FetchLargeObjectOids,
    ReadLargeObject { lo_oid: u32 },
}

struct FakeState {
    calls: Vec<SourceCall>,
    tables: Vec<SourceTable>,
    indexes: Vec<SourceIndex>,
    sequences: Vec<SourceSequence>,
    extensions: Vec<SourceExtension>,
    sequence_values: HashMap<String, (i64, bool)>,
    copy_payloads: HashMap<String, Vec<u8>>,
    large_objects: HashMap<u32, Vec<u8>>,
    snapshot_token: String,
    adopted_token: Option<String>,
}

/// In-memory `SourceConnection` for tests. Canned catalog contents and
/// copy payloads are set up by the test before the code under test runs.
#[derive(Clone)]
pub struct FakeSourceConnection {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeSourceConnection {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                tables: Vec::new(),
                indexes: Vec::new(),
                sequences: Vec::new(),
                extensions: Vec::new(),
                sequence_values: HashMap::new(),
                copy_payloads: HashMap::new(),
                large_objects: HashMap::new(),
                snapshot_token: "fake-snapshot-1".to_string(),
                adopted_token: None,
            })),
        }
    }
}

impl FakeSourceConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_tables(&self, tables: Vec<SourceTable>) {
        self.inner.lock().tables = tables;
    }

    pub fn set_indexes(&self, indexes: Vec<SourceIndex>) {
        self.inner.lock().indexes = indexes;
    }

    pub fn set_sequences(&self, sequences: Vec<SourceSequence>) {
        self.inner.lock().sequences = sequences;
    }

    pub fn set_extensions(&self, extensions: Vec<SourceExtension>) {
        self.inner.lock().extensions = extensions;
    }

    pub fn set_sequence_value(&self, qualified_name: &str, value: (i64, bool)) {
        self.inner.lock().sequence_values.insert(qualified_name.to_string(), value);
    }

    pub fn set_copy_payload(&self, copy_query: &str, bytes: Vec<u8>) {
        self.inner.lock().copy_payloads.insert(copy_query.to_string(), bytes);
    }

    pub fn adopted_token(&self) -> Option<String> {
        self.inner.lock().adopted_token.clone()
    }

    pub fn set_large_object(&self, lo_oid: u32, data: Vec<u8>) {
        self.inner.lock().large_objects.insert(lo_oid, data);
    }
}

#[async_trait]
impl SourceConnection for FakeSourceConnection {
    async fn export_snapshot(&self) -> Result<String, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::ExportSnapshot);
        Ok(inner.snapshot_token.clone())
    }

    async fn adopt_snapshot(&self, token: &str) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::AdoptSnapshot { token: token.to_string() });
        inner.adopted_token = Some(token.to_string());
        Ok(())
    }

    async fn fetch_tables(&self) -> Result<Vec<SourceTable>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::FetchTables);
        Ok(inner.tables.clone())
    }

    async fn fetch_indexes(&self) -> Result<Vec<SourceIndex>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::FetchIndexes);
        Ok(inner.indexes.clone())
    }

    async fn fetch_sequences(&self) -> Result<Vec<SourceSequence>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::FetchSequences);
        Ok(inner.sequences.clone())
    }

    async fn fetch_extensions(&self) -> Result<Vec<SourceExtension>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::FetchExtensions);
        Ok(inner.extensions.clone())
    }

    async fn sequence_value(&self, qualified_name: &str) -> Result<(i64, bool), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::SequenceValue {
            qualified_name: qualified_name.to_string(),
        });
        inner
            .sequence_values
            .get(qualified_name)
            .copied()
            .ok_or_else(|| AdapterError::Malformed(format!("no canned sequence value for {qualified_name}")))
    }

    async fn copy_table_to(&self, copy_query: &str) -> Result<(Vec<u8>, CopyOutcome), AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::CopyTableTo {
            copy_query: copy_query.to_string(),
        });
        let bytes = inner.copy_payloads.get(copy_query).cloned().unwrap_or_default();
        let outcome = CopyOutcome {
            bytes: bytes.len() as u64,
            duration: std::time::Duration::from_millis(0),
        };
        Ok((bytes, outcome))
    }

    async fn fetch_large_object_oids(&self) -> Result<Vec<u32>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::FetchLargeObjectOids);
        let mut oids: Vec<u32> = inner.large_objects.keys().copied().collect();
        oids.sort_unstable();
        Ok(oids)
    }

    async fn read_large_object(&self, lo_oid: u32) -> Result<Vec<u8>, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SourceCall::ReadLargeObject { lo_oid });
        inner
            .large_objects
            .get(&lo_oid)
            .cloned()
            .ok_or_else(|| AdapterError::Malformed(format!("no canned large object for oid {lo_oid}")))
    }
}

#[cfg(test)]
#[path = "fake_source_connection_tests.rs"]
mod tests;
