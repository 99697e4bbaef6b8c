// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake target connection for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::TargetConnection;
use crate::error::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCall {
    CopyTableFrom { copy_query: String, row_count: u64 },
    Setval { qualified_name: String, last_value: i64, is_called: bool },
    CopyExtensionConfig { copy_query: String, row_count: u64 },
    CreateExtensionIfNotExists { name: String, version: Option<String> },
    DropTablesIfExists { qualified_names: Vec<String> },
    CreateIndex { definition: String },
    WriteLargeObject { lo_oid: u32, byte_count: usize },
}

struct FakeState {
    calls: Vec<TargetCall>,
}

/// In-memory `TargetConnection` for tests. Row counts reported by
/// `copy_table_from` are computed by counting newlines in `data`, which
/// mirrors the one-row-per-line shape of `COPY ... TO STDOUT` output.
#[derive(Clone)]
pub struct FakeTargetConnection {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeTargetConnection {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState { calls: Vec::new() })),
        }
    }
}

impl FakeTargetConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TargetCall> {
        self.inner.lock().calls.clone()
    }
}

fn count_rows(data: &[u8]) -> u64 {
    data.iter().filter(|&&b| b == b'\n').count() as u64
}

#[async_trait]
impl TargetConnection for FakeTargetConnection {
    async fn copy_table_from(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError> {
        let row_count = count_rows(data);
        let mut inner = self.inner.lock();
        inner.calls.push(TargetCall::CopyTableFrom {
            copy_query: copy_query.to_string(),
            row_count,
        });
        Ok(row_count)
    }

    async fn setval(&self, qualified_name: &str, last_value: i64, is_called: bool) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(TargetCall::Setval {
            qualified_name: qualified_name.to_string(),
            last_value,
            is_called,
        });
        Ok(())
    }

    async fn copy_extension_config(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError> {
        let row_count = count_rows(data);
        self.inner.lock().calls.push(TargetCall::CopyExtensionConfig {
            copy_query: copy_query.to_string(),
            row_count,
        });
        Ok(row_count)
    }

    async fn create_extension_if_not_exists(&self, name: &str, version: Option<&str>) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(TargetCall::CreateExtensionIfNotExists {
            name: name.to_string(),
            version: version.map(str::to_string),
        });
        Ok(())
    }

    async fn drop_tables_if_exists(&self, qualified_names: &[String]) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(TargetCall::DropTablesIfExists {
            qualified_names: qualified_names.to_vec(),
        });
        Ok(())
    }

    async fn create_index(&self, definition: &str) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(TargetCall::CreateIndex {
            definition: definition.to_string(),
        });
        Ok(())
    }

    async fn write_large_object(&self, lo_oid: u32, data: &[u8]) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(TargetCall::WriteLargeObject {
            lo_oid,
            byte_count: data.len(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_target_connection_tests.rs"]
mod tests;
