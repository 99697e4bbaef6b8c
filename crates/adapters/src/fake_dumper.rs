// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake dumper for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Dumper;
use crate::error::AdapterError;
use crate::SchemaSection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpCall {
    pub source_uri: String,
    pub archive_dir: PathBuf,
    pub section: SchemaSection,
}

#[derive(Clone, Default)]
pub struct FakeDumper {
    calls: Arc<Mutex<Vec<DumpCall>>>,
}

impl FakeDumper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DumpCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Dumper for FakeDumper {
    async fn dump_schema(&self, source_uri: &str, archive_dir: &Path, section: SchemaSection) -> Result<PathBuf, AdapterError> {
        self.calls.lock().push(DumpCall {
            source_uri: source_uri.to_string(),
            archive_dir: archive_dir.to_path_buf(),
            section,
        });
        Ok(archive_dir.join(section.archive_filename()))
    }
}

#[cfg(test)]
#[path = "fake_dumper_tests.rs"]
mod tests;
