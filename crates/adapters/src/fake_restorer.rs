// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake restorer for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Restorer;
use crate::error::AdapterError;
use crate::SchemaSection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreCall {
    ListArchive { archive: PathBuf },
    RestoreSection {
        target_uri: String,
        archive: PathBuf,
        list_file: PathBuf,
        section: SchemaSection,
    },
}

struct FakeState {
    calls: Vec<RestoreCall>,
    listings: std::collections::HashMap<PathBuf, String>,
}

#[derive(Clone)]
pub struct FakeRestorer {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeRestorer {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                listings: std::collections::HashMap::new(),
            })),
        }
    }
}

impl FakeRestorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RestoreCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_listing(&self, archive: &Path, listing: impl Into<String>) {
        self.inner.lock().listings.insert(archive.to_path_buf(), listing.into());
    }
}

#[async_trait]
impl Restorer for FakeRestorer {
    async fn list_archive(&self, archive: &Path) -> Result<String, AdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RestoreCall::ListArchive {
            archive: archive.to_path_buf(),
        });
        Ok(inner.listings.get(archive).cloned().unwrap_or_default())
    }

    async fn restore_section(
        &self,
        target_uri: &str,
        archive: &Path,
        list_file: &Path,
        section: SchemaSection,
    ) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(RestoreCall::RestoreSection {
            target_uri: target_uri.to_string(),
            archive: archive.to_path_buf(),
            list_file: list_file.to_path_buf(),
            section,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_restorer_tests.rs"]
mod tests;
