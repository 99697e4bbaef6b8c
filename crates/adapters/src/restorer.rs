// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps `pg_restore --list` and `pg_restore --use-list` (spec §4.4
//! steps 3 and 8, driven by `pgcopy-runbook`'s rewritten object lists).

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::error::AdapterError;
use crate::SchemaSection;
use pgcopy_shell::{RESTORE_LIST_TIMEOUT, SCHEMA_SECTION_TIMEOUT};

#[async_trait]
pub trait Restorer: Send + Sync + 'static {
    /// Raw `pg_restore --list` output for `archive`, one line per
    /// catalog object, in `pgcopy-runbook::RestoreList` grammar.
    async fn list_archive(&self, archive: &Path) -> Result<String, AdapterError>;

    /// Restore `section` of `archive` against `target_uri`, driven by a
    /// rewritten object list (`--use-list list_file`).
    async fn restore_section(
        &self,
        target_uri: &str,
        archive: &Path,
        list_file: &Path,
        section: SchemaSection,
    ) -> Result<(), AdapterError>;
}

/// Real `Restorer` shelling out to an external `pg_restore` binary.
pub struct ExternalRestorer {
    pg_restore_path: std::path::PathBuf,
}

impl ExternalRestorer {
    pub fn new(pg_restore_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            pg_restore_path: pg_restore_path.into(),
        }
    }
}

impl Default for ExternalRestorer {
    fn default() -> Self {
        Self::new("pg_restore")
    }
}

#[async_trait]
impl Restorer for ExternalRestorer {
    async fn list_archive(&self, archive: &Path) -> Result<String, AdapterError> {
        let mut cmd = Command::new(&self.pg_restore_path);
        cmd.arg("--list").arg(archive);
        let output = pgcopy_shell::run_checked(cmd, RESTORE_LIST_TIMEOUT, "pg_restore --list")
            .await
            .map_err(|source| AdapterError::shell("pg_restore --list failed", source))?;
        String::from_utf8(output.stdout)
            .map_err(|_| AdapterError::Malformed(format!("non-UTF8 pg_restore --list output for {}", archive.display())))
    }

    async fn restore_section(
        &self,
        target_uri: &str,
        archive: &Path,
        list_file: &Path,
        section: SchemaSection,
    ) -> Result<(), AdapterError> {
        let mut cmd = Command::new(&self.pg_restore_path);
        cmd.arg(format!("--section={}", section.pg_dump_flag()))
            .arg("--use-list")
            .arg(list_file)
            .arg("--dbname")
            .arg(target_uri)
            .arg(archive);
        pgcopy_shell::run_checked(cmd, SCHEMA_SECTION_TIMEOUT, "pg_restore")
            .await
            .map_err(|source| AdapterError::shell("pg_restore failed", source))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_restorer.rs"]
pub mod fake;

#[cfg(test)]
#[path = "restorer_tests.rs"]
mod tests;
