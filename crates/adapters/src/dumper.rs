// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps `pg_dump --section=pre-data|post-data --format=custom` (spec
//! §4.4 step 1). The dumper never touches table rows; data is moved by
//! `SourceConnection`/`TargetConnection`'s server-side copy pipeline.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::AdapterError;
use crate::SchemaSection;
use pgcopy_shell::SCHEMA_SECTION_TIMEOUT;

#[async_trait]
pub trait Dumper: Send + Sync + 'static {
    /// Dump one schema section from `source_uri` into `archive_dir`,
    /// returning the path of the archive file produced.
    async fn dump_schema(&self, source_uri: &str, archive_dir: &Path, section: SchemaSection) -> Result<PathBuf, AdapterError>;
}

/// Real `Dumper` shelling out to an external `pg_dump` binary.
pub struct ExternalDumper {
    pg_dump_path: PathBuf,
}

impl ExternalDumper {
    pub fn new(pg_dump_path: impl Into<PathBuf>) -> Self {
        Self {
            pg_dump_path: pg_dump_path.into(),
        }
    }
}

impl Default for ExternalDumper {
    fn default() -> Self {
        Self::new("pg_dump")
    }
}

#[async_trait]
impl Dumper for ExternalDumper {
    async fn dump_schema(&self, source_uri: &str, archive_dir: &Path, section: SchemaSection) -> Result<PathBuf, AdapterError> {
        let archive_path = archive_dir.join(section.archive_filename());
        let mut cmd = Command::new(&self.pg_dump_path);
        cmd.arg("--format=custom")
            .arg(format!("--section={}", section.pg_dump_flag()))
            .arg("--file")
            .arg(&archive_path)
            .arg(source_uri);
        pgcopy_shell::run_checked(cmd, SCHEMA_SECTION_TIMEOUT, "pg_dump")
            .await
            .map_err(|source| AdapterError::shell("pg_dump failed", source))?;
        Ok(archive_path)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_dumper.rs"]
pub mod fake;

#[cfg(test)]
#[path = "dumper_tests.rs"]
mod tests;
