// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps `vacuumdb --analyze` for the vacuum worker pool (spec §4.4
//! step 6).

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::AdapterError;
use pgcopy_shell::VACUUM_TABLE_TIMEOUT;

#[async_trait]
pub trait Vacuumer: Send + Sync + 'static {
    async fn vacuum_analyze(&self, target_uri: &str, qualified_table: &str) -> Result<(), AdapterError>;
}

/// Real `Vacuumer` shelling out to an external `vacuumdb` binary.
pub struct ExternalVacuumer {
    vacuumdb_path: std::path::PathBuf,
}

impl ExternalVacuumer {
    pub fn new(vacuumdb_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            vacuumdb_path: vacuumdb_path.into(),
        }
    }
}

impl Default for ExternalVacuumer {
    fn default() -> Self {
        Self::new("vacuumdb")
    }
}

#[async_trait]
impl Vacuumer for ExternalVacuumer {
    async fn vacuum_analyze(&self, target_uri: &str, qualified_table: &str) -> Result<(), AdapterError> {
        let mut cmd = Command::new(&self.vacuumdb_path);
        cmd.arg("--analyze").arg("--table").arg(qualified_table).arg("--dbname").arg(target_uri);
        pgcopy_shell::run_checked(cmd, VACUUM_TABLE_TIMEOUT, "vacuumdb")
            .await
            .map_err(|source| AdapterError::shell("vacuumdb failed", source))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_vacuumer.rs"]
pub mod fake;
