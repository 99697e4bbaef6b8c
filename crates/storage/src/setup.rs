// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single `setup` row (spec §4.1/§4.3): the parameters a run was
//! first started with. A resumed run must re-register with identical
//! values — anything else means the operator pointed `--resume` at the
//! wrong work directory or changed something that invalidates the
//! exported snapshot, and should fail loudly rather than silently copy
//! against a different target.

use rusqlite::{params, OptionalExtension};

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::Clock;

/// The parameters that must stay stable across a resumed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSetup {
    pub source_uri: String,
    pub target_uri: String,
    pub snapshot_token: String,
    pub split_threshold: u64,
    pub split_max_parts: u32,
    pub filters_digest: String,
}

impl<C: Clock> CatalogStore<C> {
    /// Register (or validate against) the run's setup parameters.
    ///
    /// On first call, persists `setup` and returns it unchanged. On a
    /// later call against the same work directory (a `--resume`), every
    /// field must match what was persisted or this returns
    /// `CatalogError::SetupMismatch` naming the first field that
    /// differs.
    pub fn register_setup(&self, requested: RegisteredSetup) -> Result<RegisteredSetup, CatalogError> {
        match self.setup()? {
            Some(persisted) => {
                check_field("source_uri", &persisted.source_uri, &requested.source_uri)?;
                check_field("target_uri", &persisted.target_uri, &requested.target_uri)?;
                check_field(
                    "snapshot_token",
                    &persisted.snapshot_token,
                    &requested.snapshot_token,
                )?;
                check_field(
                    "split_threshold",
                    &persisted.split_threshold.to_string(),
                    &requested.split_threshold.to_string(),
                )?;
                check_field(
                    "split_max_parts",
                    &persisted.split_max_parts.to_string(),
                    &requested.split_max_parts.to_string(),
                )?;
                check_field(
                    "filters_digest",
                    &persisted.filters_digest,
                    &requested.filters_digest,
                )?;
                Ok(persisted)
            }
            None => {
                self.with_conn_locked(|conn| {
                    conn.execute(
                        "INSERT INTO setup (id, source_uri, target_uri, snapshot_token, \
                         split_threshold, split_max_parts, filters_digest) \
                         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            requested.source_uri,
                            requested.target_uri,
                            requested.snapshot_token,
                            requested.split_threshold as i64,
                            requested.split_max_parts,
                            requested.filters_digest,
                        ],
                    )?;
                    Ok(())
                })?;
                Ok(requested)
            }
        }
    }

    pub fn setup(&self) -> Result<Option<RegisteredSetup>, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT source_uri, target_uri, snapshot_token, split_threshold, \
                 split_max_parts, filters_digest FROM setup WHERE id = 1",
                [],
                |row| {
                    Ok(RegisteredSetup {
                        source_uri: row.get(0)?,
                        target_uri: row.get(1)?,
                        snapshot_token: row.get(2)?,
                        split_threshold: row.get::<_, i64>(3)? as u64,
                        split_max_parts: row.get(4)?,
                        filters_digest: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(CatalogError::from)
        })
    }
}

fn check_field(field: &'static str, persisted: &str, requested: &str) -> Result<(), CatalogError> {
    if persisted != requested {
        return Err(CatalogError::SetupMismatch {
            field,
            persisted: persisted.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
