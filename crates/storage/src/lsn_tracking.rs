// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LSN tracking table (spec §4.6): a record of which source LSN each
//! applied transaction corresponded to, alongside the target's own
//! commit LSN. The Applier consults this on restart to work out how far
//! it had gotten before a crash, since the target has no notion of
//! "source LSN" on its own.

use rusqlite::params;

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::{Clock, Lsn};

/// One row of the LSN tracking table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsnMapping {
    pub source_lsn: Lsn,
    pub target_insert_lsn: Lsn,
    pub recorded_at_ms: u64,
}

impl<C: Clock> CatalogStore<C> {
    pub fn add_lsn_mapping(
        &self,
        source_lsn: Lsn,
        target_insert_lsn: Lsn,
    ) -> Result<(), CatalogError> {
        let recorded_at_ms = self.clock().epoch_ms();
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO lsn_tracking \
                 (source_lsn, target_insert_lsn, recorded_at_ms) VALUES (?1, ?2, ?3)",
                params![
                    source_lsn.to_string(),
                    target_insert_lsn.to_string(),
                    recorded_at_ms as i64,
                ],
            )?;
            Ok(())
        })
    }

    /// Every tracked mapping, most recently recorded first — the Applier
    /// intersects this against the target's current flush position to
    /// find the source LSN to resume from (spec §4.6).
    pub fn lsn_mappings_newest_first(&self) -> Result<Vec<LsnMapping>, CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT source_lsn, target_insert_lsn, recorded_at_ms FROM lsn_tracking \
                 ORDER BY recorded_at_ms DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut mappings = Vec::new();
            while let Some(row) = rows.next()? {
                mappings.push(row_to_mapping(row)?);
            }
            Ok(mappings)
        })
    }

    /// Drop every tracked mapping, called once a run's CDC catchup has
    /// been confirmed durable past them (spec §4.6's pruning step).
    pub fn delete_all_lsn_mappings(&self) -> Result<(), CatalogError> {
        self.with_conn_locked(|conn| {
            conn.execute("DELETE FROM lsn_tracking", [])?;
            Ok(())
        })
    }
}

fn row_to_mapping(row: &rusqlite::Row<'_>) -> rusqlite::Result<LsnMapping> {
    let source_lsn: String = row.get(0)?;
    let target_insert_lsn: String = row.get(1)?;
    Ok(LsnMapping {
        source_lsn: parse_lsn(&source_lsn)?,
        target_insert_lsn: parse_lsn(&target_insert_lsn)?,
        recorded_at_ms: row.get::<_, i64>(2)? as u64,
    })
}

fn parse_lsn(text: &str) -> rusqlite::Result<Lsn> {
    text.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "lsn".to_string(), rusqlite::types::Type::Text)
    })
}

#[cfg(test)]
#[path = "lsn_tracking_tests.rs"]
mod tests;
