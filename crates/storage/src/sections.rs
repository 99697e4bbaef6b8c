// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Section bookkeeping (spec §4.4): one row per named phase of a clone
//! run (`pre-data`, `table-data`, `create-indexes`, `post-data`, ...),
//! recording when it started, when it finished, and coarse counters a
//! restarted run can report back to the operator without re-deriving
//! them.
//!
//! This is a different layer from `pgcopy_core::PhaseStamp`: `PhaseStamp`
//! marks whether one object (one table, one index) is done; a
//! `SectionStamp` marks whether an entire phase of the run is done, with
//! the richer bookkeeping a phase boundary needs.

use rusqlite::{params, OptionalExtension};

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::Clock;

/// Persisted state of one named phase of a clone or follow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStamp {
    pub name: String,
    pub started_at_ms: u64,
    pub done_at_ms: Option<u64>,
    pub object_count: u64,
    pub byte_count: u64,
    pub job_mask: u32,
}

impl SectionStamp {
    pub fn is_done(&self) -> bool {
        self.done_at_ms.is_some()
    }
}

impl<C: Clock> CatalogStore<C> {
    /// Start (or resume recording into) the named section. Calling this
    /// again on an already-started section is a no-op: it returns the
    /// existing row rather than resetting `started_at_ms`, so a resumed
    /// run's timing reflects when the section truly began.
    pub fn begin_section(&self, name: &str) -> Result<SectionStamp, CatalogError> {
        if let Some(existing) = self.section(name)? {
            return Ok(existing);
        }
        let started_at_ms = self.clock().epoch_ms();
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT INTO sections (name, started_at_ms) VALUES (?1, ?2)",
                params![name, started_at_ms as i64],
            )?;
            Ok(())
        })?;
        Ok(SectionStamp {
            name: name.to_string(),
            started_at_ms,
            done_at_ms: None,
            object_count: 0,
            byte_count: 0,
            job_mask: 0,
        })
    }

    /// Mark a section done, recording the final object/byte counters and
    /// which worker job slots (bitmask) participated.
    pub fn finish_section(
        &self,
        name: &str,
        object_count: u64,
        byte_count: u64,
        job_mask: u32,
    ) -> Result<(), CatalogError> {
        let done_at_ms = self.clock().epoch_ms();
        self.with_conn_locked(|conn| {
            let updated = conn.execute(
                "UPDATE sections SET done_at_ms = ?2, object_count = ?3, byte_count = ?4, \
                 job_mask = ?5 WHERE name = ?1",
                params![
                    name,
                    done_at_ms as i64,
                    object_count as i64,
                    byte_count as i64,
                    job_mask,
                ],
            )?;
            if updated == 0 {
                return Err(CatalogError::SectionMissing(name.to_string()));
            }
            Ok(())
        })
    }

    /// Look up a section's current stamp, if it has been started.
    pub fn section(&self, name: &str) -> Result<Option<SectionStamp>, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT name, started_at_ms, done_at_ms, object_count, byte_count, job_mask \
                 FROM sections WHERE name = ?1",
                params![name],
                |row| {
                    Ok(SectionStamp {
                        name: row.get(0)?,
                        started_at_ms: row.get::<_, i64>(1)? as u64,
                        done_at_ms: row.get::<_, Option<i64>>(2)?.map(|v| v as u64),
                        object_count: row.get::<_, i64>(3)? as u64,
                        byte_count: row.get::<_, i64>(4)? as u64,
                        job_mask: row.get::<_, i64>(5)? as u32,
                    })
                },
            )
            .optional()
            .map_err(CatalogError::from)
        })
    }
}

#[cfg(test)]
#[path = "sections_tests.rs"]
mod tests;
