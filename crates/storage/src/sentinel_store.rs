// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for the single sentinel row (spec §4.2, §4.6): the
//! coordination state the Receiver, Transformer, Applier and the
//! `stream sentinel` commands all read and write.

use rusqlite::{params, OptionalExtension};

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::{Clock, Lsn, Sentinel};

impl<C: Clock> CatalogStore<C> {
    /// Create the sentinel row for a fresh follower run. Calling this
    /// again (a resumed run) is a no-op, returning the persisted row
    /// untouched, so replaying `stream setup` never rewinds progress.
    pub fn setup_sentinel(&self, startpos: Lsn) -> Result<Sentinel, CatalogError> {
        if let Some(existing) = self.sentinel()? {
            return Ok(existing);
        }
        let sentinel = Sentinel::new(startpos);
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT INTO sentinel (id, startpos, endpos, apply, write_lsn, flush_lsn, \
                 replay_lsn) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    sentinel.startpos.to_string(),
                    sentinel.endpos.map(|lsn| lsn.to_string()),
                    sentinel.apply,
                    sentinel.write_lsn.to_string(),
                    sentinel.flush_lsn.to_string(),
                    sentinel.replay_lsn.to_string(),
                ],
            )?;
            Ok(())
        })?;
        Ok(sentinel)
    }

    pub fn sentinel(&self) -> Result<Option<Sentinel>, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT startpos, endpos, apply, write_lsn, flush_lsn, replay_lsn FROM sentinel \
                 WHERE id = 1",
                [],
                row_to_sentinel,
            )
            .optional()
            .map_err(CatalogError::from)
        })
    }

    pub fn update_endpos(&self, endpos: Lsn) -> Result<Sentinel, CatalogError> {
        self.update_sentinel_row(|sentinel| sentinel.endpos = Some(endpos))
    }

    /// Publish a freshly reconciled resume point as the sentinel's
    /// `startpos`, so the Streamer re-requests WAL from the right place
    /// after a restart (spec §4.6). Unlike `setup_sentinel`, this
    /// overwrites an existing row.
    pub fn update_startpos(&self, startpos: Lsn) -> Result<Sentinel, CatalogError> {
        let mut sentinel = self.sentinel()?.ok_or(CatalogError::SentinelMissing)?;
        sentinel.startpos = startpos;
        self.with_conn_locked(|conn| {
            conn.execute(
                "UPDATE sentinel SET startpos = ?1 WHERE id = 1",
                params![sentinel.startpos.to_string()],
            )?;
            Ok(())
        })?;
        Ok(sentinel)
    }

    pub fn update_apply(&self, apply: bool) -> Result<Sentinel, CatalogError> {
        self.update_sentinel_row(|sentinel| sentinel.apply = apply)
    }

    /// Record progress reported by the Receiver after a feedback
    /// round-trip to the source's replication protocol.
    pub fn sync_recv(&self, write_lsn: Lsn, flush_lsn: Lsn) -> Result<Sentinel, CatalogError> {
        self.update_sentinel_row(|sentinel| sentinel.advance_receive(write_lsn, flush_lsn))
    }

    /// Record progress reported by the Applier after a transaction
    /// commits on the target.
    pub fn sync_apply(&self, replay_lsn: Lsn) -> Result<Sentinel, CatalogError> {
        self.update_sentinel_row(|sentinel| sentinel.advance_replay(replay_lsn))
    }

    fn update_sentinel_row(
        &self,
        apply_update: impl FnOnce(&mut Sentinel),
    ) -> Result<Sentinel, CatalogError> {
        let mut sentinel = self.sentinel()?.ok_or(CatalogError::SentinelMissing)?;
        apply_update(&mut sentinel);
        self.with_conn_locked(|conn| {
            conn.execute(
                "UPDATE sentinel SET endpos = ?1, apply = ?2, write_lsn = ?3, flush_lsn = ?4, \
                 replay_lsn = ?5 WHERE id = 1",
                params![
                    sentinel.endpos.map(|lsn| lsn.to_string()),
                    sentinel.apply,
                    sentinel.write_lsn.to_string(),
                    sentinel.flush_lsn.to_string(),
                    sentinel.replay_lsn.to_string(),
                ],
            )?;
            Ok(())
        })?;
        Ok(sentinel)
    }
}

fn row_to_sentinel(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sentinel> {
    let startpos: String = row.get(0)?;
    let endpos: Option<String> = row.get(1)?;
    let write_lsn: String = row.get(3)?;
    let flush_lsn: String = row.get(4)?;
    let replay_lsn: String = row.get(5)?;
    Ok(Sentinel {
        startpos: parse_lsn(&startpos)?,
        endpos: endpos.map(|s| parse_lsn(&s)).transpose()?,
        apply: row.get(2)?,
        write_lsn: parse_lsn(&write_lsn)?,
        flush_lsn: parse_lsn(&flush_lsn)?,
        replay_lsn: parse_lsn(&replay_lsn)?,
    })
}

fn parse_lsn(text: &str) -> rusqlite::Result<Lsn> {
    text.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "lsn".to_string(), rusqlite::types::Type::Text)
    })
}

#[cfg(test)]
#[path = "sentinel_store_tests.rs"]
mod tests;
