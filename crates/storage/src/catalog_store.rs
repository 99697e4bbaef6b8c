// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The catalog store itself: an embedded SQLite database file holding
//! everything a resumed run needs to avoid re-fetching or re-copying
//! what a prior run already finished (spec §2, §4.2).
//!
//! Every process role that touches a given work directory opens its own
//! `CatalogStore` against the same file. In-process access is serialized
//! by a mutex around the connection; cross-process write access is
//! serialized by an `fs2` exclusive lock on a sidecar `.lock` file, taken
//! immediately before a mutating statement runs and released immediately
//! after. Readers never take the lock, so a process opening the work
//! directory purely to report progress (e.g. `list` while a clone runs)
//! proceeds concurrently rather than being refused at open time.

use fs2::FileExt;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use pgcopy_core::{Clock, SystemClock};

use crate::error::CatalogError;
use crate::schema;

/// Handle onto a work directory's catalog database.
///
/// `C` defaults to `SystemClock`; tests substitute `FakeClock` so that
/// section/sentinel timestamps are deterministic.
pub struct CatalogStore<C: Clock = SystemClock> {
    conn: Mutex<Connection>,
    lock_file: File,
    db_path: PathBuf,
    clock: C,
}

impl CatalogStore<SystemClock> {
    /// Open (creating if absent) the catalog database at `db_path` and
    /// apply the schema. Readers may proceed concurrently; a writer
    /// acquires the cross-process lock per statement, see
    /// [`CatalogStore::with_conn_locked`].
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        Self::open_with_clock(db_path, SystemClock)
    }
}

impl<C: Clock> CatalogStore<C> {
    pub fn open_with_clock(db_path: impl Into<PathBuf>, clock: C) -> Result<Self, CatalogError> {
        let db_path = db_path.into();
        let lock_path = Self::lock_path(&db_path);
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|source| CatalogError::Io {
                path: lock_path,
                source,
            })?;

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(schema::DDL)?;

        Ok(Self {
            conn: Mutex::new(conn),
            lock_file,
            db_path,
            clock,
        })
    }

    fn lock_path(db_path: &Path) -> PathBuf {
        let mut name = db_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run a mutating statement under the cross-process exclusive lock,
    /// taken immediately before `f` runs and released immediately after —
    /// never held for the handle's lifetime, so readers in other
    /// processes are never blocked by a writer that isn't actively
    /// writing.
    pub(crate) fn with_conn_locked<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        self.lock_file.lock_exclusive().map_err(|source| CatalogError::Io {
            path: Self::lock_path(&self.db_path),
            source,
        })?;
        let result = self.with_conn(f);
        if let Err(source) = FileExt::unlock(&self.lock_file) {
            tracing::warn!(error = %source, "failed to release catalog write lock");
        }
        result
    }

    /// Close the connection.
    ///
    /// `rusqlite::Connection::close` can fail if a prepared statement is
    /// still alive; on that failure the connection is dropped (and its
    /// WAL checkpointed on drop) rather than leaking the error upward.
    pub fn close(self) -> Result<(), CatalogError> {
        if let Err((conn, err)) = self.conn.into_inner().close() {
            tracing::warn!(error = %err, "dropping catalog connection after close failed");
            drop(conn);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalog_store_tests.rs"]
mod tests;
