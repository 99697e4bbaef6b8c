// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot Manager (spec §4.3): produces the transaction snapshot token
//! every table-copy and auxiliary worker adopts so the whole clone sees
//! one consistent view of the source.

use pgcopy_adapters::SourceConnection;
use pgcopy_core::{Snapshot, SnapshotKind, SnapshotState};

use crate::error::EngineError;

/// Drives snapshot export/adoption and persists the result to the work
/// directory's `snapshot` file so a resumed run's workers adopt the
/// same token rather than each exporting their own.
pub struct SnapshotManager<'a, S: SourceConnection> {
    source: &'a S,
    snapshot_file: std::path::PathBuf,
}

impl<'a, S: SourceConnection> SnapshotManager<'a, S> {
    pub fn new(source: &'a S, snapshot_file: impl Into<std::path::PathBuf>) -> Self {
        Self {
            source,
            snapshot_file: snapshot_file.into(),
        }
    }

    /// Produce a snapshot token: adopt `requested_token` if one was
    /// passed in (a resumed or explicitly pinned run), otherwise export
    /// a fresh one from a serializable read-only deferrable transaction.
    /// Persists the result so later adopters on a resumed run see the
    /// same token without re-exporting.
    pub async fn prepare(
        &self,
        source_uri: &str,
        requested_token: Option<&str>,
        consistent: bool,
    ) -> Result<Snapshot, EngineError> {
        if !consistent {
            let snapshot = Snapshot {
                source_uri: source_uri.to_string(),
                kind: SnapshotKind::Sql,
                token: String::new(),
                exported: false,
                state: SnapshotState::Skipped,
            };
            self.persist(&snapshot)?;
            return Ok(snapshot);
        }

        if let Some(existing) = self.load()? {
            if let Some(requested) = requested_token {
                if existing.matches_resume(source_uri, requested) {
                    self.source
                        .adopt_snapshot(&existing.token)
                        .await
                        .map_err(EngineError::Source)?;
                    return Ok(Snapshot {
                        state: SnapshotState::Set,
                        ..existing
                    });
                }
            } else {
                self.source
                    .adopt_snapshot(&existing.token)
                    .await
                    .map_err(EngineError::Source)?;
                return Ok(Snapshot {
                    state: SnapshotState::Set,
                    ..existing
                });
            }
        }

        let token = match requested_token {
            Some(token) => {
                self.source.adopt_snapshot(token).await.map_err(EngineError::Source)?;
                token.to_string()
            }
            None => self.source.export_snapshot().await.map_err(EngineError::Source)?,
        };

        let snapshot = Snapshot::new(source_uri, SnapshotKind::Sql, token);
        self.persist(&snapshot)?;
        Ok(snapshot)
    }

    fn load(&self) -> Result<Option<Snapshot>, EngineError> {
        match std::fs::read(&self.snapshot_file) {
            Ok(bytes) => {
                let snapshot = serde_json::from_slice(&bytes).map_err(|err| EngineError::MalformedDonefile {
                    resource: self.snapshot_file.display().to_string(),
                    reason: err.to_string(),
                })?;
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(EngineError::Io {
                path: self.snapshot_file.clone(),
                source,
            }),
        }
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|err| EngineError::MalformedDonefile {
            resource: self.snapshot_file.display().to_string(),
            reason: err.to_string(),
        })?;
        std::fs::write(&self.snapshot_file, bytes).map_err(|source| EngineError::Io {
            path: self.snapshot_file.clone(),
            source,
        })
    }

    /// Remove the persisted snapshot file, ending this run's pinned view
    /// of the source. Does not itself close the underlying connection —
    /// that is `SourceConnection`'s to own.
    pub fn close(&self) -> Result<(), EngineError> {
        match std::fs::remove_file(&self.snapshot_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(EngineError::Io {
                path: self.snapshot_file.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
