// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Applier's target connection (spec §4.6): a single open
//! transaction at a time, tagged with a replication origin so commits
//! are deduplicated across restarts. Deliberately narrower than
//! `TargetConnection` — the Applier never needs schema DDL, only the
//! transactional replay loop.

use async_trait::async_trait;
use pgcopy_core::Lsn;
use tokio_postgres::{Client, NoTls};

use crate::error::AdapterError;

#[async_trait]
pub trait ApplyConnection: Send + Sync + 'static {
    /// Create the named replication origin if it does not exist yet and
    /// attach the session to it. Called once at Applier startup.
    async fn setup_origin(&self, origin_name: &str) -> Result<(), AdapterError>;

    /// The source LSN this origin has recorded progress up to, if any
    /// commit has been replayed under it before.
    async fn origin_progress(&self, origin_name: &str) -> Result<Option<Lsn>, AdapterError>;

    /// Open a transaction and tag it with the source commit's LSN and
    /// timestamp so a crash mid-transaction leaves nothing to dedupe
    /// against (Postgres only advances origin progress on COMMIT).
    async fn begin_with_origin(&self, source_lsn: Lsn, source_timestamp: Option<i64>) -> Result<(), AdapterError>;

    /// Run one statement (BEGIN/COMMIT excluded) inside the open
    /// transaction.
    async fn execute_in_transaction(&self, statement: &str) -> Result<(), AdapterError>;

    async fn commit(&self) -> Result<(), AdapterError>;

    /// The target's own current WAL insert position, recorded alongside
    /// the source commit LSN in the LSN-tracking table (spec §4.6).
    async fn target_insert_lsn(&self) -> Result<Lsn, AdapterError>;
}

/// Real `ApplyConnection` backed by a `tokio_postgres::Client`. Avoids
/// the crate's owned `Transaction` type (self-referential against the
/// client) by driving BEGIN/COMMIT as plain statements and letting
/// Postgres's `pg_replication_origin_xact_setup` carry the LSN tag.
pub struct PgApplyConnection {
    client: Client,
}

impl PgApplyConnection {
    pub async fn connect(conninfo: &str) -> Result<Self, AdapterError> {
        let (client, connection) = tokio_postgres::connect(conninfo, NoTls).await?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(%error, "apply connection driver exited");
            }
        });
        Ok(Self { client })
    }

    fn validate_origin_name(name: &str) -> Result<(), AdapterError> {
        let ok = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if ok && !name.is_empty() {
            Ok(())
        } else {
            Err(AdapterError::Malformed(format!("origin name {name:?}")))
        }
    }
}

#[async_trait]
impl ApplyConnection for PgApplyConnection {
    async fn setup_origin(&self, origin_name: &str) -> Result<(), AdapterError> {
        Self::validate_origin_name(origin_name)?;
        // pg_replication_origin_create errors if the origin already
        // exists; a prior crash/resume leaves it behind, so ignore that
        // one failure mode and let any other error surface.
        let _ = self
            .client
            .execute("SELECT pg_replication_origin_create($1)", &[&origin_name])
            .await;
        self.client
            .execute("SELECT pg_replication_origin_session_setup($1)", &[&origin_name])
            .await?;
        Ok(())
    }

    async fn origin_progress(&self, origin_name: &str) -> Result<Option<Lsn>, AdapterError> {
        let row = self
            .client
            .query_opt(
                "SELECT remote_lsn::text FROM pg_replication_origin_status \
                 JOIN pg_replication_origin ON pg_replication_origin.roident = pg_replication_origin_status.local_id \
                 WHERE roname = $1",
                &[&origin_name],
            )
            .await?;
        match row {
            None => Ok(None),
            Some(row) => {
                let lsn: Option<String> = row.get(0);
                lsn.map(|s| s.parse().map_err(|_| AdapterError::Malformed(format!("origin lsn {s:?}"))))
                    .transpose()
            }
        }
    }

    async fn begin_with_origin(&self, source_lsn: Lsn, source_timestamp: Option<i64>) -> Result<(), AdapterError> {
        self.client.batch_execute("BEGIN").await?;
        let timestamp = source_timestamp.unwrap_or(0);
        self.client
            .execute(
                "SELECT pg_replication_origin_xact_setup($1::pg_lsn, to_timestamp($2::double precision / 1000000.0))",
                &[&source_lsn.to_string(), &timestamp],
            )
            .await?;
        Ok(())
    }

    async fn execute_in_transaction(&self, statement: &str) -> Result<(), AdapterError> {
        self.client.batch_execute(statement).await?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), AdapterError> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn target_insert_lsn(&self) -> Result<Lsn, AdapterError> {
        let row = self.client.query_one("SELECT pg_current_wal_insert_lsn()::text", &[]).await?;
        let lsn: String = row.get(0);
        lsn.parse().map_err(|_| AdapterError::Malformed(format!("target insert lsn {lsn:?}")))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_apply_connection.rs"]
pub mod fake;

#[cfg(test)]
#[path = "apply_connection_tests.rs"]
mod tests;
