// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The target side of a table copy, a sequence reset, or an extension
//! configuration-table copy (spec §4.4.2, §4.7).

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};

use crate::error::AdapterError;

/// A connection to the target database. Unlike `SourceConnection`, the
/// target never joins a shared snapshot; each statement is its own
/// (or an explicitly managed) transaction.
#[async_trait]
pub trait TargetConnection: Send + Sync + 'static {
    /// Feed `data` (the bytes `COPY ... TO STDOUT` produced on the
    /// source) into `COPY ... FROM STDIN` on the target, returning the
    /// number of rows copied.
    async fn copy_table_from(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError>;

    /// `setval(sequence, last_value, is_called)` inside its own
    /// transaction (spec §4.7).
    async fn setval(&self, qualified_name: &str, last_value: i64, is_called: bool) -> Result<(), AdapterError>;

    /// Re-run the source's `SELECT * FROM schema.rel <extcondition>` as a
    /// `COPY (...) TO STDOUT` equivalent and feed it into the matching
    /// target relation (extension configuration tables, spec §4.7).
    async fn copy_extension_config(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError>;

    async fn create_extension_if_not_exists(&self, name: &str, version: Option<&str>) -> Result<(), AdapterError>;

    /// `DROP TABLE IF EXISTS ... CASCADE` for every target table, issued
    /// once up front when `--drop-if-exists` is requested (spec §4.5).
    async fn drop_tables_if_exists(&self, qualified_names: &[String]) -> Result<(), AdapterError>;

    /// Run one index/constraint's `CREATE INDEX`/`ALTER TABLE ... ADD
    /// CONSTRAINT` statement, as fetched verbatim from the source
    /// catalog (spec §4.4 step 5). Index workers build these
    /// concurrently instead of going through `pg_restore`.
    async fn create_index(&self, definition: &str) -> Result<(), AdapterError>;

    /// Create a large object at `lo_oid` with `data` as its contents,
    /// via `lo_from_bytea` (spec §4.7). Idempotent: an existing object at
    /// that oid is unlinked first so a resumed run can safely re-run it.
    async fn write_large_object(&self, lo_oid: u32, data: &[u8]) -> Result<(), AdapterError>;
}

/// Real `TargetConnection` backed by a single `tokio_postgres::Client`.
pub struct PgTargetConnection {
    client: Client,
}

impl PgTargetConnection {
    pub async fn connect(conninfo: &str) -> Result<Self, AdapterError> {
        let (client, connection) = tokio_postgres::connect(conninfo, NoTls).await?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(%error, "target connection driver exited");
            }
        });
        Ok(Self { client })
    }

    fn validate_identifier(name: &str) -> Result<(), AdapterError> {
        let ok = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '"');
        if ok && !name.is_empty() {
            Ok(())
        } else {
            Err(AdapterError::Malformed(format!("identifier {name:?}")))
        }
    }
}

#[async_trait]
impl TargetConnection for PgTargetConnection {
    async fn copy_table_from(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError> {
        let sink = self.client.copy_in(copy_query).await?;
        tokio::pin!(sink);
        use futures_util::SinkExt;
        sink.send(bytes::Bytes::copy_from_slice(data)).await?;
        let rows = sink.finish().await?;
        Ok(rows)
    }

    async fn setval(&self, qualified_name: &str, last_value: i64, is_called: bool) -> Result<(), AdapterError> {
        Self::validate_identifier(qualified_name)?;
        self.client
            .execute(
                &format!("SELECT setval('{qualified_name}', $1, $2)"),
                &[&last_value, &is_called],
            )
            .await?;
        Ok(())
    }

    async fn copy_extension_config(&self, copy_query: &str, data: &[u8]) -> Result<u64, AdapterError> {
        self.copy_table_from(copy_query, data).await
    }

    async fn create_extension_if_not_exists(&self, name: &str, version: Option<&str>) -> Result<(), AdapterError> {
        Self::validate_identifier(name)?;
        let stmt = match version {
            Some(v) => format!("CREATE EXTENSION IF NOT EXISTS {name} VERSION '{v}' CASCADE"),
            None => format!("CREATE EXTENSION IF NOT EXISTS {name} CASCADE"),
        };
        self.client.batch_execute(&stmt).await?;
        Ok(())
    }

    async fn drop_tables_if_exists(&self, qualified_names: &[String]) -> Result<(), AdapterError> {
        for name in qualified_names {
            Self::validate_identifier(name)?;
        }
        if qualified_names.is_empty() {
            return Ok(());
        }
        let list = qualified_names.join(", ");
        self.client
            .batch_execute(&format!("DROP TABLE IF EXISTS {list} CASCADE"))
            .await?;
        Ok(())
    }

    async fn create_index(&self, definition: &str) -> Result<(), AdapterError> {
        self.client.batch_execute(definition).await?;
        Ok(())
    }

    async fn write_large_object(&self, lo_oid: u32, data: &[u8]) -> Result<(), AdapterError> {
        // Ignore failure: lo_unlink errors when the oid doesn't exist yet,
        // which is the expected case on a fresh (non-resumed) run.
        let _ = self.client.execute("SELECT lo_unlink($1::oid)", &[&(lo_oid as i64)]).await;
        self.client
            .execute("SELECT lo_from_bytea($1::oid, $2)", &[&(lo_oid as i64), &data])
            .await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_target_connection.rs"]
pub mod fake;

#[cfg(test)]
#[path = "target_connection_tests.rs"]
mod tests;
