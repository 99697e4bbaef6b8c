// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Snapshot Manager's view of the source database: exporting or
//! adopting a shared snapshot, reading catalog metadata into it, and
//! streaming table rows out of it (spec §4.2, §4.3, §4.4.2).

use async_trait::async_trait;
use futures_util::StreamExt;
use pgcopy_core::{
    ExtConfigRelation, PartitionKey, SourceExtension, SourceIndex, SourceSequence, SourceTable,
};
use std::time::{Duration, Instant};
use tokio_postgres::{Client, NoTls};

use crate::error::AdapterError;

/// Bytes and wall-clock time spent on one `COPY ... TO STDOUT` invocation,
/// carried into a table's donefile summary (spec §4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub bytes: u64,
    pub duration: Duration,
}

/// A connection to the source database, joined (or joinable) to the
/// shared clone snapshot. One instance per worker process/task; workers
/// never share a connection.
#[async_trait]
pub trait SourceConnection: Send + Sync + 'static {
    /// Export a brand new snapshot from a serializable deferrable
    /// read-only transaction, returning its token.
    async fn export_snapshot(&self) -> Result<String, AdapterError>;

    /// Join an already-exported snapshot token inside a repeatable-read
    /// transaction.
    async fn adopt_snapshot(&self, token: &str) -> Result<(), AdapterError>;

    async fn fetch_tables(&self) -> Result<Vec<SourceTable>, AdapterError>;
    async fn fetch_indexes(&self) -> Result<Vec<SourceIndex>, AdapterError>;
    async fn fetch_sequences(&self) -> Result<Vec<SourceSequence>, AdapterError>;
    async fn fetch_extensions(&self) -> Result<Vec<SourceExtension>, AdapterError>;

    /// Read `(last_value, is_called)` for one sequence inside the shared
    /// snapshot (spec §4.7).
    async fn sequence_value(&self, qualified_name: &str) -> Result<(i64, bool), AdapterError>;

    /// Stream a table (or partition slice, via a caller-supplied `WHERE`
    /// predicate baked into `copy_query`) out via server-side copy,
    /// returning the raw bytes plus timing.
    async fn copy_table_to(&self, copy_query: &str) -> Result<(Vec<u8>, CopyOutcome), AdapterError>;

    /// Every large object oid in the shared snapshot (spec §4.7).
    async fn fetch_large_object_oids(&self) -> Result<Vec<u32>, AdapterError>;

    /// Read one large object's full contents via `lo_get`, avoiding the
    /// separate-connection large-object API in favor of a plain query.
    async fn read_large_object(&self, lo_oid: u32) -> Result<Vec<u8>, AdapterError>;
}

/// Real `SourceConnection` backed by a single `tokio_postgres::Client`.
pub struct PgSourceConnection {
    client: Client,
}

impl PgSourceConnection {
    pub async fn connect(conninfo: &str) -> Result<Self, AdapterError> {
        let (client, connection) = tokio_postgres::connect(conninfo, NoTls).await?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(%error, "source connection driver exited");
            }
        });
        Ok(Self { client })
    }

    /// A snapshot token is embedded verbatim in `SET TRANSACTION SNAPSHOT`,
    /// which does not accept a bind parameter; reject anything that isn't
    /// the hyphen/digit/letter shape Postgres itself produces.
    fn validate_token(token: &str) -> Result<(), AdapterError> {
        if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') || token.is_empty() {
            return Err(AdapterError::Malformed(format!("snapshot token {token:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl SourceConnection for PgSourceConnection {
    async fn export_snapshot(&self) -> Result<String, AdapterError> {
        self.client
            .batch_execute("BEGIN ISOLATION LEVEL SERIALIZABLE, READ ONLY, DEFERRABLE")
            .await?;
        let row = self.client.query_one("SELECT pg_export_snapshot()", &[]).await?;
        Ok(row.get::<_, String>(0))
    }

    async fn adopt_snapshot(&self, token: &str) -> Result<(), AdapterError> {
        Self::validate_token(token)?;
        self.client
            .batch_execute("BEGIN ISOLATION LEVEL REPEATABLE READ")
            .await?;
        self.client
            .batch_execute(&format!("SET TRANSACTION SNAPSHOT '{token}'"))
            .await?;
        Ok(())
    }

    async fn fetch_tables(&self) -> Result<Vec<SourceTable>, AdapterError> {
        let rows = self
            .client
            .query(
                "SELECT c.oid, n.nspname, c.relname, \
                        c.reltuples::bigint, pg_total_relation_size(c.oid)::bigint, \
                        (SELECT a.attname FROM pg_index i \
                           JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = i.indkey[0] \
                          WHERE i.indrelid = c.oid AND i.indisprimary LIMIT 1) \
                 FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE c.relkind = 'r' AND n.nspname NOT IN ('pg_catalog', 'information_schema')",
                &[],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let namespace: String = row.get(1);
                let relname: String = row.get(2);
                let restore_list_name = format!("{namespace}.{relname}");
                let partition_key = match row.get::<_, Option<String>>(5) {
                    Some(col) => PartitionKey::PrimaryKey(col),
                    None => PartitionKey::Ctid,
                };
                SourceTable {
                    oid: row.get(0),
                    namespace,
                    relname,
                    est_row_count: row.get(3),
                    relation_size: row.get(4),
                    partition_key,
                    restore_list_name,
                }
            })
            .collect())
    }

    async fn fetch_indexes(&self) -> Result<Vec<SourceIndex>, AdapterError> {
        let rows = self
            .client
            .query(
                "SELECT i.indexrelid, i.indrelid, c.relname, i.indisprimary, \
                        pg_get_indexdef(i.indexrelid), n.nspname, con.oid IS NOT NULL \
                 FROM pg_index i \
                 JOIN pg_class c ON c.oid = i.indexrelid \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 LEFT JOIN pg_constraint con ON con.conindid = i.indexrelid",
                &[],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let schema: String = row.get(5);
                let name: String = row.get(2);
                SourceIndex {
                    oid: row.get(0),
                    table_oid: row.get(1),
                    index_name: name.clone(),
                    is_constraint: row.get(6),
                    is_primary: row.get(3),
                    definition: row.get(4),
                    restore_list_name: format!("{schema}.{name}"),
                }
            })
            .collect())
    }

    async fn fetch_sequences(&self) -> Result<Vec<SourceSequence>, AdapterError> {
        let rows = self
            .client
            .query(
                "SELECT c.oid, s.last_value, s.is_called \
                 FROM pg_class c JOIN pg_sequences s ON s.sequencename = c.relname \
                 WHERE c.relkind = 'S'",
                &[],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| SourceSequence {
                oid: row.get(0),
                last_value: row.get(1),
                is_called: row.get(2),
            })
            .collect())
    }

    async fn fetch_extensions(&self) -> Result<Vec<SourceExtension>, AdapterError> {
        let rows = self
            .client
            .query(
                "SELECT e.oid, e.extname, e.extversion, cfg.ord, \
                        c.relnamespace::regnamespace::text AS namespace, \
                        c.relname, c.relkind::text AS relkind, cfg.condition \
                 FROM pg_extension e \
                 LEFT JOIN LATERAL unnest(e.extconfig, e.extcondition) \
                     WITH ORDINALITY AS cfg(config_oid, condition, ord) ON true \
                 LEFT JOIN pg_class c ON c.oid = cfg.config_oid \
                 ORDER BY e.oid, cfg.ord",
                &[],
            )
            .await?;

        // Rows are ordered by extension oid, so each extension's config
        // relations are a contiguous run grouped onto its one entry.
        let mut extensions: Vec<SourceExtension> = Vec::new();
        for row in rows {
            let oid: u32 = row.get(0);
            let is_new_extension = extensions
                .last()
                .map(|extension: &SourceExtension| extension.oid != oid)
                .unwrap_or(true);
            if is_new_extension {
                let extname: String = row.get(1);
                extensions.push(SourceExtension {
                    oid,
                    extname: extname.clone(),
                    extversion: row.get(2),
                    restore_list_name: extname,
                    config_relations: Vec::new(),
                });
            }
            let relname: Option<String> = row.get(5);
            if let (Some(relname), Some(extension)) = (relname, extensions.last_mut()) {
                let namespace: String = row.get(4);
                let relkind_text: String = row.get(6);
                let relkind = relkind_text.chars().next().unwrap_or('r');
                let condition: Option<String> = row.get(7);
                extension.config_relations.push(ExtConfigRelation {
                    namespace,
                    relname,
                    relkind,
                    condition,
                });
            }
        }
        Ok(extensions)
    }

    async fn sequence_value(&self, qualified_name: &str) -> Result<(i64, bool), AdapterError> {
        let row = self
            .client
            .query_one(&format!("SELECT last_value, is_called FROM {qualified_name}"), &[])
            .await?;
        Ok((row.get(0), row.get(1)))
    }

    async fn copy_table_to(&self, copy_query: &str) -> Result<(Vec<u8>, CopyOutcome), AdapterError> {
        let started = Instant::now();
        let mut stream = Box::pin(self.client.copy_out(copy_query).await?);
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok((
            buf.clone(),
            CopyOutcome {
                bytes: buf.len() as u64,
                duration: started.elapsed(),
            },
        ))
    }

    async fn fetch_large_object_oids(&self) -> Result<Vec<u32>, AdapterError> {
        let rows = self.client.query("SELECT oid FROM pg_largeobject_metadata", &[]).await?;
        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn read_large_object(&self, lo_oid: u32) -> Result<Vec<u8>, AdapterError> {
        let row = self
            .client
            .query_one("SELECT lo_get($1::oid)", &[&(lo_oid as i64)])
            .await?;
        Ok(row.get(0))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_source_connection.rs"]
pub mod fake;

#[cfg(test)]
#[path = "source_connection_tests.rs"]
mod tests;
