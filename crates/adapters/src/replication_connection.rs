// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Receiver's logical replication connection (spec §4.6): system
//! identification, timeline history, and the `COPY BOTH` replication
//! stream itself. The payload carried by each message is opaque bytes
//! here — decoding it into a `DecodedMessage` is the Transformer's job,
//! not this connection's, since the payload shape depends on the output
//! plugin (`wal2json`-style JSON or a line-oriented text dialect).

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use pgcopy_core::Lsn;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio_postgres::replication::ReplicationStream;
use tokio_postgres::types::PgLsn;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use crate::error::AdapterError;

/// Response to `IDENTIFY_SYSTEM` (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemIdentification {
    pub system_id: String,
    pub timeline: u32,
    pub xlogpos: Lsn,
    pub dbname: Option<String>,
}

/// One message off the replication stream. Keepalives are distinguished
/// from data records before any plugin-specific decoding happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawReplicationMessage {
    Data { wal_start: Lsn, wal_end: Lsn, payload: Vec<u8> },
    Keepalive { wal_end: Lsn, reply_requested: bool },
}

/// A connection to the source dedicated to logical decoding. Unlike
/// `SourceConnection`, this connection issues replication-protocol
/// commands (`IDENTIFY_SYSTEM`, `TIMELINE_HISTORY`, `START_REPLICATION`)
/// rather than ordinary SQL, so it is kept on a trait of its own.
#[async_trait]
pub trait ReplicationConnection: Send + Sync + 'static {
    async fn identify_system(&self) -> Result<SystemIdentification, AdapterError>;

    /// Fetch the raw contents of `<timeline>.history`, parsed by the
    /// caller (one `tli<TAB>end_lsn<TAB>reason` line per entry).
    async fn timeline_history(&self, timeline: u32) -> Result<Vec<u8>, AdapterError>;

    /// The server's configured WAL segment size, used to decide when a
    /// received LSN has crossed a rotation boundary.
    async fn wal_segment_size(&self) -> Result<u64, AdapterError>;

    /// Create the replication slot if it does not already exist,
    /// returning the LSN at which decoding becomes consistent.
    async fn create_slot_if_not_exists(&self, slot_name: &str, plugin: &str) -> Result<Lsn, AdapterError>;

    /// Open `START_REPLICATION SLOT ... LOGICAL <start_lsn> (...)`.
    /// Must be called before `receive_message`/`send_feedback`.
    async fn start_replication(&self, slot_name: &str, plugin: &str, start_lsn: Lsn, options: &[(String, String)]) -> Result<(), AdapterError>;

    /// Pull the next message, or `None` on EOF (the source ended the
    /// stream, which the Receiver treats as a connection loss to retry).
    async fn receive_message(&self) -> Result<Option<RawReplicationMessage>, AdapterError>;

    /// Send a standby status update, pinned to `flush_lsn` from the
    /// sentinel so the slot never advances past durably-applied work.
    async fn send_feedback(&self, write_lsn: Lsn, flush_lsn: Lsn, apply_lsn: Lsn, reply_requested: bool) -> Result<(), AdapterError>;
}

fn to_pg_lsn(lsn: Lsn) -> PgLsn {
    PgLsn::from(lsn.0)
}

fn from_pg_lsn(lsn: PgLsn) -> Lsn {
    Lsn(u64::from(lsn))
}

/// Real `ReplicationConnection` backed by a `tokio_postgres::Client`
/// opened with `replication=database` in its connection string.
pub struct PgReplicationConnection {
    client: Client,
    stream: Mutex<Option<ReplicationStream>>,
}

impl PgReplicationConnection {
    pub async fn connect(conninfo: &str) -> Result<Self, AdapterError> {
        let (client, connection) = tokio_postgres::connect(conninfo, NoTls).await?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(%error, "replication connection driver exited");
            }
        });
        Ok(Self {
            client,
            stream: Mutex::new(None),
        })
    }

    fn parse_identify_system(row: &SimpleQueryMessage) -> Option<SystemIdentification> {
        let SimpleQueryMessage::Row(row) = row else {
            return None;
        };
        let xlogpos: Lsn = row.get(2)?.parse().ok()?;
        Some(SystemIdentification {
            system_id: row.get(0)?.to_string(),
            timeline: row.get(1)?.parse().ok()?,
            xlogpos,
            dbname: row.get(3).map(|s| s.to_string()),
        })
    }
}

#[async_trait]
impl ReplicationConnection for PgReplicationConnection {
    async fn identify_system(&self) -> Result<SystemIdentification, AdapterError> {
        let rows = self.client.simple_query("IDENTIFY_SYSTEM").await?;
        rows.iter()
            .find_map(Self::parse_identify_system)
            .ok_or_else(|| AdapterError::Malformed("IDENTIFY_SYSTEM response".to_string()))
    }

    async fn timeline_history(&self, timeline: u32) -> Result<Vec<u8>, AdapterError> {
        let rows = self.client.simple_query(&format!("TIMELINE_HISTORY {timeline}")).await?;
        for message in rows {
            if let SimpleQueryMessage::Row(row) = message {
                if let Some(contents) = row.get(1) {
                    return Ok(contents.as_bytes().to_vec());
                }
            }
        }
        Err(AdapterError::Malformed("TIMELINE_HISTORY response".to_string()))
    }

    async fn wal_segment_size(&self) -> Result<u64, AdapterError> {
        let row = self
            .client
            .query_one("SELECT setting::bigint FROM pg_settings WHERE name = 'wal_segment_size'", &[])
            .await?;
        Ok(row.get::<_, i64>(0) as u64)
    }

    async fn create_slot_if_not_exists(&self, slot_name: &str, plugin: &str) -> Result<Lsn, AdapterError> {
        let existing = self
            .client
            .query_opt("SELECT confirmed_flush_lsn FROM pg_replication_slots WHERE slot_name = $1", &[&slot_name])
            .await?;
        if let Some(row) = existing {
            let lsn: Option<String> = row.get(0);
            if let Some(lsn) = lsn {
                return lsn.parse().map_err(|_| AdapterError::Malformed(format!("slot lsn {lsn:?}")));
            }
        }
        let rows = self
            .client
            .simple_query(&format!("CREATE_REPLICATION_SLOT {slot_name} LOGICAL {plugin}"))
            .await?;
        rows.iter()
            .find_map(|message| match message {
                SimpleQueryMessage::Row(row) => row.get(1).and_then(|s| s.parse().ok()),
                _ => None,
            })
            .ok_or_else(|| AdapterError::Malformed("CREATE_REPLICATION_SLOT response".to_string()))
    }

    async fn start_replication(&self, slot_name: &str, plugin: &str, start_lsn: Lsn, options: &[(String, String)]) -> Result<(), AdapterError> {
        let mut option_list = options
            .iter()
            .map(|(k, v)| format!("\"{k}\" '{v}'"))
            .collect::<Vec<_>>()
            .join(", ");
        if !option_list.is_empty() {
            option_list = format!(" ({option_list})");
        }
        let query = format!("START_REPLICATION SLOT {slot_name} LOGICAL {start_lsn}{option_list}");
        let duplex = self.client.copy_both_simple::<bytes::Bytes>(&query).await?;
        let _ = plugin;
        *self.stream.lock().await = Some(ReplicationStream::new(duplex));
        Ok(())
    }

    async fn receive_message(&self) -> Result<Option<RawReplicationMessage>, AdapterError> {
        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| AdapterError::Malformed("receive_message called before start_replication".to_string()))?;
        match std::pin::Pin::new(stream).next().await {
            None => Ok(None),
            Some(Err(error)) => Err(AdapterError::Database(error)),
            Some(Ok(message)) => Ok(Some(match message {
                tokio_postgres::replication::ReplicationMessage::XLogData(data) => RawReplicationMessage::Data {
                    wal_start: from_pg_lsn(data.wal_start()),
                    wal_end: from_pg_lsn(data.wal_end()),
                    payload: data.into_data().to_vec(),
                },
                tokio_postgres::replication::ReplicationMessage::PrimaryKeepAlive(keepalive) => RawReplicationMessage::Keepalive {
                    wal_end: from_pg_lsn(keepalive.wal_end()),
                    reply_requested: keepalive.reply() != 0,
                },
            })),
        }
    }

    async fn send_feedback(&self, write_lsn: Lsn, flush_lsn: Lsn, apply_lsn: Lsn, reply_requested: bool) -> Result<(), AdapterError> {
        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| AdapterError::Malformed("send_feedback called before start_replication".to_string()))?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        std::pin::Pin::new(stream)
            .standby_status_update(
                to_pg_lsn(write_lsn),
                to_pg_lsn(flush_lsn),
                to_pg_lsn(apply_lsn),
                now,
                u8::from(reply_requested),
            )
            .await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "fake_replication_connection.rs"]
pub mod fake;

#[cfg(test)]
#[path = "replication_connection_tests.rs"]
mod tests;
