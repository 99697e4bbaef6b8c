// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Receiver (spec §4.6): opens the logical replication connection,
//! identifies the system, fetches timeline history when needed, and
//! writes one JSON record per received message into segment files under
//! the CDC work directory, rotating on a WAL segment boundary crossing.

use std::time::{Duration, Instant};

use pgcopy_adapters::{RawReplicationMessage, ReplicationConnection};
use pgcopy_core::{Clock, Lsn, SegmentId, SegmentPaths};
use pgcopy_storage::CatalogStore;
use tokio::io::AsyncWriteExt;

use crate::ctx::Ctx;
use crate::error::EngineError;
use crate::follow::decode::{decode_message, WireDialect};

#[derive(Debug, Clone)]
pub struct ReceiverOptions {
    pub slot_name: String,
    pub plugin: String,
    pub dialect: WireDialect,
    pub feedback_interval: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverReport {
    pub messages_received: u64,
    pub segments_written: u64,
    pub last_lsn: Lsn,
}

/// One entry of a parsed timeline history, plus the synthesized "tip"
/// entry for the current timeline (spec §9 open question 3: its `end`
/// is unbounded, represented here as `Lsn::MAX`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineHistoryEntry {
    pub timeline: u32,
    pub begin: Lsn,
    pub end: Lsn,
    pub reason: String,
}

impl TimelineHistoryEntry {
    pub fn contains(&self, lsn: Lsn) -> bool {
        lsn >= self.begin && lsn < self.end
    }
}

/// Parse a `TIMELINE_HISTORY` response (`tli<TAB>end_lsn<TAB>reason`,
/// one entry per past timeline) and append the tip entry for
/// `current_timeline`.
pub fn parse_timeline_history(content: &[u8], current_timeline: u32) -> Result<Vec<TimelineHistoryEntry>, EngineError> {
    let text = std::str::from_utf8(content).map_err(|_| EngineError::MalformedDonefile {
        resource: "timeline history".to_string(),
        reason: "not valid UTF-8".to_string(),
    })?;

    let mut entries = Vec::new();
    let mut begin = Lsn::ZERO;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (Some(tli), Some(end_lsn), reason) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };
        let timeline: u32 = tli.parse().map_err(|_| EngineError::MalformedDonefile {
            resource: "timeline history".to_string(),
            reason: format!("bad timeline {tli:?}"),
        })?;
        let end: Lsn = end_lsn.parse().map_err(|_| EngineError::MalformedDonefile {
            resource: "timeline history".to_string(),
            reason: format!("bad lsn {end_lsn:?}"),
        })?;
        entries.push(TimelineHistoryEntry {
            timeline,
            begin,
            end,
            reason: reason.unwrap_or_default().trim().to_string(),
        });
        begin = end;
    }

    entries.push(TimelineHistoryEntry {
        timeline: current_timeline,
        begin,
        end: Lsn::MAX,
        reason: "current timeline".to_string(),
    });
    Ok(entries)
}

/// The segment a message at `wal_start` belongs to: the server's WAL
/// position floored to `segment_size`.
pub fn segment_for(wal_start: Lsn, segment_size: u64) -> SegmentId {
    if segment_size == 0 {
        return SegmentId(wal_start);
    }
    SegmentId(Lsn(wal_start.0 - (wal_start.0 % segment_size)))
}

#[allow(clippy::too_many_arguments)]
pub async fn run_receiver<R, C>(
    ctx: &Ctx<C>,
    catalog: &CatalogStore<C>,
    conn: &R,
    options: &ReceiverOptions,
) -> Result<ReceiverReport, EngineError>
where
    R: ReplicationConnection,
    C: Clock,
{
    let identification = conn.identify_system().await.map_err(EngineError::Source)?;
    if identification.timeline > 1 {
        let history = conn.timeline_history(identification.timeline).await.map_err(EngineError::Source)?;
        parse_timeline_history(&history, identification.timeline)?;
    }
    let segment_size = conn.wal_segment_size().await.map_err(EngineError::Source)?;
    conn.create_slot_if_not_exists(&options.slot_name, &options.plugin)
        .await
        .map_err(EngineError::Source)?;

    let sentinel = catalog.sentinel()?.ok_or(pgcopy_storage::CatalogError::SentinelMissing)?;
    conn.start_replication(&options.slot_name, &options.plugin, sentinel.startpos, &[])
        .await
        .map_err(EngineError::Source)?;

    let mut report = ReceiverReport {
        last_lsn: sentinel.startpos,
        ..Default::default()
    };
    let mut current_segment: Option<SegmentId> = None;
    let mut current_file: Option<tokio::fs::File> = None;
    let mut last_feedback = Instant::now();

    loop {
        if ctx.signals.should_stop() {
            break;
        }

        let message = conn.receive_message().await.map_err(EngineError::Source)?;
        let Some(message) = message else {
            break;
        };

        match message {
            RawReplicationMessage::Data { wal_start, wal_end, payload } => {
                let decoded = decode_message(options.dialect, &payload, wal_end)?;
                let segment_id = segment_for(wal_start, segment_size);
                if current_segment != Some(segment_id) {
                    let paths = SegmentPaths::new(&ctx.workdir.cdc_dir(), segment_id);
                    current_file = Some(
                        tokio::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(&paths.json_path)
                            .await
                            .map_err(|source| EngineError::Io { path: paths.json_path.clone(), source })?,
                    );
                    current_segment = Some(segment_id);
                    report.segments_written += 1;
                }
                let mut line = serde_json::to_vec(&decoded).expect("DecodedMessage serializes infallibly");
                line.push(b'\n');
                if let Some(file) = current_file.as_mut() {
                    file.write_all(&line).await.map_err(|source| EngineError::Io {
                        path: ctx.workdir.cdc_dir(),
                        source,
                    })?;
                }
                report.messages_received += 1;
                report.last_lsn = wal_end;
            }
            RawReplicationMessage::Keepalive { wal_end, reply_requested } => {
                report.last_lsn = wal_end;
                if reply_requested {
                    send_feedback(conn, catalog, &report).await?;
                    last_feedback = Instant::now();
                }
            }
        }

        if last_feedback.elapsed() >= options.feedback_interval {
            send_feedback(conn, catalog, &report).await?;
            last_feedback = Instant::now();
        }
    }

    Ok(report)
}

async fn send_feedback<R, C>(conn: &R, catalog: &CatalogStore<C>, report: &ReceiverReport) -> Result<(), EngineError>
where
    R: ReplicationConnection,
    C: Clock,
{
    // flush_lsn reported upstream is pinned to the Applier's own
    // replay_lsn, not the Receiver's write position, so the slot never
    // advances past what has been durably applied on the target.
    let current = catalog.sentinel()?.ok_or(pgcopy_storage::CatalogError::SentinelMissing)?;
    let flush_lsn = current.replay_lsn;
    catalog.sync_recv(report.last_lsn, flush_lsn)?;
    conn.send_feedback(report.last_lsn, flush_lsn, current.replay_lsn, false)
        .await
        .map_err(EngineError::Source)
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
