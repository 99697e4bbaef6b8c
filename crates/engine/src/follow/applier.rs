// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Applier (spec §4.6): replays a Transformer segment's SQL
//! statements against the target inside one transaction per source
//! transaction, tagged with a replication origin so a restart after a
//! crash never replays a commit twice. Processes whatever segment files
//! already exist under the CDC work directory and returns; the daemon
//! that owns the follower's lifecycle is what calls this again to keep
//! following as new segments land.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use pgcopy_adapters::ApplyConnection;
use pgcopy_core::{ChangeAction, Clock, Lsn, SegmentId};
use pgcopy_storage::CatalogStore;

use crate::ctx::Ctx;
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct ApplierOptions {
    pub origin_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub segments_applied: u64,
    pub transactions_applied: u64,
    pub transactions_skipped: u64,
    pub last_lsn: Lsn,
    pub reached_endpos: bool,
}

/// A marker line's decoded shape, mirroring `transformer::Marker` but
/// owned so the Applier can hold one across the statement lines that
/// follow it.
#[derive(Debug, Clone, Deserialize)]
struct ParsedMarker {
    action: ChangeAction,
    #[allow(dead_code)]
    xid: Option<u32>,
    lsn: Lsn,
    timestamp: Option<i64>,
}

pub async fn run_applier<A, C>(
    ctx: &Ctx<C>,
    catalog: &CatalogStore<C>,
    conn: &A,
    options: &ApplierOptions,
) -> Result<ApplyReport, EngineError>
where
    A: ApplyConnection,
    C: Clock,
{
    conn.setup_origin(&options.origin_name).await.map_err(EngineError::Target)?;
    let resume_point = conn.origin_progress(&options.origin_name).await.map_err(EngineError::Target)?;

    republish_sentinel_startpos(catalog, conn).await?;

    let mut report = ApplyReport::default();
    let sentinel = catalog.sentinel()?.ok_or(pgcopy_storage::CatalogError::SentinelMissing)?;
    if sentinel.reached_endpos() {
        report.reached_endpos = true;
        report.last_lsn = sentinel.replay_lsn;
        return Ok(report);
    }

    for (_segment_id, path) in list_segment_files(&ctx.workdir.cdc_dir())? {
        if ctx.signals.should_stop() {
            break;
        }
        let applied = apply_segment_file(catalog, conn, &path, resume_point, &mut report).await?;
        if applied {
            report.segments_applied += 1;
        }

        let sentinel = catalog.sentinel()?.ok_or(pgcopy_storage::CatalogError::SentinelMissing)?;
        if sentinel.reached_endpos() {
            report.reached_endpos = true;
            report.last_lsn = sentinel.replay_lsn;
            break;
        }
    }

    Ok(report)
}

/// Reconcile the locally tracked source/target LSN pairs against the
/// target's current WAL position, and publish the newest source LSN the
/// target has actually caught up to back as the sentinel's `startpos`
/// (spec §4.6). The Streamer has no view into the target's replication
/// origin, so this is how it learns where to resume requesting WAL from
/// after a restart.
async fn republish_sentinel_startpos<A, C>(catalog: &CatalogStore<C>, conn: &A) -> Result<(), EngineError>
where
    A: ApplyConnection,
    C: Clock,
{
    let target_flush = conn.target_insert_lsn().await.map_err(EngineError::Target)?;
    let mappings = catalog.lsn_mappings_newest_first()?;
    let Some(mapping) = mappings.into_iter().find(|mapping| mapping.target_insert_lsn <= target_flush) else {
        return Ok(());
    };
    catalog.update_startpos(mapping.source_lsn)?;
    Ok(())
}

/// List the `.sql` segment files under `cdc_dir`, oldest first.
fn list_segment_files(cdc_dir: &Path) -> Result<Vec<(SegmentId, PathBuf)>, EngineError> {
    let mut files = Vec::new();
    let entries = match std::fs::read_dir(cdc_dir) {
        Ok(entries) => entries,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(source) => {
            return Err(EngineError::Io {
                path: cdc_dir.to_path_buf(),
                source,
            })
        }
    };
    for entry in entries {
        let entry = entry.map_err(|source| EngineError::Io {
            path: cdc_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(raw) = u64::from_str_radix(stem, 16) else {
            continue;
        };
        files.push((SegmentId(Lsn(raw)), path));
    }
    files.sort_by_key(|(id, _)| *id);
    Ok(files)
}

/// Replay one segment file's marker/statement pairs. Returns whether any
/// transaction in it was actually applied (as opposed to all being
/// skipped as already-applied duplicates).
async fn apply_segment_file<A, C>(
    catalog: &CatalogStore<C>,
    conn: &A,
    path: &Path,
    resume_point: Option<Lsn>,
    report: &mut ApplyReport,
) -> Result<bool, EngineError>
where
    A: ApplyConnection,
    C: Clock,
{
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut applied_any = false;
    let mut in_transaction = false;
    let mut begin_lsn = Lsn::ZERO;
    let mut begin_timestamp = None;
    let mut skipping = false;

    let mut lines = content.lines().peekable();
    while let Some(line) = lines.next() {
        let Some(marker_json) = line.strip_prefix("-- ") else {
            continue;
        };
        let marker: ParsedMarker = serde_json::from_str(marker_json).map_err(|source| EngineError::MalformedDonefile {
            resource: path.display().to_string(),
            reason: format!("bad marker line: {source}"),
        })?;
        let statement = lines
            .next_if(|next| !next.starts_with("-- "))
            .map(|s| s.to_string());

        match marker.action {
            ChangeAction::Begin => {
                in_transaction = true;
                begin_lsn = marker.lsn;
                begin_timestamp = marker.timestamp;
                skipping = resume_point.is_some_and(|resume| begin_lsn <= resume);
                if !skipping {
                    conn.begin_with_origin(begin_lsn, begin_timestamp)
                        .await
                        .map_err(EngineError::Target)?;
                }
            }
            ChangeAction::Commit => {
                if skipping {
                    report.transactions_skipped += 1;
                } else {
                    conn.commit().await.map_err(EngineError::Target)?;
                    let target_lsn = conn.target_insert_lsn().await.map_err(EngineError::Target)?;
                    catalog.add_lsn_mapping(begin_lsn, target_lsn)?;
                    catalog.sync_apply(marker.lsn)?;
                    report.transactions_applied += 1;
                    applied_any = true;
                }
                report.last_lsn = marker.lsn;
                in_transaction = false;
                skipping = false;
            }
            ChangeAction::Keepalive | ChangeAction::Switch => {
                if !in_transaction {
                    catalog.sync_apply(marker.lsn)?;
                    report.last_lsn = marker.lsn;
                }
            }
            ChangeAction::Insert | ChangeAction::Update | ChangeAction::Delete | ChangeAction::Truncate => {
                if !skipping {
                    if let Some(statement) = statement {
                        conn.execute_in_transaction(&statement).await.map_err(EngineError::Target)?;
                    }
                }
            }
        }
    }

    Ok(applied_any)
}

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;
