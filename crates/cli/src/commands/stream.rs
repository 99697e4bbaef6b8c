// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stream {setup, cleanup, prefetch, catchup, receive, transform,
//! apply, sentinel {get, set}}` (spec §4.6): the Replication Follower's
//! command surface.

use std::path::Path;

use pgcopy_adapters::{PgApplyConnection, PgReplicationConnection, ReplicationConnection};
use pgcopy_core::{DecodedMessage, Lsn, Role};
use pgcopy_engine::follow::{run_applier, run_receiver, transform_segment, ApplierOptions, ReceiverOptions, WireDialect};

use crate::cli::{CommonArgs, SentinelCommand, SentinelSetCommand, StreamCommand};
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(command: &StreamCommand) -> Result<(), ExitError> {
    match command {
        StreamCommand::Setup(common) => setup(common).await,
        StreamCommand::Cleanup(common) => cleanup(common).await,
        StreamCommand::Prefetch(common) => prefetch(common).await,
        StreamCommand::Catchup(common) => catchup(common).await,
        StreamCommand::Receive(common) => receive(common).await,
        StreamCommand::Transform(common) => transform(common).await,
        StreamCommand::Apply(common) => apply(common).await,
        StreamCommand::Sentinel { command } => sentinel(command).await,
    }
}

fn dialect_for(plugin: &str) -> WireDialect {
    if plugin.eq_ignore_ascii_case("test_decoding") {
        WireDialect::Text
    } else {
        WireDialect::Json
    }
}

async fn setup(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let conn = PgReplicationConnection::connect(&session.source_uri).await?;
    let startpos = conn.create_slot_if_not_exists(&common.slot_name, &common.plugin).await?;
    let sentinel = session.catalog.setup_sentinel(startpos)?;
    if let Some(endpos) = &common.endpos {
        let endpos: Lsn = endpos
            .parse()
            .map_err(|_| ExitError::bad_args(format!("invalid --endpos {endpos:?}")))?;
        session.catalog.update_endpos(endpos)?;
    }
    println!("{}", serde_json::to_string_pretty(&sentinel)?);
    session.catalog.close()?;
    Ok(())
}

async fn cleanup(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    session.catalog.delete_all_lsn_mappings()?;
    let cdc_dir = session.ctx.workdir.cdc_dir();
    for entry in std::fs::read_dir(&cdc_dir)?.flatten() {
        let path = entry.path();
        if path.is_file() {
            std::fs::remove_file(&path)?;
        }
    }
    println!("{}", serde_json::json!({ "status": "ok" }));
    session.catalog.close()?;
    Ok(())
}

async fn receive(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let conn = PgReplicationConnection::connect(&session.source_uri).await?;
    let options = ReceiverOptions {
        slot_name: common.slot_name.clone(),
        plugin: common.plugin.clone(),
        dialect: dialect_for(&common.plugin),
        feedback_interval: std::time::Duration::from_secs(10),
    };
    let report = run_receiver(&session.ctx, &session.catalog, &conn, &options).await?;
    println!(
        "{}",
        serde_json::json!({
            "messages_received": report.messages_received,
            "segments_written": report.segments_written,
            "last_lsn": report.last_lsn.to_string(),
        })
    );
    session.catalog.close()?;
    Ok(())
}

/// Drive [`transform_segment`] over every `.json` segment that has no
/// matching `.sql` file yet, oldest first.
async fn transform(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let cdc_dir = session.ctx.workdir.cdc_dir();
    let mut segments = pending_json_segments(&cdc_dir)?;
    segments.sort();

    let mut transformed = 0u64;
    for stem in &segments {
        let json_path = cdc_dir.join(format!("{stem}.json"));
        let sql_path = cdc_dir.join(format!("{stem}.sql"));
        if sql_path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(&json_path)?;
        let messages: Vec<DecodedMessage> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        let sql = transform_segment(&messages);
        std::fs::write(&sql_path, sql)?;
        transformed += 1;
    }

    println!("{}", serde_json::json!({ "segments_transformed": transformed }));
    session.catalog.close()?;
    Ok(())
}

/// Segment stems (the shared basename of a `<stem>.json`/`<stem>.sql`
/// pair, spec §6) present as a `.json` file under `cdc_dir`.
fn pending_json_segments(cdc_dir: &Path) -> Result<Vec<String>, ExitError> {
    let mut stems = Vec::new();
    let entries = match std::fs::read_dir(cdc_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(stems),
        Err(error) => return Err(error.into()),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            // Validate it's a segment id, not some other JSON file that
            // might land in the CDC directory (e.g. `lsn.json`).
            if u64::from_str_radix(stem, 16).is_ok() {
                stems.push(stem.to_string());
            }
        }
    }
    Ok(stems)
}

async fn apply(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let conn = PgApplyConnection::connect(&session.target_uri).await?;
    let options = ApplierOptions {
        origin_name: common.origin.clone(),
    };
    let report = run_applier(&session.ctx, &session.catalog, &conn, &options).await?;
    println!(
        "{}",
        serde_json::json!({
            "segments_applied": report.segments_applied,
            "transactions_applied": report.transactions_applied,
            "transactions_skipped": report.transactions_skipped,
            "last_lsn": report.last_lsn.to_string(),
            "reached_endpos": report.reached_endpos,
        })
    );
    session.catalog.close()?;
    Ok(())
}

/// Receive and transform without applying, to warm the CDC segments
/// ahead of cutover.
async fn prefetch(common: &CommonArgs) -> Result<(), ExitError> {
    receive(common).await?;
    transform(common).await
}

/// Prefetch then apply in one run.
async fn catchup(common: &CommonArgs) -> Result<(), ExitError> {
    prefetch(common).await?;
    apply(common).await
}

async fn sentinel(command: &SentinelCommand) -> Result<(), ExitError> {
    match command {
        SentinelCommand::Get(common) => sentinel_get(common).await,
        SentinelCommand::Set { command } => match command {
            SentinelSetCommand::Startpos { lsn, common } => sentinel_set_startpos(common, lsn).await,
            SentinelSetCommand::Endpos { lsn, common } => sentinel_set_endpos(common, lsn).await,
            SentinelSetCommand::Apply { enabled, common } => sentinel_set_apply(common, *enabled).await,
        },
    }
}

async fn sentinel_get(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let sentinel = session
        .catalog
        .sentinel()?
        .ok_or_else(|| ExitError::bad_args("no sentinel row; run `stream setup` first"))?;
    println!("{}", serde_json::to_string_pretty(&sentinel)?);
    session.catalog.close()?;
    Ok(())
}

async fn sentinel_set_startpos(common: &CommonArgs, lsn: &str) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let lsn: Lsn = lsn.parse().map_err(|_| ExitError::bad_args(format!("invalid LSN {lsn:?}")))?;
    // `setup_sentinel` only creates the row on a fresh follower; on an
    // existing one this is a no-op, matching `stream setup`'s own
    // resume behavior rather than rewinding an in-progress follower.
    session.catalog.setup_sentinel(lsn)?;
    println!("{}", serde_json::json!({ "status": "ok" }));
    session.catalog.close()?;
    Ok(())
}

async fn sentinel_set_endpos(common: &CommonArgs, lsn: &str) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let lsn: Lsn = lsn.parse().map_err(|_| ExitError::bad_args(format!("invalid LSN {lsn:?}")))?;
    let sentinel = session.catalog.update_endpos(lsn)?;
    println!("{}", serde_json::to_string_pretty(&sentinel)?);
    session.catalog.close()?;
    Ok(())
}

async fn sentinel_set_apply(common: &CommonArgs, enabled: bool) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Follow)?;
    let sentinel = session.catalog.update_apply(enabled)?;
    println!("{}", serde_json::to_string_pretty(&sentinel)?);
    session.catalog.close()?;
    Ok(())
}
