// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Large object copy worker flow (spec §4.7): one lockfile/donefile
//! cycle per large object oid, same restart discipline as a table copy,
//! streamed via `lo_get`/`lo_from_bytea` instead of `COPY`.

use pgcopy_adapters::{SourceConnection, TargetConnection};
use pgcopy_core::Clock;

use crate::ctx::Ctx;
use crate::donefile::{acquire_lock, is_done, write_donefile, DoneRecord, LockOutcome};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobCopyOutcome {
    OwnedElsewhere,
    AlreadyDone,
    Copied { bytes: u64 },
}

/// Copy one large object from `source` to `target`.
pub async fn copy_blob<S, T, C>(
    ctx: &Ctx<C>,
    source: &S,
    target: &T,
    lo_oid: u32,
    resume: bool,
) -> Result<BlobCopyOutcome, EngineError>
where
    S: SourceConnection,
    T: TargetConnection,
    C: Clock,
{
    let done_path = ctx.workdir.done_dir().join(format!("lo-{lo_oid}.done"));
    if is_done(&done_path) {
        return Ok(BlobCopyOutcome::AlreadyDone);
    }

    let resource = format!("large object {lo_oid}");
    let lock_path = ctx.workdir.los_dir().join(format!("{lo_oid}.lock"));
    let guard = match acquire_lock(&lock_path, &resource, resume)? {
        LockOutcome::OwnedByLivePid => return Ok(BlobCopyOutcome::OwnedElsewhere),
        LockOutcome::Acquired(guard) => guard,
    };

    let started_at_ms = ctx.clock.epoch_ms();
    let data = source.read_large_object(lo_oid).await.map_err(EngineError::Source)?;
    target
        .write_large_object(lo_oid, &data)
        .await
        .map_err(EngineError::Target)?;
    let done_at_ms = ctx.clock.epoch_ms();

    write_donefile(
        &done_path,
        &DoneRecord {
            pid: std::process::id(),
            resource,
            started_at_ms,
            done_at_ms,
            byte_count: data.len() as u64,
            command: format!("lo_from_bytea({lo_oid}, ...)"),
        },
    )?;
    drop(guard);

    Ok(BlobCopyOutcome::Copied { bytes: data.len() as u64 })
}

/// Copy every large object unless the run was started with
/// `--skip-blobs`.
pub async fn copy_all_blobs<S, T, C>(
    ctx: &Ctx<C>,
    source: &S,
    target: &T,
    resume: bool,
) -> Result<u64, EngineError>
where
    S: SourceConnection,
    T: TargetConnection,
    C: Clock,
{
    if ctx.options.skip_large_objects {
        return Ok(0);
    }
    let oids = source.fetch_large_object_oids().await.map_err(EngineError::Source)?;
    let mut total_bytes = 0u64;
    for lo_oid in oids {
        if ctx.signals.should_stop_fast() {
            break;
        }
        if let BlobCopyOutcome::Copied { bytes } = copy_blob(ctx, source, target, lo_oid, resume).await? {
            total_bytes += bytes;
        }
    }
    Ok(total_bytes)
}

#[cfg(test)]
#[path = "blobs_tests.rs"]
mod tests;
