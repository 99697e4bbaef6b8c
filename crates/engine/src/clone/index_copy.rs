// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-index worker flow (spec §4.4 step 5, §4.4.3): build one index or
//! constraint concurrently against the target, guarded by the same
//! lockfile/donefile discipline as table copies. Triggered once the
//! index's owning table's donefile has appeared.

use pgcopy_adapters::TargetConnection;
use pgcopy_core::{Clock, SourceIndex};
use pgcopy_runbook::FilterSet;

use crate::ctx::Ctx;
use crate::donefile::{acquire_lock, is_done, write_donefile, DoneRecord, LockOutcome};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuildOutcome {
    FilteredOut,
    OwnedElsewhere,
    AlreadyDone,
    Built,
}

/// Build one index on `target`, honoring `filters` and the restart
/// discipline.
pub async fn build_index<T, C>(
    ctx: &Ctx<C>,
    target: &T,
    index: &SourceIndex,
    filters: &FilterSet,
    resume: bool,
) -> Result<IndexBuildOutcome, EngineError>
where
    T: TargetConnection,
    C: Clock,
{
    let decision = filters.resolve(Some(index.oid), &index.restore_list_name);
    if !decision.restores_object() {
        return Ok(IndexBuildOutcome::FilteredOut);
    }

    let done_path = ctx.workdir.done_dir().join(format!("index-{}.done", index.oid));
    if is_done(&done_path) {
        return Ok(IndexBuildOutcome::AlreadyDone);
    }

    let lock_path = ctx.workdir.indexes_dir().join(format!("{}.lock", index.oid));
    let guard = match acquire_lock(&lock_path, &index.restore_list_name, resume)? {
        LockOutcome::OwnedByLivePid => return Ok(IndexBuildOutcome::OwnedElsewhere),
        LockOutcome::Acquired(guard) => guard,
    };

    let started_at_ms = ctx.clock.epoch_ms();
    target.create_index(&index.definition).await.map_err(EngineError::Target)?;
    let done_at_ms = ctx.clock.epoch_ms();

    write_donefile(
        &done_path,
        &DoneRecord {
            pid: std::process::id(),
            resource: index.restore_list_name.clone(),
            started_at_ms,
            done_at_ms,
            byte_count: 0,
            command: index.definition.clone(),
        },
    )?;
    drop(guard);

    Ok(IndexBuildOutcome::Built)
}

#[cfg(test)]
#[path = "index_copy_tests.rs"]
mod tests;
