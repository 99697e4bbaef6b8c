// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-table copy worker flow (spec §4.4.2): claim the table's lockfile,
//! stream each partition through the source/target pipe, write the
//! donefile, release the lock. Runs once per table, invoked by the
//! table worker pool for every `WorkItem::TableOid` it pops off the
//! queue.

use pgcopy_adapters::{SourceConnection, TargetConnection};
use pgcopy_core::{Clock, SourceTable};
use pgcopy_runbook::{copies_data, FilterSet};

use crate::clone::partitioning::plan_table_copy;
use crate::ctx::Ctx;
use crate::donefile::{acquire_lock, is_done, write_donefile, DoneRecord, LockOutcome};
use crate::error::EngineError;

/// What happened to one table when the worker pool processed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCopyOutcome {
    /// Filtered out entirely (`ExcludeTable`/`ExcludeSchema`) or data
    /// excluded (`ExcludeTableData`): no rows moved, no lock taken.
    FilteredOut,
    /// A live sibling process already owns this table's lock.
    OwnedElsewhere,
    /// Already had a donefile from a previous run.
    AlreadyDone,
    /// Copied now.
    Copied { parts: u32, bytes: u64 },
}

/// Copy one table's row data from `source` to `target`, honoring
/// `filters` and the lockfile/donefile restart discipline.
pub async fn copy_table<S, T, C>(
    ctx: &Ctx<C>,
    source: &S,
    target: &T,
    table: &SourceTable,
    filters: &FilterSet,
    resume: bool,
) -> Result<TableCopyOutcome, EngineError>
where
    S: SourceConnection,
    T: TargetConnection,
    C: Clock,
{
    if !copies_data(filters, table.oid, &table.restore_list_name) {
        return Ok(TableCopyOutcome::FilteredOut);
    }

    let done_path = ctx.workdir.done_dir().join(format!("table-{}.done", table.oid));
    if is_done(&done_path) {
        return Ok(TableCopyOutcome::AlreadyDone);
    }

    let lock_path = ctx.workdir.tables_dir().join(format!("{}.lock", table.oid));
    let guard = match acquire_lock(&lock_path, &table.qualified_name(), resume)? {
        LockOutcome::OwnedByLivePid => return Ok(TableCopyOutcome::OwnedElsewhere),
        LockOutcome::Acquired(guard) => guard,
    };

    let parts = plan_table_copy(table, &ctx.options);
    let qualified = table.qualified_name();
    let copy_in_query = format!("COPY {qualified} FROM STDIN");
    let started_at_ms = ctx.clock.epoch_ms();
    let mut bytes_copied = 0u64;

    for part in &parts {
        if ctx.signals.should_stop_fast() {
            break;
        }
        let copy_out_query = match &part.where_clause {
            Some(clause) => format!("COPY (SELECT * FROM {qualified} WHERE {clause}) TO STDOUT"),
            None => format!("COPY {qualified} TO STDOUT"),
        };
        let (data, outcome) = source.copy_table_to(&copy_out_query).await.map_err(EngineError::Source)?;
        target
            .copy_table_from(&copy_in_query, &data)
            .await
            .map_err(EngineError::Target)?;
        bytes_copied += outcome.bytes;
    }

    let done_at_ms = ctx.clock.epoch_ms();
    write_donefile(
        &done_path,
        &DoneRecord {
            pid: std::process::id(),
            resource: qualified.clone(),
            started_at_ms,
            done_at_ms,
            byte_count: bytes_copied,
            command: copy_in_query,
        },
    )?;
    drop(guard);

    Ok(TableCopyOutcome::Copied {
        parts: parts.len() as u32,
        bytes: bytes_copied,
    })
}

#[cfg(test)]
#[path = "table_copy_tests.rs"]
mod tests;
