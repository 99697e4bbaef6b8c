// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a parsed [`CommonArgs`] into the engine's `Ctx`, an opened
//! catalog store, and the claimed primary pidfile, applying the
//! `--restart`/`--resume` arbitration from `pgcopy_core::decide_startup`
//! (spec §4.1) before any worker touches the work directory.

use std::path::PathBuf;

use pgcopy_core::{FilterDecision, RefuseReason, Role, SystemClock, Workdir};
use pgcopy_engine::{Ctx, RunOptions};
use pgcopy_storage::CatalogStore;

use crate::cli::CommonArgs;
use crate::exit_error::ExitError;
use crate::filter_ini;

pub struct Session {
    pub ctx: Ctx<SystemClock>,
    pub catalog: CatalogStore<SystemClock>,
    pub pidfile: pgcopy_daemon::PidfileGuard,
    pub source_uri: String,
    pub target_uri: String,
}

pub fn run_options(common: &CommonArgs) -> RunOptions {
    RunOptions {
        table_jobs: common.table_jobs,
        index_jobs: common.index_jobs,
        lo_jobs: common.large_objects_jobs,
        fail_fast: common.fail_fast,
        skip_large_objects: common.skip_large_objects,
        drop_if_exists: common.drop_if_exists,
        split_threshold_bytes: common.split_tables_larger_than,
        split_max_parts: common.restore_jobs.max(1),
    }
}

fn workdir_for(common: &CommonArgs, role: Role) -> Workdir {
    match &common.dir {
        Some(dir) => Workdir::new(dir.clone()),
        None => Workdir::derive_default(role, &std::env::temp_dir()),
    }
}

/// Open (or create) the work directory, claim its primary pidfile, and
/// open the catalog store, refusing to proceed when `decide_startup`
/// says the run is unsafe.
pub fn open_session(common: &CommonArgs, role: Role) -> Result<Session, ExitError> {
    let workdir = workdir_for(common, role);
    for dir in workdir.all_dirs() {
        std::fs::create_dir_all(&dir)?;
    }
    // `schema_dir` isn't part of `all_dirs` (it holds pg_dump archives,
    // not run-state), but every dump/restore/clone path writes there.
    std::fs::create_dir_all(workdir.schema_dir())?;

    let pidfile_path = workdir.primary_pidfile();
    let existing = pgcopy_daemon::read(&pidfile_path)?;
    let pidfile_owner_alive = existing.as_ref().is_some_and(|p| pgcopy_daemon::is_alive(p.pid));
    let dir_is_nonempty = std::fs::read_dir(workdir.run_dir())
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);

    let source_uri = common
        .source
        .clone()
        .ok_or_else(|| ExitError::bad_args("--source (or PGCOPYDB_SOURCE_PGURI) is required"))?;
    let target_uri = common
        .target
        .clone()
        .ok_or_else(|| ExitError::bad_args("--target (or PGCOPYDB_TARGET_PGURI) is required"))?;

    let persisted_token = std::fs::read_to_string(workdir.snapshot_file()).ok();
    let decision = pgcopy_core::decide_startup(
        common.restart,
        common.resume,
        common.not_consistent,
        dir_is_nonempty,
        pidfile_owner_alive,
        persisted_token.as_deref(),
        common.snapshot.as_deref(),
    );
    match decision {
        pgcopy_core::StartupDecision::Refuse(reason) => {
            return Err(refuse_to_error(reason));
        }
        pgcopy_core::StartupDecision::ProceedFresh => {
            if let Some(prior) = existing {
                pgcopy_daemon::reclaim_stale(&pidfile_path, &prior, &workdir.top)?;
            }
        }
        pgcopy_core::StartupDecision::ProceedResumed => {}
    }

    let pidfile = pgcopy_daemon::claim(&pidfile_path, &pgcopy_daemon::Pidfile::mine(format!("{role}-log")))?;
    let catalog = CatalogStore::open(workdir.catalog_db_file())?;
    let ctx = Ctx::new(workdir, run_options(common), SystemClock);

    Ok(Session {
        ctx,
        catalog,
        pidfile,
        source_uri,
        target_uri,
    })
}

fn refuse_to_error(reason: RefuseReason) -> ExitError {
    use pgcopy_core::ExitCode;
    ExitError::new(ExitCode::BadState, reason.to_string())
}

/// Load and compile `--filters`, if one was given, against the catalog's
/// already-fetched tables and indexes. An absent `--filters` flag is not
/// an error: everything is included.
pub fn load_filters(
    common: &CommonArgs,
    catalog: &CatalogStore<SystemClock>,
) -> Result<pgcopy_runbook::FilterSet, ExitError> {
    let Some(path) = &common.filters else {
        return Ok(pgcopy_runbook::FilterSet::new());
    };
    let text = std::fs::read_to_string(path)?;
    let parsed = filter_ini::parse(&text)?;

    let mut tables = Vec::new();
    catalog.iter_tables(|table| {
        tables.push(table);
        Ok(())
    })?;
    let mut indexes = Vec::new();
    for table in &tables {
        catalog.iter_indexes_for_table(table.oid, |index| {
            indexes.push(index);
            Ok(())
        })?;
    }

    let decisions: Vec<FilterDecision> = filter_ini::compile(&parsed, &tables, &indexes);
    for decision in &decisions {
        catalog.insert_filter_decision(decision)?;
    }
    Ok(pgcopy_runbook::FilterSet::from_decisions(decisions))
}

/// Fetch and cache the source catalog if this is the first time this
/// work directory has seen it, mirroring the orchestrator's own
/// `catalog-fetch` section (spec §4.4 step 2) so CLI commands that need
/// the catalog ahead of `run_clone` (to compile `--filters`, to answer
/// `list`) don't re-query the source a second time once `run_clone`
/// itself runs.
pub async fn ensure_catalog_fetched<S: pgcopy_adapters::SourceConnection>(
    catalog: &CatalogStore<SystemClock>,
    source: &S,
) -> Result<(), ExitError> {
    if let Some(stamp) = catalog.section("catalog-fetch")? {
        if stamp.is_done() {
            return Ok(());
        }
    } else {
        catalog.begin_section("catalog-fetch")?;
    }

    let tables = source.fetch_tables().await?;
    for table in &tables {
        catalog.insert_table(table)?;
    }
    let indexes = source.fetch_indexes().await?;
    for index in &indexes {
        catalog.insert_index(index)?;
    }
    let sequences = source.fetch_sequences().await?;
    for sequence in &sequences {
        catalog.insert_sequence(sequence)?;
    }
    let extensions = source.fetch_extensions().await?;
    for extension in &extensions {
        catalog.insert_extension(extension)?;
    }
    catalog.finish_section(
        "catalog-fetch",
        (tables.len() + indexes.len() + sequences.len() + extensions.len()) as u64,
        0,
        0,
    )?;
    Ok(())
}

pub fn pg_dump_path() -> PathBuf {
    std::env::var(crate::env::PG_DUMP).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("pg_dump"))
}

pub fn pg_restore_path() -> PathBuf {
    std::env::var(crate::env::PG_RESTORE).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("pg_restore"))
}

pub fn vacuumdb_path() -> PathBuf {
    std::env::var(crate::env::VACUUMDB).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("vacuumdb"))
}
