// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clone` / `copy db` (spec §4.4): the full eight-phase pipeline.

use pgcopy_adapters::{ExternalDumper, ExternalRestorer, ExternalVacuumer, PgSourceConnection, PgTargetConnection};
use pgcopy_core::Role;
use pgcopy_engine::clone::run_clone;
use pgcopy_engine::SnapshotManager;

use crate::cli::CommonArgs;
use crate::context::{self, Session};
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let Session {
        ctx,
        catalog,
        pidfile: _pidfile,
        source_uri,
        target_uri,
    } = context::open_session(common, Role::Clone)?;

    let source = PgSourceConnection::connect(&source_uri).await?;
    let target = PgTargetConnection::connect(&target_uri).await?;
    let dumper = ExternalDumper::new(context::pg_dump_path());
    let restorer = ExternalRestorer::new(context::pg_restore_path());
    let vacuumer = ExternalVacuumer::new(context::vacuumdb_path());

    let snapshots = SnapshotManager::new(&source, ctx.workdir.snapshot_file());
    snapshots
        .prepare(&source_uri, common.snapshot.as_deref(), !common.not_consistent)
        .await?;

    context::ensure_catalog_fetched(&catalog, &source).await?;
    let filters = context::load_filters(common, &catalog)?;

    let report = run_clone(
        &ctx,
        &catalog,
        &source,
        &target,
        &dumper,
        &restorer,
        &vacuumer,
        &source_uri,
        &target_uri,
        &filters,
        common.resume,
    )
    .await?;

    tracing::info!(
        tables_ok = report.tables.succeeded,
        tables_failed = report.tables.failed,
        indexes_ok = report.indexes.succeeded,
        indexes_failed = report.indexes.failed,
        sequences_reset = report.sequences_reset,
        extensions_created = report.extensions_created,
        config_relations_copied = report.config_relations_copied,
        blob_bytes = report.blob_bytes,
        "clone finished"
    );
    println!(
        "{}",
        serde_json::json!({
            "tables": { "succeeded": report.tables.succeeded, "failed": report.tables.failed },
            "indexes": { "succeeded": report.indexes.succeeded, "failed": report.indexes.failed },
            "sequences_reset": report.sequences_reset,
            "extensions_created": report.extensions_created,
            "config_relations_copied": report.config_relations_copied,
            "blob_bytes": report.blob_bytes,
        })
    );

    catalog.close()?;
    Ok(())
}
