// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `snapshot` (spec §4.3): export or adopt the shared clone snapshot and
//! print its token, without running any copy work.

use pgcopy_adapters::PgSourceConnection;
use pgcopy_core::Role;
use pgcopy_engine::SnapshotManager;

use crate::cli::CommonArgs;
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Clone)?;
    let source = PgSourceConnection::connect(&session.source_uri).await?;
    let manager = SnapshotManager::new(&source, session.ctx.workdir.snapshot_file());
    let snapshot = manager
        .prepare(&session.source_uri, common.snapshot.as_deref(), !common.not_consistent)
        .await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    session.catalog.close()?;
    Ok(())
}
