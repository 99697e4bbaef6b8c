// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `restore` (spec §4.4 steps 3 and 8): restore previously dumped
//! pre-data and post-data archives against the target, honoring
//! `--filters`.

use std::collections::HashSet;

use pgcopy_adapters::{ExternalRestorer, Restorer, SchemaSection};
use pgcopy_core::Role;
use pgcopy_runbook::{rewrite_post_data_restore_list, rewrite_restore_list};

use crate::cli::CommonArgs;
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Clone)?;
    let filters = context::load_filters(common, &session.catalog)?;
    let restorer = ExternalRestorer::new(context::pg_restore_path());
    let schema_dir = session.ctx.workdir.schema_dir();

    // A standalone `restore` run has no table-copy phase behind it, so
    // nothing is already done; `run_clone` tracks this itself in-line.
    let done: HashSet<u32> = HashSet::new();

    let pre_data_archive = schema_dir.join(SchemaSection::PreData.archive_filename());
    let pre_data_listing = restorer.list_archive(&pre_data_archive).await?;
    let pre_data_rewritten = rewrite_restore_list(&pre_data_listing, &filters, &done)?;
    let pre_data_list_file = schema_dir.join("pre-data.list");
    std::fs::write(&pre_data_list_file, &pre_data_rewritten)?;
    restorer
        .restore_section(&session.target_uri, &pre_data_archive, &pre_data_list_file, SchemaSection::PreData)
        .await?;

    let post_data_archive = schema_dir.join(SchemaSection::PostData.archive_filename());
    let post_data_listing = restorer.list_archive(&post_data_archive).await?;
    let post_data_rewritten = rewrite_post_data_restore_list(&post_data_listing, &filters, &done)?;
    let post_data_list_file = schema_dir.join("post-data.list");
    std::fs::write(&post_data_list_file, &post_data_rewritten)?;
    restorer
        .restore_section(&session.target_uri, &post_data_archive, &post_data_list_file, SchemaSection::PostData)
        .await?;

    println!("{}", serde_json::json!({ "status": "ok" }));
    session.catalog.close()?;
    Ok(())
}
