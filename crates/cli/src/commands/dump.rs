// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dump` (spec §4.4 step 1): pre-data and post-data archives only, no
//! row copy and no restore against the target.

use pgcopy_adapters::{Dumper, ExternalDumper, SchemaSection};
use pgcopy_core::Role;

use crate::cli::CommonArgs;
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Clone)?;
    let dumper = ExternalDumper::new(context::pg_dump_path());
    let schema_dir = session.ctx.workdir.schema_dir();

    let pre_data = dumper.dump_schema(&session.source_uri, &schema_dir, SchemaSection::PreData).await?;
    let post_data = dumper.dump_schema(&session.source_uri, &schema_dir, SchemaSection::PostData).await?;

    println!(
        "{}",
        serde_json::json!({
            "pre_data": pre_data.display().to_string(),
            "post_data": post_data.display().to_string(),
        })
    );
    session.catalog.close()?;
    Ok(())
}
