// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `compare` (spec §8 scenario 1, Work Directory Layout's `compare/`):
//! snapshot both catalogs' table lists to `<top>/compare/*.json` and
//! report any table whose source/target row-count estimates disagree.
//!
//! The target side is read with `PgSourceConnection` rather than
//! `TargetConnection`: fetching catalog metadata is a read-only
//! operation identical on either end, and `TargetConnection` only
//! exposes the write-side primitives a clone needs.

use std::collections::HashMap;

use pgcopy_adapters::{PgSourceConnection, SourceConnection};
use pgcopy_core::Role;

use crate::cli::CommonArgs;
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Clone)?;
    let source = PgSourceConnection::connect(&session.source_uri).await?;
    let target = PgSourceConnection::connect(&session.target_uri).await?;

    let source_tables = source.fetch_tables().await?;
    let target_tables = target.fetch_tables().await?;

    let compare_dir = session.ctx.workdir.compare_dir();
    std::fs::write(compare_dir.join("source-schema.json"), serde_json::to_vec_pretty(&source_tables)?)?;
    std::fs::write(compare_dir.join("target-schema.json"), serde_json::to_vec_pretty(&target_tables)?)?;

    let target_by_name: HashMap<&str, &pgcopy_core::SourceTable> =
        target_tables.iter().map(|table| (table.relname.as_str(), table)).collect();

    let mut missing = Vec::new();
    let mut mismatched = Vec::new();
    for table in &source_tables {
        match target_by_name.get(table.relname.as_str()) {
            None => missing.push(table.qualified_name()),
            Some(target_table) if target_table.est_row_count != table.est_row_count => {
                mismatched.push(serde_json::json!({
                    "table": table.qualified_name(),
                    "source_rows": table.est_row_count,
                    "target_rows": target_table.est_row_count,
                }));
            }
            Some(_) => {}
        }
    }

    println!(
        "{}",
        serde_json::json!({
            "tables_compared": source_tables.len(),
            "missing_on_target": missing,
            "row_count_mismatches": mismatched,
        })
    );
    session.catalog.close()?;
    Ok(())
}
