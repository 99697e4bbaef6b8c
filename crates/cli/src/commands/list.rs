// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list` (spec §4.3): print the catalog objects cached in the work
//! directory, fetching them from the source first if this is a fresh
//! work directory.

use pgcopy_adapters::{PgSourceConnection, SourceConnection};
use pgcopy_core::Role;

use crate::cli::CommonArgs;
use crate::context;
use crate::exit_error::ExitError;

pub async fn run(common: &CommonArgs) -> Result<(), ExitError> {
    let session = context::open_session(common, Role::Clone)?;
    let source = PgSourceConnection::connect(&session.source_uri).await?;
    context::ensure_catalog_fetched(&session.catalog, &source).await?;

    let mut tables = Vec::new();
    session.catalog.iter_tables(|table| {
        tables.push(table);
        Ok(())
    })?;
    let mut indexes = Vec::new();
    for table in &tables {
        session.catalog.iter_indexes_for_table(table.oid, |index| {
            indexes.push(index);
            Ok(())
        })?;
    }
    let mut sequences = Vec::new();
    session.catalog.iter_sequences(|sequence| {
        sequences.push(sequence);
        Ok(())
    })?;
    let mut extensions = Vec::new();
    session.catalog.iter_extensions(|extension| {
        extensions.push(extension);
        Ok(())
    })?;

    println!(
        "{}",
        serde_json::json!({
            "tables": tables,
            "indexes": indexes,
            "sequences": sequences,
            "extensions": extensions,
        })
    );
    session.catalog.close()?;
    Ok(())
}
