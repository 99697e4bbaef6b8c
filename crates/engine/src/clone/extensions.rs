// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extension provisioning and configuration-table copy (spec §4.7):
//! `CREATE EXTENSION IF NOT EXISTS` for every source extension the
//! filter set doesn't skip, followed by a server-side copy of each
//! extension's `pg_extension_config_dump` relations (e.g. PostGIS's
//! `spatial_ref_sys`) into the matching target relation. A config
//! sequence is restarted with `setval` rather than copied row-by-row.

use pgcopy_adapters::{SourceConnection, TargetConnection};
use pgcopy_core::{ExtConfigRelation, FilterKind, SourceExtension};
use pgcopy_runbook::FilterSet;

use crate::error::EngineError;

/// Tally of what `restore_extensions` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionsOutcome {
    pub extensions_created: u32,
    pub config_relations_copied: u32,
}

/// Create every non-skipped extension on `target`, then copy its
/// configuration relations from `source`.
pub async fn restore_extensions<S: SourceConnection, T: TargetConnection>(
    source: &S,
    target: &T,
    extensions: &[SourceExtension],
    filters: &FilterSet,
) -> Result<ExtensionsOutcome, EngineError> {
    let mut outcome = ExtensionsOutcome::default();
    for extension in extensions {
        let decision = filters.resolve(Some(extension.oid), &extension.restore_list_name);
        if decision == FilterKind::SkipExtension {
            continue;
        }
        target
            .create_extension_if_not_exists(&extension.extname, Some(&extension.extversion))
            .await
            .map_err(EngineError::Target)?;
        outcome.extensions_created += 1;

        for relation in &extension.config_relations {
            copy_config_relation(source, target, relation).await?;
            outcome.config_relations_copied += 1;
        }
    }
    Ok(outcome)
}

async fn copy_config_relation<S: SourceConnection, T: TargetConnection>(
    source: &S,
    target: &T,
    relation: &ExtConfigRelation,
) -> Result<(), EngineError> {
    let qualified = relation.qualified_name();

    if relation.is_sequence() {
        let (last_value, is_called) = source.sequence_value(&qualified).await.map_err(EngineError::Source)?;
        target
            .setval(&qualified, last_value, is_called)
            .await
            .map_err(EngineError::Target)?;
        return Ok(());
    }

    let copy_out_query = match &relation.condition {
        Some(condition) => format!("COPY (SELECT * FROM {qualified} {condition}) TO STDOUT"),
        None => format!("COPY {qualified} TO STDOUT"),
    };
    let (data, _outcome) = source.copy_table_to(&copy_out_query).await.map_err(EngineError::Source)?;
    let copy_in_query = format!("COPY {qualified} FROM STDIN");
    target
        .copy_extension_config(&copy_in_query, &data)
        .await
        .map_err(EngineError::Target)?;
    Ok(())
}

#[cfg(test)]
#[path = "extensions_tests.rs"]
mod tests;
