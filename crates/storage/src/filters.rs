// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for filter decisions (spec §3): the compiled output of
//! whatever parsed the filter configuration, stored so every later
//! phase (restore-list rewriting, table iteration) can look a decision
//! up by key without re-parsing or re-compiling anything.

use rusqlite::params;

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::{Clock, FilterDecision, FilterKey, FilterKind};

fn key_kind(key: &FilterKey) -> &'static str {
    match key {
        FilterKey::Oid(_) => "oid",
        FilterKey::RestoreListName(_) => "restore_list_name",
    }
}

fn key_text(key: &FilterKey) -> String {
    match key {
        FilterKey::Oid(oid) => oid.to_string(),
        FilterKey::RestoreListName(name) => name.clone(),
    }
}

fn kind_text(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Include => "include",
        FilterKind::ExcludeSchema => "exclude_schema",
        FilterKind::ExcludeTable => "exclude_table",
        FilterKind::ExcludeTableData => "exclude_table_data",
        FilterKind::ExcludeIndex => "exclude_index",
        FilterKind::SkipExtension => "skip_extension",
        FilterKind::SkipCollation => "skip_collation",
    }
}

fn kind_from_text(text: &str) -> Option<FilterKind> {
    Some(match text {
        "include" => FilterKind::Include,
        "exclude_schema" => FilterKind::ExcludeSchema,
        "exclude_table" => FilterKind::ExcludeTable,
        "exclude_table_data" => FilterKind::ExcludeTableData,
        "exclude_index" => FilterKind::ExcludeIndex,
        "skip_extension" => FilterKind::SkipExtension,
        "skip_collation" => FilterKind::SkipCollation,
        _ => return None,
    })
}

fn decision_key(key: &FilterKey) -> String {
    format!("{}:{}", key_kind(key), key_text(key))
}

impl<C: Clock> CatalogStore<C> {
    pub fn insert_filter_decision(&self, decision: &FilterDecision) -> Result<(), CatalogError> {
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO filter_decisions (decision_key, key_kind, kind) \
                 VALUES (?1, ?2, ?3)",
                params![
                    decision_key(&decision.key),
                    key_kind(&decision.key),
                    kind_text(decision.kind),
                ],
            )?;
            Ok(())
        })
    }

    /// Visit every persisted filter decision without materializing the
    /// full set, the same streaming discipline as the catalog-entity
    /// readers.
    pub fn iter_filter_decisions(
        &self,
        mut visit: impl FnMut(FilterDecision) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT decision_key, key_kind, kind FROM filter_decisions ORDER BY decision_key")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let decision_key: String = row.get(0)?;
                let key_kind: String = row.get(1)?;
                let kind_raw: String = row.get(2)?;

                // decision_key is always written by this module as "<kind>:<text>".
                let (_, text) = decision_key.split_once(':').expect("malformed decision_key");
                let key = match key_kind.as_str() {
                    "oid" => FilterKey::Oid(text.parse().unwrap_or_default()),
                    _ => FilterKey::RestoreListName(text.to_string()),
                };
                let kind = kind_from_text(&kind_raw).unwrap_or(FilterKind::Include);
                visit(FilterDecision { key, kind })?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod tests;
