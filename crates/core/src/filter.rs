// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The filter decision, a shared entity per spec §3: what to do with one
//! catalog object during restore-list rewriting and table/index
//! iteration. Compiling parsed filter configuration into a queryable set
//! of decisions is `pgcopy-runbook`'s `FilterSet`; parsing the INI filter
//! file itself is out of scope entirely (spec §1).

use serde::{Deserialize, Serialize};

/// What to do with a catalog object during restore-list rewriting and
/// table/index iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Include,
    ExcludeSchema,
    ExcludeTable,
    ExcludeTableData,
    ExcludeIndex,
    SkipExtension,
    SkipCollation,
}

impl FilterKind {
    /// Whether an object carrying this decision should still have its row
    /// data copied (schema-only objects are still created).
    pub fn copies_data(&self) -> bool {
        !matches!(
            self,
            FilterKind::ExcludeSchema
                | FilterKind::ExcludeTable
                | FilterKind::ExcludeTableData
        )
    }

    /// Whether the object itself should be restored at all.
    pub fn restores_object(&self) -> bool {
        matches!(self, FilterKind::Include | FilterKind::ExcludeTableData)
    }
}

/// A single oid-or-name keyed filter decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub key: FilterKey,
    pub kind: FilterKind,
}

/// Filter decisions are keyed either by catalog oid (once the catalog is
/// known) or by the restore-list's textual name (before the catalog is
/// fetched, or for objects with no oid such as collations).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterKey {
    Oid(u32),
    RestoreListName(String),
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
