// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the `--filters` INI file (spec §6) into the compiled
//! `FilterDecision` set `pgcopy-runbook::FilterSet` consumes. Parsing is
//! split in two: [`parse`] reads the file into schema/table name lists
//! with no catalog access, and [`compile`] resolves those names against
//! the already-fetched catalog into oid-keyed decisions, the same two
//! steps the restore-list rewriter and table iterator expect (filters by
//! name only work until the catalog gives them an oid).

use std::collections::HashSet;

use pgcopy_core::{FilterDecision, FilterKey, FilterKind, SourceIndex, SourceTable};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilterConfig {
    pub include_only_table: Vec<String>,
    pub exclude_schema: Vec<String>,
    pub exclude_table: Vec<String>,
    pub exclude_table_data: Vec<String>,
    pub exclude_index: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterIniError {
    #[error("line {line}: entry outside of any `[section]`: {text:?}")]
    EntryOutsideSection { line: usize, text: String },
    #[error("line {line}: unknown section {name:?}")]
    UnknownSection { line: usize, name: String },
}

/// Parse the INI text into its five section lists. Blank lines and `;`/`#`
/// comment lines are ignored; every other line outside of a `[section]`
/// header is an entry under the most recently seen section.
pub fn parse(text: &str) -> Result<ParsedFilterConfig, FilterIniError> {
    let mut config = ParsedFilterConfig::default();
    let mut current: Option<&mut Vec<String>> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            current = Some(match name.trim() {
                "include-only-table" => &mut config.include_only_table,
                "exclude-schema" => &mut config.exclude_schema,
                "exclude-table" => &mut config.exclude_table,
                "exclude-table-data" => &mut config.exclude_table_data,
                "exclude-index" => &mut config.exclude_index,
                other => {
                    return Err(FilterIniError::UnknownSection {
                        line: line_no,
                        name: other.to_string(),
                    })
                }
            });
            continue;
        }
        match current.as_deref_mut() {
            Some(list) => list.push(line.to_string()),
            None => {
                return Err(FilterIniError::EntryOutsideSection {
                    line: line_no,
                    text: line.to_string(),
                })
            }
        }
    }

    Ok(config)
}

/// Resolve a parsed filter config against the catalog into oid-keyed
/// decisions, in priority order: `include-only-table` narrows first,
/// then the three exclude-by-name lists, then per-index exclusions.
/// Later rules win when they disagree about the same object, matching
/// the order the sections are listed in spec §6.
pub fn compile(config: &ParsedFilterConfig, tables: &[SourceTable], indexes: &[SourceIndex]) -> Vec<FilterDecision> {
    let include_only: HashSet<&str> = config.include_only_table.iter().map(String::as_str).collect();
    let exclude_schema: HashSet<&str> = config.exclude_schema.iter().map(String::as_str).collect();
    let exclude_table: HashSet<&str> = config.exclude_table.iter().map(String::as_str).collect();
    let exclude_table_data: HashSet<&str> = config.exclude_table_data.iter().map(String::as_str).collect();
    let exclude_index: HashSet<&str> = config.exclude_index.iter().map(String::as_str).collect();

    let mut decisions = Vec::new();
    let mut excluded_table_oids = HashSet::new();

    for table in tables {
        let qualified = table.qualified_name();
        let kind = if !include_only.is_empty() && !include_only.contains(qualified.as_str()) {
            Some(FilterKind::ExcludeTable)
        } else if exclude_schema.contains(table.namespace.as_str()) || exclude_table.contains(qualified.as_str()) {
            Some(FilterKind::ExcludeTable)
        } else if exclude_table_data.contains(qualified.as_str()) {
            Some(FilterKind::ExcludeTableData)
        } else {
            None
        };

        if let Some(kind) = kind {
            if matches!(kind, FilterKind::ExcludeTable) {
                excluded_table_oids.insert(table.oid);
            }
            decisions.push(FilterDecision {
                key: FilterKey::Oid(table.oid),
                kind,
            });
        }
    }

    for index in indexes {
        let qualified = index.restore_list_name.as_str();
        if excluded_table_oids.contains(&index.table_oid) || exclude_index.contains(qualified) {
            decisions.push(FilterDecision {
                key: FilterKey::Oid(index.oid),
                kind: FilterKind::ExcludeIndex,
            });
        }
    }

    decisions
}

#[cfg(test)]
#[path = "filter_ini_tests.rs"]
mod tests;
