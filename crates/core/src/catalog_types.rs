// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog object descriptions fetched from the source server (spec §3,
//! §4.3). These are plain data; fetching them over a connection is the
//! adapters crate's job.

use serde::{Deserialize, Serialize};

/// A table discovered in the source catalog, along with the attributes
/// the Clone Orchestrator needs to plan its copy (size estimate for
/// partitioning, the replica identity key for partitioning strategy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub oid: u32,
    pub namespace: String,
    pub relname: String,
    pub est_row_count: i64,
    pub relation_size: i64,
    pub partition_key: PartitionKey,
    pub restore_list_name: String,
}

impl SourceTable {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.relname)
    }
}

/// The column (or synthetic `ctid`) a table is split by when a worker
/// divides its copy into multiple ranges (spec §4.4.1, Open Question
/// resolved in favor of primary key when one exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionKey {
    PrimaryKey(String),
    Ctid,
    None,
}

/// An index (including constraint-backed indexes) discovered in the
/// source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIndex {
    pub oid: u32,
    pub table_oid: u32,
    pub index_name: String,
    pub is_constraint: bool,
    pub is_primary: bool,
    pub definition: String,
    pub restore_list_name: String,
}

/// A sequence discovered in the source catalog, along with its last
/// known value so it can be restarted at the right point on the target
/// (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSequence {
    pub oid: u32,
    pub last_value: i64,
    pub is_called: bool,
}

/// An extension discovered in the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceExtension {
    pub oid: u32,
    pub extname: String,
    pub extversion: String,
    pub restore_list_name: String,
    /// Configuration relations registered via `pg_extension_config_dump`
    /// (spec §4.7): tables and sequences that travel with the extension's
    /// data rather than its definition.
    pub config_relations: Vec<ExtConfigRelation>,
}

/// One entry of an extension's `extconfig`/`extcondition` arrays, joined
/// to `pg_class` for its namespace, name and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtConfigRelation {
    pub namespace: String,
    pub relname: String,
    pub relkind: char,
    pub condition: Option<String>,
}

impl ExtConfigRelation {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.relname)
    }

    pub fn is_sequence(&self) -> bool {
        self.relkind == 'S'
    }
}

#[cfg(test)]
#[path = "catalog_types_tests.rs"]
mod tests;
