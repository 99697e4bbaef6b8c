// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for the catalog objects fetched once from the source
//! server and then read repeatedly by every later phase (spec §4.2,
//! §4.4): tables, indexes, sequences, extensions.
//!
//! Reads are callback-driven rather than returning a materialized
//! `Vec`, per the "don't hold the whole catalog in memory at once"
//! requirement — a caller folds over rows as `rusqlite` streams them off
//! the prepared statement, instead of this module collecting them
//! first.

use rusqlite::params;

use crate::catalog_store::CatalogStore;
use crate::error::CatalogError;
use pgcopy_core::{Clock, ExtConfigRelation, PartitionKey, SourceExtension, SourceIndex, SourceSequence, SourceTable};

fn partition_key_from_row(kind: &str, column: Option<String>) -> PartitionKey {
    match kind {
        "primary_key" => PartitionKey::PrimaryKey(column.unwrap_or_default()),
        "ctid" => PartitionKey::Ctid,
        _ => PartitionKey::None,
    }
}

impl<C: Clock> CatalogStore<C> {
    pub fn insert_table(&self, table: &SourceTable) -> Result<(), CatalogError> {
        let (kind, column) = match &table.partition_key {
            PartitionKey::PrimaryKey(col) => ("primary_key", Some(col.clone())),
            PartitionKey::Ctid => ("ctid", None),
            PartitionKey::None => ("none", None),
        };
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO source_tables \
                 (oid, namespace, relname, est_row_count, relation_size, \
                  partition_key_kind, partition_key_column, restore_list_name) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    table.oid,
                    table.namespace,
                    table.relname,
                    table.est_row_count,
                    table.relation_size,
                    kind,
                    column,
                    table.restore_list_name,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_table(&self, oid: u32) -> Result<Option<SourceTable>, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT oid, namespace, relname, est_row_count, relation_size, \
                 partition_key_kind, partition_key_column, restore_list_name \
                 FROM source_tables WHERE oid = ?1",
                params![oid],
                row_to_table,
            )
            .optional_catalog()
        })
    }

    /// Visit every known table in ascending oid order without
    /// materializing the full set.
    pub fn iter_tables(
        &self,
        mut visit: impl FnMut(SourceTable) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT oid, namespace, relname, est_row_count, relation_size, \
                 partition_key_kind, partition_key_column, restore_list_name \
                 FROM source_tables ORDER BY oid",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                visit(row_to_table(row)?)?;
            }
            Ok(())
        })
    }

    pub fn insert_index(&self, index: &SourceIndex) -> Result<(), CatalogError> {
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO source_indexes \
                 (oid, table_oid, index_name, is_constraint, is_primary, definition, \
                  restore_list_name) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    index.oid,
                    index.table_oid,
                    index.index_name,
                    index.is_constraint,
                    index.is_primary,
                    index.definition,
                    index.restore_list_name,
                ],
            )?;
            Ok(())
        })
    }

    pub fn iter_indexes_for_table(
        &self,
        table_oid: u32,
        mut visit: impl FnMut(SourceIndex) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT oid, table_oid, index_name, is_constraint, is_primary, definition, \
                 restore_list_name FROM source_indexes WHERE table_oid = ?1 ORDER BY oid",
            )?;
            let mut rows = stmt.query(params![table_oid])?;
            while let Some(row) = rows.next()? {
                visit(row_to_index(row)?)?;
            }
            Ok(())
        })
    }

    pub fn insert_sequence(&self, sequence: &SourceSequence) -> Result<(), CatalogError> {
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO source_sequences (oid, last_value, is_called) \
                 VALUES (?1, ?2, ?3)",
                params![sequence.oid, sequence.last_value, sequence.is_called],
            )?;
            Ok(())
        })
    }

    pub fn iter_sequences(
        &self,
        mut visit: impl FnMut(SourceSequence) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT oid, last_value, is_called FROM source_sequences ORDER BY oid")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                visit(SourceSequence {
                    oid: row.get(0)?,
                    last_value: row.get(1)?,
                    is_called: row.get(2)?,
                })?;
            }
            Ok(())
        })
    }

    pub fn insert_extension(&self, extension: &SourceExtension) -> Result<(), CatalogError> {
        self.with_conn_locked(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO source_extensions \
                 (oid, extname, extversion, restore_list_name) VALUES (?1, ?2, ?3, ?4)",
                params![
                    extension.oid,
                    extension.extname,
                    extension.extversion,
                    extension.restore_list_name,
                ],
            )?;
            conn.execute(
                "DELETE FROM source_extension_config_relations WHERE extension_oid = ?1",
                params![extension.oid],
            )?;
            for (ord, relation) in extension.config_relations.iter().enumerate() {
                conn.execute(
                    "INSERT INTO source_extension_config_relations \
                     (extension_oid, ord, namespace, relname, relkind, condition) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        extension.oid,
                        ord as i64,
                        relation.namespace,
                        relation.relname,
                        relation.relkind.to_string(),
                        relation.condition,
                    ],
                )?;
            }
            Ok(())
        })
    }

    pub fn iter_extensions(
        &self,
        mut visit: impl FnMut(SourceExtension) -> Result<(), CatalogError>,
    ) -> Result<(), CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT oid, extname, extversion, restore_list_name FROM source_extensions \
                 ORDER BY oid",
            )?;
            let mut cfg_stmt = conn.prepare(
                "SELECT namespace, relname, relkind, condition \
                 FROM source_extension_config_relations WHERE extension_oid = ?1 ORDER BY ord",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let oid: u32 = row.get(0)?;
                let extname: String = row.get(1)?;
                let extversion: String = row.get(2)?;
                let restore_list_name: String = row.get(3)?;

                let mut config_relations = Vec::new();
                let mut cfg_rows = cfg_stmt.query(params![oid])?;
                while let Some(cfg_row) = cfg_rows.next()? {
                    let relkind_text: String = cfg_row.get(2)?;
                    let relkind = relkind_text.chars().next().unwrap_or('r');
                    config_relations.push(ExtConfigRelation {
                        namespace: cfg_row.get(0)?,
                        relname: cfg_row.get(1)?,
                        relkind,
                        condition: cfg_row.get(3)?,
                    });
                }
                drop(cfg_rows);

                visit(SourceExtension {
                    oid,
                    extname,
                    extversion,
                    restore_list_name,
                    config_relations,
                })?;
            }
            Ok(())
        })
    }
}

fn row_to_table(row: &rusqlite::Row<'_>) -> rusqlite::Result<SourceTable> {
    let kind: String = row.get(5)?;
    let column: Option<String> = row.get(6)?;
    Ok(SourceTable {
        oid: row.get(0)?,
        namespace: row.get(1)?,
        relname: row.get(2)?,
        est_row_count: row.get(3)?,
        relation_size: row.get(4)?,
        partition_key: partition_key_from_row(&kind, column),
        restore_list_name: row.get(7)?,
    })
}

fn row_to_index(row: &rusqlite::Row<'_>) -> rusqlite::Result<SourceIndex> {
    Ok(SourceIndex {
        oid: row.get(0)?,
        table_oid: row.get(1)?,
        index_name: row.get(2)?,
        is_constraint: row.get(3)?,
        is_primary: row.get(4)?,
        definition: row.get(5)?,
        restore_list_name: row.get(6)?,
    })
}

trait OptionalCatalog<T> {
    fn optional_catalog(self) -> Result<Option<T>, CatalogError>;
}

impl<T> OptionalCatalog<T> for rusqlite::Result<T> {
    fn optional_catalog(self) -> Result<Option<T>, CatalogError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(CatalogError::from(other)),
        }
    }
}

#[cfg(test)]
#[path = "catalog_entities_tests.rs"]
mod tests;
