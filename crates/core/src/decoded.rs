// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The decoded-record vocabulary shared by the Receiver, Transformer and
//! Applier (spec §4.6): one value per logical-decoding message,
//! independent of which wire dialect (JSON or text) produced it.

use serde::{Deserialize, Serialize};

use crate::lsn::Lsn;

/// What kind of change a decoded message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Begin,
    Commit,
    Insert,
    Update,
    Delete,
    Truncate,
    Keepalive,
    Switch,
}

crate::simple_display! {
    ChangeAction {
        Begin => "begin",
        Commit => "commit",
        Insert => "insert",
        Update => "update",
        Delete => "delete",
        Truncate => "truncate",
        Keepalive => "keepalive",
        Switch => "switch",
    }
}

/// One column's value in a tuple, carrying enough of the source's type
/// information that the Transformer can render it without a second
/// round trip to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub oid: u32,
    pub val: Option<String>,
    pub is_null: bool,
    pub is_quoted: bool,
}

/// A tuple of column names and values, as carried by an INSERT/UPDATE's
/// new row or an UPDATE/DELETE's old row (only present when the source
/// table is `REPLICA IDENTITY FULL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    pub cols: Vec<String>,
    pub values: Vec<ColumnValue>,
}

/// One decoded logical-replication message, the unit the Receiver
/// writes one per line to a segment's `.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedMessage {
    pub action: ChangeAction,
    pub xid: Option<u32>,
    pub lsn: Lsn,
    pub timestamp: Option<i64>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub new: Option<Tuple>,
    pub old: Option<Tuple>,
}

impl DecodedMessage {
    pub fn keepalive(lsn: Lsn) -> Self {
        Self {
            action: ChangeAction::Keepalive,
            xid: None,
            lsn,
            timestamp: None,
            schema: None,
            table: None,
            new: None,
            old: None,
        }
    }

    pub fn switch(lsn: Lsn) -> Self {
        Self {
            action: ChangeAction::Switch,
            ..Self::keepalive(lsn)
        }
    }

    /// The qualified table name, if this message carries one.
    pub fn qualified_table(&self) -> Option<String> {
        match (&self.schema, &self.table) {
            (Some(schema), Some(table)) => Some(format!("{schema}.{table}")),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "decoded_tests.rs"]
mod tests;
