// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a sequence of decoded messages into a segment of SQL text
//! (spec §4.6): one marker line per message, `-- {action, xid, lsn,
//! timestamp}`, followed by its SQL statement for anything that has
//! one. Keepalive and SWITCH markers have no statement and stand alone
//! so the Applier can still advance `replay_lsn` on them.

use serde::Serialize;

use pgcopy_core::{ChangeAction, ColumnValue, DecodedMessage, Tuple};

#[derive(Serialize)]
struct Marker<'a> {
    action: ChangeAction,
    xid: Option<u32>,
    lsn: String,
    timestamp: Option<i64>,
    schema: Option<&'a str>,
    table: Option<&'a str>,
}

/// Render one segment's worth of messages as line-oriented SQL text
/// (spec §6's segment file format).
pub fn transform_segment(messages: &[DecodedMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let marker = Marker {
            action: message.action,
            xid: message.xid,
            lsn: message.lsn.to_string(),
            timestamp: message.timestamp,
            schema: message.schema.as_deref(),
            table: message.table.as_deref(),
        };
        out.push_str("-- ");
        out.push_str(&serde_json::to_string(&marker).expect("Marker serializes infallibly"));
        out.push('\n');

        if let Some(statement) = statement_for(message) {
            out.push_str(&statement);
            out.push('\n');
        }
    }
    out
}

fn statement_for(message: &DecodedMessage) -> Option<String> {
    match message.action {
        ChangeAction::Begin => Some("BEGIN;".to_string()),
        ChangeAction::Commit => Some("COMMIT;".to_string()),
        ChangeAction::Keepalive | ChangeAction::Switch => None,
        ChangeAction::Insert => {
            let table = message.qualified_table()?;
            let tuple = message.new.as_ref()?;
            Some(insert_statement(&table, tuple))
        }
        ChangeAction::Update => {
            let table = message.qualified_table()?;
            let new = message.new.as_ref()?;
            // `old` is only present under REPLICA IDENTITY FULL; fall back
            // to matching on the new tuple's own values when it's absent
            // (best-effort without catalog access to the table's key).
            let identity = message.old.as_ref().unwrap_or(new);
            Some(update_statement(&table, new, identity))
        }
        ChangeAction::Delete => {
            let table = message.qualified_table()?;
            let identity = message.old.as_ref().or(message.new.as_ref())?;
            Some(delete_statement(&table, identity))
        }
        ChangeAction::Truncate => {
            let table = message.qualified_table()?;
            Some(format!("TRUNCATE TABLE {};", quote_qualified(&table)))
        }
    }
}

fn insert_statement(table: &str, tuple: &Tuple) -> String {
    let columns = tuple.cols.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    let values = tuple.values.iter().map(quote_value).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({columns}) VALUES ({values});", quote_qualified(table))
}

fn update_statement(table: &str, new: &Tuple, identity: &Tuple) -> String {
    let assignments = new
        .cols
        .iter()
        .zip(&new.values)
        .map(|(col, val)| format!("{} = {}", quote_ident(col), quote_value(val)))
        .collect::<Vec<_>>()
        .join(", ");
    let predicate = where_clause(identity);
    format!("UPDATE {} SET {assignments} WHERE {predicate};", quote_qualified(table))
}

fn delete_statement(table: &str, identity: &Tuple) -> String {
    let predicate = where_clause(identity);
    format!("DELETE FROM {} WHERE {predicate};", quote_qualified(table))
}

fn where_clause(tuple: &Tuple) -> String {
    if tuple.cols.is_empty() {
        return "true".to_string();
    }
    tuple
        .cols
        .iter()
        .zip(&tuple.values)
        .map(|(col, val)| {
            if val.is_null {
                format!("{} IS NULL", quote_ident(col))
            } else {
                format!("{} = {}", quote_ident(col), quote_value(val))
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn quote_value(value: &ColumnValue) -> String {
    match &value.val {
        None => "NULL".to_string(),
        Some(_) if value.is_null => "NULL".to_string(),
        Some(raw) if value.is_quoted => format!("'{}'", raw.replace('\'', "''")),
        Some(raw) => raw.clone(),
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_qualified(qualified: &str) -> String {
    match qualified.split_once('.') {
        Some((schema, table)) => format!("{}.{}", quote_ident(schema), quote_ident(table)),
        None => quote_ident(qualified),
    }
}

#[cfg(test)]
#[path = "transformer_tests.rs"]
mod tests;
