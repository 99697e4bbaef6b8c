// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure decoding of one logical-decoding message into the shared
//! `DecodedMessage` vocabulary (spec §4.6). Kept free of any connection
//! or file I/O so every dialect/shape can be exercised without a live
//! replication stream.
//!
//! Two wire dialects are supported, matching the two output plugins the
//! source database might run:
//!
//! - `Json`: the message is already the `DecodedMessage` JSON shape
//!   (`{"action":"insert","xid":1,"lsn":"0/1","cols":[...],...}`).
//! - `Text`: a `test_decoding`-style line, e.g. `BEGIN 1234`,
//!   `COMMIT 1234`, or `table public.accounts: INSERT: id[integer]:1
//!   name[text]:'Alice'`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use pgcopy_core::{ChangeAction, ColumnValue, DecodedMessage, Lsn, Tuple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireDialect {
    Json,
    Text,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON replication message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized text-dialect line: {0:?}")]
    UnrecognizedLine(String),

    #[error("malformed column list in line: {0:?}")]
    MalformedColumns(String),
}

/// Decode one raw payload (the contents of one `XLogData` message) into
/// a `DecodedMessage`, tagging it with the LSN the Receiver observed the
/// payload at.
pub fn decode_message(dialect: WireDialect, payload: &[u8], wal_end: Lsn) -> Result<DecodedMessage, DecodeError> {
    match dialect {
        WireDialect::Json => decode_json(payload),
        WireDialect::Text => decode_text(payload, wal_end),
    }
}

fn decode_json(payload: &[u8]) -> Result<DecodedMessage, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

fn begin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^BEGIN\s+(\d+)$").expect("static regex"))
}

fn commit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^COMMIT\s+(\d+)$").expect("static regex"))
}

fn table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^table (?P<schema>[^.]+)\.(?P<table>\S+): (?P<action>INSERT|UPDATE|DELETE|TRUNCATE): (?P<rest>.*)$"#)
            .expect("static regex")
    })
}

fn column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<name>[^\[\s]+)\[(?P<type>[^\]]*)\]:(?P<value>'(?:[^']|'')*'|\S+)").expect("static regex"))
}

fn decode_text(payload: &[u8], wal_end: Lsn) -> Result<DecodedMessage, DecodeError> {
    let line = std::str::from_utf8(payload)
        .map_err(|_| DecodeError::UnrecognizedLine(String::from_utf8_lossy(payload).into_owned()))?
        .trim();

    if let Some(captures) = begin_re().captures(line) {
        return Ok(DecodedMessage {
            action: ChangeAction::Begin,
            xid: captures[1].parse().ok(),
            lsn: wal_end,
            timestamp: None,
            schema: None,
            table: None,
            new: None,
            old: None,
        });
    }

    if let Some(captures) = commit_re().captures(line) {
        return Ok(DecodedMessage {
            action: ChangeAction::Commit,
            xid: captures[1].parse().ok(),
            lsn: wal_end,
            timestamp: None,
            schema: None,
            table: None,
            new: None,
            old: None,
        });
    }

    if let Some(captures) = table_re().captures(line) {
        let action = match &captures["action"] {
            "INSERT" => ChangeAction::Insert,
            "UPDATE" => ChangeAction::Update,
            "DELETE" => ChangeAction::Delete,
            "TRUNCATE" => ChangeAction::Truncate,
            _ => unreachable!("regex only matches these four actions"),
        };
        let tuple = parse_columns(&captures["rest"], line)?;
        return Ok(DecodedMessage {
            action,
            xid: None,
            lsn: wal_end,
            timestamp: None,
            schema: Some(captures["schema"].to_string()),
            table: Some(captures["table"].to_string()),
            new: if tuple.cols.is_empty() { None } else { Some(tuple) },
            old: None,
        });
    }

    Err(DecodeError::UnrecognizedLine(line.to_string()))
}

fn parse_columns(rest: &str, whole_line: &str) -> Result<Tuple, DecodeError> {
    let rest = rest.trim();
    if rest.is_empty() || rest == "(no-tuple-data)" {
        return Ok(Tuple { cols: Vec::new(), values: Vec::new() });
    }

    let mut cols = Vec::new();
    let mut values = Vec::new();
    let mut last_end = 0;
    for captures in column_re().captures_iter(rest) {
        let whole = captures.get(0).expect("capture group 0 always matches");
        last_end = whole.end();
        cols.push(captures["name"].to_string());
        let raw_value = &captures["value"];
        if raw_value == "null" {
            values.push(ColumnValue { oid: 0, val: None, is_null: true, is_quoted: false });
        } else if let Some(unquoted) = raw_value.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            values.push(ColumnValue {
                oid: 0,
                val: Some(unquoted.replace("''", "'")),
                is_null: false,
                is_quoted: true,
            });
        } else {
            values.push(ColumnValue {
                oid: 0,
                val: Some(raw_value.to_string()),
                is_null: false,
                is_quoted: false,
            });
        }
    }

    if cols.is_empty() || last_end < rest.len() {
        return Err(DecodeError::MalformedColumns(whole_line.to_string()));
    }
    Ok(Tuple { cols, values })
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
