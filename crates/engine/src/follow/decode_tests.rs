// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_core::DecodedMessage;

#[test]
fn json_dialect_deserializes_the_shared_vocabulary_directly() {
    let payload = br#"{"action":"insert","xid":42,"lsn":"0/16B3748","timestamp":1700000000,
        "schema":"public","table":"accounts",
        "new":{"cols":["id"],"values":[{"oid":23,"val":"1","isNull":false,"isQuoted":false}]},
        "old":null}"#;
    let decoded = decode_message(WireDialect::Json, payload, Lsn::ZERO).unwrap();
    assert_eq!(decoded.action, ChangeAction::Insert);
    assert_eq!(decoded.xid, Some(42));
    assert_eq!(decoded.qualified_table(), Some("public.accounts".to_string()));
    assert_eq!(decoded.new.as_ref().unwrap().cols, vec!["id".to_string()]);
}

#[test]
fn json_dialect_rejects_garbage() {
    let result = decode_message(WireDialect::Json, b"not json", Lsn::ZERO);
    assert!(matches!(result, Err(DecodeError::Json(_))));
}

#[test]
fn text_dialect_decodes_begin_and_commit() {
    let begin = decode_message(WireDialect::Text, b"BEGIN 501", Lsn::new(0, 0x10)).unwrap();
    assert_eq!(begin.action, ChangeAction::Begin);
    assert_eq!(begin.xid, Some(501));
    assert_eq!(begin.lsn, Lsn::new(0, 0x10));

    let commit = decode_message(WireDialect::Text, b"COMMIT 501", Lsn::new(0, 0x20)).unwrap();
    assert_eq!(commit.action, ChangeAction::Commit);
    assert_eq!(commit.xid, Some(501));
}

#[test]
fn text_dialect_decodes_an_insert_with_a_quoted_string_column() {
    let line = b"table public.accounts: INSERT: id[integer]:1 name[character varying]:'Alice'";
    let decoded = decode_message(WireDialect::Text, line, Lsn::new(0, 1)).unwrap();
    assert_eq!(decoded.action, ChangeAction::Insert);
    assert_eq!(decoded.qualified_table(), Some("public.accounts".to_string()));
    let tuple = decoded.new.unwrap();
    assert_eq!(tuple.cols, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(tuple.values[0].val, Some("1".to_string()));
    assert!(!tuple.values[0].is_quoted);
    assert_eq!(tuple.values[1].val, Some("Alice".to_string()));
    assert!(tuple.values[1].is_quoted);
}

#[test]
fn text_dialect_unescapes_doubled_single_quotes() {
    let line = b"table public.accounts: UPDATE: name[text]:'O''Brien'";
    let decoded = decode_message(WireDialect::Text, line, Lsn::ZERO).unwrap();
    let tuple = decoded.new.unwrap();
    assert_eq!(tuple.values[0].val, Some("O'Brien".to_string()));
}

#[test]
fn text_dialect_handles_no_tuple_data_truncate() {
    let line = b"table public.accounts: TRUNCATE: (no-tuple-data)";
    let decoded = decode_message(WireDialect::Text, line, Lsn::ZERO).unwrap();
    assert_eq!(decoded.action, ChangeAction::Truncate);
    assert!(decoded.new.is_none());
}

#[test]
fn text_dialect_decodes_a_null_column() {
    let line = b"table public.accounts: UPDATE: id[integer]:1 balance[numeric]:null";
    let decoded = decode_message(WireDialect::Text, line, Lsn::ZERO).unwrap();
    let tuple = decoded.new.unwrap();
    assert!(tuple.values[1].is_null);
    assert_eq!(tuple.values[1].val, None);
}

#[test]
fn text_dialect_rejects_an_unrecognized_line() {
    let result = decode_message(WireDialect::Text, b"garbage line", Lsn::ZERO);
    assert!(matches!(result, Err(DecodeError::UnrecognizedLine(_))));
}

#[test]
fn decoded_message_survives_a_json_round_trip_after_text_decoding() {
    let line = b"table public.accounts: INSERT: id[integer]:7";
    let decoded = decode_message(WireDialect::Text, line, Lsn::new(0, 5)).unwrap();
    let json = serde_json::to_string(&decoded).unwrap();
    let reparsed: DecodedMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed, decoded);
}
