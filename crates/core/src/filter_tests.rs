// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exclude_table_data_restores_object_without_copying_rows() {
    assert!(FilterKind::ExcludeTableData.restores_object());
    assert!(!FilterKind::ExcludeTableData.copies_data());
}

#[test]
fn exclude_table_drops_both_object_and_data() {
    assert!(!FilterKind::ExcludeTable.restores_object());
    assert!(!FilterKind::ExcludeTable.copies_data());
}

#[test]
fn exclude_schema_drops_both_object_and_data() {
    assert!(!FilterKind::ExcludeSchema.restores_object());
    assert!(!FilterKind::ExcludeSchema.copies_data());
}

#[test]
fn include_restores_object_and_copies_data() {
    assert!(FilterKind::Include.restores_object());
    assert!(FilterKind::Include.copies_data());
}

#[test]
fn decision_keys_roundtrip_through_json() {
    let by_oid = FilterDecision {
        key: FilterKey::Oid(42),
        kind: FilterKind::ExcludeIndex,
    };
    let json = serde_json::to_string(&by_oid).unwrap();
    let back: FilterDecision = serde_json::from_str(&json).unwrap();
    assert_eq!(by_oid, back);

    let by_name = FilterDecision {
        key: FilterKey::RestoreListName("public.accounts".into()),
        kind: FilterKind::SkipCollation,
    };
    let json = serde_json::to_string(&by_name).unwrap();
    let back: FilterDecision = serde_json::from_str(&json).unwrap();
    assert_eq!(by_name, back);
}
