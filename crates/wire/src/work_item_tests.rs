// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn stop_is_stop_only_for_stop_variant() {
    assert!(WorkItem::Stop.is_stop());
    assert!(!WorkItem::TableOid(1).is_stop());
}

#[test]
fn roundtrips_through_json() {
    for item in [WorkItem::TableOid(1), WorkItem::IndexOid(2), WorkItem::LoOid(3), WorkItem::Stop] {
        let json = serde_json::to_string(&item).unwrap();
        let back: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}

#[test]
fn tag_field_names_the_variant() {
    let json = serde_json::to_string(&WorkItem::TableOid(99)).unwrap();
    assert!(json.contains("\"type\":\"TableOid\""));
    assert!(json.contains("\"value\":99"));
}
