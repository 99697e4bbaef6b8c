// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

const SAMPLE: &str = "\
;
; Archive created at 2026-07-28 10:00:00 UTC
;
3; 2615 16384 SCHEMA public postgres
4; 1259 16400 TABLE public accounts postgres
5; 1259 16401 INDEX public accounts_pkey postgres
";

#[test]
fn parses_entries_and_keeps_comments_verbatim() {
    let list = RestoreList::parse(SAMPLE).unwrap();
    let entries: Vec<_> = list.entries().collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].object_oid, 16400);
    assert_eq!(entries[1].desc, "TABLE");
    assert_eq!(entries[1].restore_list_name(), "public.accounts");
}

#[test]
fn rewrite_preserves_order_and_dump_ids() {
    let list = RestoreList::parse(SAMPLE).unwrap();
    let rewritten = list.rewrite(|_| false);
    assert_eq!(rewritten, SAMPLE);
}

#[test]
fn rewrite_comments_out_skipped_entries() {
    let list = RestoreList::parse(SAMPLE).unwrap();
    let rewritten = list.rewrite(|e| e.object_oid == 16401);
    assert!(rewritten.contains("; 5; 1259 16401 INDEX public accounts_pkey postgres"));
    assert!(rewritten.contains("4; 1259 16400 TABLE public accounts postgres"));
}

#[test]
fn rewrite_does_not_touch_entries_that_are_not_skipped() {
    let list = RestoreList::parse(SAMPLE).unwrap();
    let rewritten = list.rewrite(|e| e.object_oid == 16401);
    let lines: Vec<_> = rewritten.lines().collect();
    assert!(lines.iter().any(|l| *l == "4; 1259 16400 TABLE public accounts postgres"));
}

#[test]
fn malformed_line_falls_back_to_verbatim_rather_than_erroring() {
    let text = "not a restore list line at all\n";
    let list = RestoreList::parse(text).unwrap();
    assert_eq!(list.entries().count(), 0);
    assert_eq!(list.lines.len(), 1);
}

#[test]
fn already_commented_entry_stays_verbatim_on_reparse() {
    let text = "; 4; 1259 16400 TABLE public accounts postgres\n";
    let list = RestoreList::parse(text).unwrap();
    assert_eq!(list.entries().count(), 0);
    let rewritten = list.rewrite(|_| false);
    assert_eq!(rewritten, text);
}

proptest! {
    #[test]
    fn rewrite_with_no_skips_is_the_identity(
        dump_id in 1u32..10_000,
        catalog_oid in 1u32..20_000,
        object_oid in 1u32..20_000,
        owner in "[a-z]{3,10}",
        schema in "[a-z]{3,10}",
        name in "[a-z_]{3,16}",
    ) {
        let line = format!("{dump_id}; {catalog_oid} {object_oid} TABLE {schema} {name} {owner}\n");
        let list = RestoreList::parse(&line).unwrap();
        prop_assert_eq!(list.rewrite(|_| false), line);
    }

    #[test]
    fn rewrite_always_skipping_comments_out_every_entry(
        dump_id in 1u32..10_000,
        catalog_oid in 1u32..20_000,
        object_oid in 1u32..20_000,
        owner in "[a-z]{3,10}",
        schema in "[a-z]{3,10}",
        name in "[a-z_]{3,16}",
    ) {
        let line = format!("{dump_id}; {catalog_oid} {object_oid} TABLE {schema} {name} {owner}\n");
        let list = RestoreList::parse(&line).unwrap();
        let rewritten = list.rewrite(|_| true);
        prop_assert!(rewritten.starts_with("; "));
    }
}
