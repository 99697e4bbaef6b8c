// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_core::{FilterDecision, FilterKey, FilterKind};
use std::collections::HashSet;

const SAMPLE: &str = "\
4; 1259 16400 TABLE public accounts postgres
5; 1259 16401 INDEX public accounts_pkey postgres
6; 1259 16402 CONSTRAINT public accounts_check postgres
";

#[test]
fn done_objects_are_commented_out() {
    let mut done = HashSet::new();
    done.insert(16400);
    let filters = FilterSet::new();
    let out = rewrite_restore_list(SAMPLE, &filters, &done).unwrap();
    assert!(out.contains("; 4; 1259 16400 TABLE public accounts postgres"));
    assert!(out.contains("5; 1259 16401 INDEX public accounts_pkey postgres"));
}

#[test]
fn filtered_objects_are_commented_out() {
    let done: HashSet<u32> = HashSet::new();
    let filters = FilterSet::from_decisions([FilterDecision {
        key: FilterKey::Oid(16400),
        kind: FilterKind::ExcludeTable,
    }]);
    let out = rewrite_restore_list(SAMPLE, &filters, &done).unwrap();
    assert!(out.contains("; 4; 1259 16400 TABLE public accounts postgres"));
}

#[test]
fn untouched_entries_keep_their_line_as_is() {
    let done: HashSet<u32> = HashSet::new();
    let filters = FilterSet::new();
    let out = rewrite_restore_list(SAMPLE, &filters, &done).unwrap();
    assert_eq!(out, SAMPLE);
}

#[test]
fn post_data_rewrite_comments_out_only_already_built_indexes_and_constraints() {
    let mut done = HashSet::new();
    done.insert(16401);
    done.insert(16402);
    let filters = FilterSet::new();
    let out = rewrite_post_data_restore_list(SAMPLE, &filters, &done).unwrap();
    assert!(out.contains("; 5; 1259 16401 INDEX public accounts_pkey postgres"));
    assert!(out.contains("; 6; 1259 16402 CONSTRAINT public accounts_check postgres"));
    assert!(out.contains("4; 1259 16400 TABLE public accounts postgres"));
}

#[test]
fn post_data_rewrite_keeps_indexes_and_constraints_not_yet_built() {
    let done: HashSet<u32> = HashSet::new();
    let filters = FilterSet::new();
    let out = rewrite_post_data_restore_list(SAMPLE, &filters, &done).unwrap();
    assert!(out.contains("5; 1259 16401 INDEX public accounts_pkey postgres"));
    assert!(!out.contains("; 5; 1259 16401 INDEX public accounts_pkey postgres"));
    assert!(out.contains("6; 1259 16402 CONSTRAINT public accounts_check postgres"));
    assert!(!out.contains("; 6; 1259 16402 CONSTRAINT public accounts_check postgres"));
}

#[test]
fn copies_data_reflects_exclude_table_data() {
    let filters = FilterSet::from_decisions([FilterDecision {
        key: FilterKey::Oid(16400),
        kind: FilterKind::ExcludeTableData,
    }]);
    assert!(!copies_data(&filters, 16400, "public.accounts"));
    assert!(copies_data(&filters, 99999, "public.other"));
}
