// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::{FakeTargetConnection, TargetCall};

fn sequence(oid: u32, last_value: i64, is_called: bool) -> SourceSequence {
    SourceSequence {
        oid,
        last_value,
        is_called,
    }
}

#[tokio::test]
async fn known_sequences_are_reset_by_name() {
    let target = FakeTargetConnection::new();
    let sequences = vec![sequence(1, 42, true)];
    let mut names = HashMap::new();
    names.insert(1, "public.accounts_id_seq".to_string());

    let reset = reset_sequences(&target, &sequences, &names).await.unwrap();
    assert_eq!(reset, 1);
    assert_eq!(
        target.calls(),
        vec![TargetCall::Setval {
            qualified_name: "public.accounts_id_seq".to_string(),
            last_value: 42,
            is_called: true,
        }]
    );
}

#[tokio::test]
async fn a_sequence_with_no_matching_name_is_skipped_not_failed() {
    let target = FakeTargetConnection::new();
    let sequences = vec![sequence(1, 42, true), sequence(2, 7, false)];
    let mut names = HashMap::new();
    names.insert(2, "public.orders_id_seq".to_string());

    let reset = reset_sequences(&target, &sequences, &names).await.unwrap();
    assert_eq!(reset, 1);
    assert_eq!(target.calls().len(), 1);
}
