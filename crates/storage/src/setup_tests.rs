// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::catalog_store::CatalogStore;
use pgcopy_core::FakeClock;

fn open_store() -> (tempfile::TempDir, CatalogStore<FakeClock>) {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open_with_clock(dir.path().join("pgcopydb.db"), FakeClock::new())
        .unwrap();
    (dir, store)
}

fn sample() -> RegisteredSetup {
    RegisteredSetup {
        source_uri: "postgres://source".to_string(),
        target_uri: "postgres://target".to_string(),
        snapshot_token: "00000003-0000002A-1".to_string(),
        split_threshold: 10_000_000,
        split_max_parts: 4,
        filters_digest: "abc123".to_string(),
    }
}

#[test]
fn first_registration_persists_and_returns_the_same_values() {
    let (_dir, store) = open_store();
    let persisted = store.register_setup(sample()).unwrap();
    assert_eq!(persisted, sample());
    assert_eq!(store.setup().unwrap(), Some(sample()));
}

#[test]
fn re_registering_with_identical_values_succeeds() {
    let (_dir, store) = open_store();
    store.register_setup(sample()).unwrap();
    let again = store.register_setup(sample()).unwrap();
    assert_eq!(again, sample());
}

#[test]
fn re_registering_with_a_different_target_uri_is_a_mismatch() {
    let (_dir, store) = open_store();
    store.register_setup(sample()).unwrap();

    let mut changed = sample();
    changed.target_uri = "postgres://different-target".to_string();

    let err = store.register_setup(changed).unwrap_err();
    match err {
        CatalogError::SetupMismatch { field, .. } => assert_eq!(field, "target_uri"),
        other => panic!("expected SetupMismatch, got {other:?}"),
    }
}

#[test]
fn setup_returns_none_before_registration() {
    let (_dir, store) = open_store();
    assert_eq!(store.setup().unwrap(), None);
}
