// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pgcopy_adapters::{FakeTargetConnection, TargetCall};
use pgcopy_core::{FakeClock, FilterDecision, FilterKey, FilterKind, Workdir};

fn index() -> SourceIndex {
    SourceIndex {
        oid: 7,
        table_oid: 42,
        index_name: "accounts_pkey".to_string(),
        is_constraint: true,
        is_primary: true,
        definition: "ALTER TABLE public.accounts ADD CONSTRAINT accounts_pkey PRIMARY KEY (id)".to_string(),
        restore_list_name: "public.accounts_pkey".to_string(),
    }
}

fn new_ctx(dir: &std::path::Path) -> Ctx<FakeClock> {
    let workdir = Workdir::new(dir);
    for path in workdir.all_dirs() {
        std::fs::create_dir_all(path).unwrap();
    }
    Ctx::new(workdir, RunOptions::default(), FakeClock::new())
}

#[tokio::test]
async fn an_excluded_index_is_skipped_without_touching_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let target = FakeTargetConnection::new();
    let mut filters = FilterSet::new();
    filters.insert(FilterDecision {
        key: FilterKey::Oid(7),
        kind: FilterKind::ExcludeIndex,
    });

    let outcome = build_index(&ctx, &target, &index(), &filters, false).await.unwrap();
    assert_eq!(outcome, IndexBuildOutcome::FilteredOut);
    assert!(target.calls().is_empty());
}

#[tokio::test]
async fn a_fresh_index_is_built_and_marked_done() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    let target = FakeTargetConnection::new();
    let filters = FilterSet::new();

    let outcome = build_index(&ctx, &target, &index(), &filters, false).await.unwrap();
    assert_eq!(outcome, IndexBuildOutcome::Built);
    assert!(ctx.workdir.done_dir().join("index-7.done").exists());
    assert_eq!(
        target.calls(),
        vec![TargetCall::CreateIndex {
            definition: index().definition,
        }]
    );
}

#[tokio::test]
async fn an_already_done_index_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = new_ctx(dir.path());
    std::fs::write(ctx.workdir.done_dir().join("index-7.done"), "{}").unwrap();
    let target = FakeTargetConnection::new();
    let filters = FilterSet::new();

    let outcome = build_index(&ctx, &target, &index(), &filters, false).await.unwrap();
    assert_eq!(outcome, IndexBuildOutcome::AlreadyDone);
    assert!(target.calls().is_empty());
}
