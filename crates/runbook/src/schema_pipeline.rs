// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a filter configuration and a record of already-built objects
//! into a rewritten restore object list (spec §4.5).

use crate::filter_set::FilterSet;
use crate::restore_list::{RestoreEntry, RestoreList, RestoreListError};

/// Tells the pipeline which catalog objects are already done, so a
/// restarted post-data restore skips indexes/constraints built during
/// the table-copy phase without asking the filter about them at all.
pub trait DoneLookup {
    fn is_done(&self, object_oid: u32) -> bool;
}

impl DoneLookup for std::collections::HashSet<u32> {
    fn is_done(&self, object_oid: u32) -> bool {
        self.contains(&object_oid)
    }
}

/// Rewrite `text` (a `pg_restore --list` table of contents), commenting
/// out any entry that is already done or that the filter set excludes.
pub fn rewrite_restore_list(
    text: &str,
    filters: &FilterSet,
    done: &impl DoneLookup,
) -> Result<String, RestoreListError> {
    let list = RestoreList::parse(text)?;
    Ok(list.rewrite(|entry: &RestoreEntry| {
        if done.is_done(entry.object_oid) {
            return true;
        }
        let decision = filters.resolve(Some(entry.object_oid), &entry.restore_list_name());
        !decision.restores_object()
    }))
}

/// Same rewrite, but an index/constraint entry is skipped only when
/// `done` says it was already built during table-copy — used for the
/// post-data restore, which excludes indexes and constraints already
/// built, not every index/constraint unconditionally (spec §4.4 step 8,
/// §4.5).
pub fn rewrite_post_data_restore_list(
    text: &str,
    filters: &FilterSet,
    done: &impl DoneLookup,
) -> Result<String, RestoreListError> {
    let list = RestoreList::parse(text)?;
    Ok(list.rewrite(|entry: &RestoreEntry| {
        if is_index_or_constraint(&entry.desc) {
            return done.is_done(entry.object_oid);
        }
        if done.is_done(entry.object_oid) {
            return true;
        }
        let decision = filters.resolve(Some(entry.object_oid), &entry.restore_list_name());
        !decision.restores_object()
    }))
}

fn is_index_or_constraint(desc: &str) -> bool {
    matches!(desc, "INDEX" | "CONSTRAINT" | "FK CONSTRAINT")
}

/// Decide, for a single entry, whether the filter set excludes its row
/// data from being copied — used by the table-copy phase, independent
/// of restore-list rewriting.
pub fn copies_data(filters: &FilterSet, oid: u32, restore_list_name: &str) -> bool {
    filters.resolve(Some(oid), restore_list_name).copies_data()
}

#[cfg(test)]
#[path = "schema_pipeline_tests.rs"]
mod tests;
