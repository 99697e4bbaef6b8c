// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compiled, queryable form the (externally parsed) filter
//! configuration reduces to. Parsing the filter INI file itself is out
//! of scope (spec §1); this only holds and resolves the decisions it
//! produces.

use pgcopy_core::{FilterDecision, FilterKey, FilterKind};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    by_oid: HashMap<u32, FilterKind>,
    by_name: HashMap<String, FilterKind>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_decisions(decisions: impl IntoIterator<Item = FilterDecision>) -> Self {
        let mut set = Self::new();
        for decision in decisions {
            set.insert(decision);
        }
        set
    }

    pub fn insert(&mut self, decision: FilterDecision) {
        match decision.key {
            FilterKey::Oid(oid) => {
                self.by_oid.insert(oid, decision.kind);
            }
            FilterKey::RestoreListName(name) => {
                self.by_name.insert(name, decision.kind);
            }
        }
    }

    pub fn decision_for_oid(&self, oid: u32) -> Option<FilterKind> {
        self.by_oid.get(&oid).copied()
    }

    pub fn decision_for_name(&self, name: &str) -> Option<FilterKind> {
        self.by_name.get(name).copied()
    }

    /// Resolve a decision by trying the oid first, falling back to name.
    /// Objects with no matching decision default to `Include`.
    pub fn resolve(&self, oid: Option<u32>, name: &str) -> FilterKind {
        oid.and_then(|o| self.decision_for_oid(o))
            .or_else(|| self.decision_for_name(name))
            .unwrap_or(FilterKind::Include)
    }

    pub fn len(&self) -> usize {
        self.by_oid.len() + self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty() && self.by_name.is_empty()
    }
}

#[cfg(test)]
#[path = "filter_set_tests.rs"]
mod tests;
