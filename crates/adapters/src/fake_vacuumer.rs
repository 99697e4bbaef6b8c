// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake vacuumer for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::Vacuumer;
use crate::error::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumCall {
    pub target_uri: String,
    pub qualified_table: String,
}

#[derive(Clone, Default)]
pub struct FakeVacuumer {
    calls: Arc<Mutex<Vec<VacuumCall>>>,
}

impl FakeVacuumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<VacuumCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Vacuumer for FakeVacuumer {
    async fn vacuum_analyze(&self, target_uri: &str, qualified_table: &str) -> Result<(), AdapterError> {
        self.calls.lock().push(VacuumCall {
            target_uri: target_uri.to_string(),
            qualified_table: qualified_table.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_vacuumer_tests.rs"]
mod tests;
