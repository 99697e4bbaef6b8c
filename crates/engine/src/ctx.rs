// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The application context threaded through every worker: cooperative
//! cancellation flags, the work directory, and the run's tunables. No
//! process-wide global state (spec §5's "encapsulate in an application
//! context" guidance); everything a worker needs is reachable from one
//! `Ctx` value it owns or clones.

use std::sync::Arc;

use pgcopy_core::{Clock, SignalFlags, Workdir};

/// Tunables that shape how the Clone Orchestrator fans work out.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub table_jobs: u32,
    pub index_jobs: u32,
    pub lo_jobs: u32,
    pub fail_fast: bool,
    pub skip_large_objects: bool,
    pub drop_if_exists: bool,
    pub split_threshold_bytes: u64,
    pub split_max_parts: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            table_jobs: 4,
            index_jobs: 4,
            lo_jobs: 4,
            fail_fast: false,
            skip_large_objects: false,
            drop_if_exists: false,
            split_threshold_bytes: 10 * 1024 * 1024 * 1024,
            split_max_parts: 4,
        }
    }
}

/// Shared context for one clone or follow run.
#[derive(Clone)]
pub struct Ctx<C: Clock> {
    pub workdir: Arc<Workdir>,
    pub signals: SignalFlags,
    pub options: Arc<RunOptions>,
    pub clock: C,
}

impl<C: Clock> Ctx<C> {
    pub fn new(workdir: Workdir, options: RunOptions, clock: C) -> Self {
        Self {
            workdir: Arc::new(workdir),
            signals: SignalFlags::new(),
            options: Arc::new(options),
            clock,
        }
    }
}
