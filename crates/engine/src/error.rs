// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use pgcopy_adapters::AdapterError;
use pgcopy_core::{ExitCode, HasExitCode};
use pgcopy_runbook::RestoreListError;
use pgcopy_storage::CatalogError;

/// Leaf error type for the Clone Orchestrator and Replication Follower.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("source connection error: {0}")]
    Source(#[source] AdapterError),

    #[error("target connection error: {0}")]
    Target(#[source] AdapterError),

    #[error("catalog store error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("restore list error: {0}")]
    RestoreList(#[from] RestoreListError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lockfile for {resource} is held by live pid {pid}")]
    LockHeldByLivePid { resource: String, pid: u32 },

    #[error("lockfile for {resource} was left by dead pid {pid}; pass --resume or --restart")]
    LockHeldByDeadPid { resource: String, pid: u32 },

    #[error("donefile for {resource} is malformed: {reason}")]
    MalformedDonefile { resource: String, reason: String },

    #[error("worker pool for {phase} failed: {failed}/{total} items errored (fail-fast engaged)")]
    FailFast {
        phase: String,
        failed: usize,
        total: usize,
    },

    #[error("replication origin {origin} could not be parsed: {reason}")]
    BadOrigin { origin: String, reason: String },

    #[error("could not decode replication message: {0}")]
    Decode(#[from] crate::follow::decode::DecodeError),
}

impl HasExitCode for EngineError {
    fn exit_code(&self) -> ExitCode {
        match self {
            EngineError::Source(_) => ExitCode::Source,
            EngineError::Target(_) => ExitCode::Target,
            EngineError::Catalog(_) => ExitCode::Internal,
            EngineError::RestoreList(_) => ExitCode::BadState,
            EngineError::Io { .. } => ExitCode::Internal,
            EngineError::LockHeldByLivePid { .. } => ExitCode::BadState,
            EngineError::LockHeldByDeadPid { .. } => ExitCode::BadState,
            EngineError::MalformedDonefile { .. } => ExitCode::BadState,
            EngineError::FailFast { .. } => ExitCode::Fatal,
            EngineError::BadOrigin { .. } => ExitCode::BadState,
            EngineError::Decode(_) => ExitCode::Internal,
        }
    }
}
