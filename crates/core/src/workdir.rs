// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work directory layout (spec §4.1): the stable on-disk namespace shared
//! by every process role. This module only knows paths and the pure
//! `--restart`/`--resume` arbitration rules; creating directories,
//! reading pidfiles and touching the disk is the daemon/engine's job.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which process role owns a given run, used to namespace a derived
/// temp-root work directory when none is given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Clone,
    Snapshot,
    Follow,
}

crate::simple_display! {
    Role {
        Clone => "clone",
        Snapshot => "snapshot",
        Follow => "follow",
    }
}

/// The full set of paths making up a work directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    pub top: PathBuf,
}

impl Workdir {
    pub fn new(top: impl Into<PathBuf>) -> Self {
        Self { top: top.into() }
    }

    /// Derive a default top-level directory under the system temp root,
    /// namespaced by role so concurrent runs of different roles don't
    /// collide by accident.
    pub fn derive_default(role: Role, tmp_root: &Path) -> Self {
        Self::new(tmp_root.join(format!("pgcopydb-{role}")))
    }

    pub fn run_dir(&self) -> PathBuf {
        self.top.join("run")
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.run_dir().join("tables")
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.run_dir().join("indexes")
    }

    pub fn los_dir(&self) -> PathBuf {
        self.run_dir().join("los")
    }

    pub fn done_dir(&self) -> PathBuf {
        self.run_dir().join("done")
    }

    pub fn cdc_dir(&self) -> PathBuf {
        self.top.join("cdc")
    }

    pub fn compare_dir(&self) -> PathBuf {
        self.top.join("compare")
    }

    pub fn schema_dir(&self) -> PathBuf {
        self.top.join("schema")
    }

    pub fn primary_pidfile(&self) -> PathBuf {
        self.top.join("pgcopydb.pid")
    }

    pub fn service_pidfile(&self, service: &str) -> PathBuf {
        self.top.join(format!("{service}.pid"))
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.top.join("snapshot")
    }

    pub fn catalog_db_file(&self) -> PathBuf {
        self.top.join("pgcopydb.db")
    }

    /// The directories a fresh run must create, in creation order (parents
    /// before children).
    pub fn all_dirs(&self) -> [PathBuf; 8] {
        [
            self.top.clone(),
            self.run_dir(),
            self.tables_dir(),
            self.indexes_dir(),
            self.los_dir(),
            self.done_dir(),
            self.cdc_dir(),
            self.compare_dir(),
        ]
    }
}

/// Decides whether a run may proceed against an existing (possibly
/// nonexistent) work directory, per spec §4.1's restart-safety invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupDecision {
    /// Directory is empty, or will be cleaned before use.
    ProceedFresh,
    /// Directory holds compatible prior state; continue from it.
    ProceedResumed,
    /// Refuse to start; the caller should exit with `BadState`.
    Refuse(RefuseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefuseReason {
    RestartAndResumeBothSet,
    LivePidfileOwner,
    SnapshotTokenMismatch,
    NonEmptyWithoutRestartOrResume,
}

crate::simple_display! {
    RefuseReason {
        RestartAndResumeBothSet => "--restart and --resume are mutually exclusive",
        LivePidfileOwner => "a live process already owns this work directory",
        SnapshotTokenMismatch => "persisted snapshot token does not match the current run",
        NonEmptyWithoutRestartOrResume => "work directory is not empty; pass --restart or --resume",
    }
}

/// Pure decision function: given the flags and what was observed on disk,
/// decide how startup should proceed. Disk observation (`dir_is_nonempty`,
/// `pidfile_owner_alive`, `persisted_token`) is supplied by the caller so
/// this stays unit-testable without touching the filesystem.
pub fn decide_startup(
    restart: bool,
    resume: bool,
    not_consistent: bool,
    dir_is_nonempty: bool,
    pidfile_owner_alive: bool,
    persisted_token: Option<&str>,
    requested_token: Option<&str>,
) -> StartupDecision {
    if restart && resume {
        return StartupDecision::Refuse(RefuseReason::RestartAndResumeBothSet);
    }
    if pidfile_owner_alive {
        return StartupDecision::Refuse(RefuseReason::LivePidfileOwner);
    }
    if restart {
        return StartupDecision::ProceedFresh;
    }
    if resume {
        if not_consistent {
            return StartupDecision::ProceedResumed;
        }
        match (persisted_token, requested_token) {
            (Some(p), Some(r)) if p == r => StartupDecision::ProceedResumed,
            _ => StartupDecision::Refuse(RefuseReason::SnapshotTokenMismatch),
        }
    } else if dir_is_nonempty {
        StartupDecision::Refuse(RefuseReason::NonEmptyWithoutRestartOrResume)
    } else {
        StartupDecision::ProceedFresh
    }
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
