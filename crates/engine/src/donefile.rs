// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-object lockfile/donefile primitives (spec §4.1, §4.4.2). Every
//! catalog object a worker claims (a table, a table's COPY partition, an
//! index, a large object) goes through the same cycle: take a lockfile
//! named for the pid that holds it, do the work, write a donefile
//! summarizing what happened, release the lockfile. A restarted run
//! consults the donefile to skip work that already finished, and the
//! lockfile to tell a live sibling process's claim apart from one left
//! behind by a crash.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Summary written to a resource's donefile once work on it completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoneRecord {
    pub pid: u32,
    pub resource: String,
    pub started_at_ms: u64,
    pub done_at_ms: u64,
    pub byte_count: u64,
    pub command: String,
}

/// What happened when a worker tried to claim a resource's lockfile.
pub enum LockOutcome {
    /// The lock was free (or left by a dead pid in a resumed run) and is
    /// now held by this process.
    Acquired(LockGuard),
    /// A live sibling process already owns this resource; the caller
    /// should move on to the next item rather than treat this as an
    /// error.
    OwnedByLivePid,
}

/// An acquired lockfile. Removed on drop, so a panicking worker still
/// releases its claim.
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Claim `path` as a lockfile, writing this process's pid into it.
///
/// The fast path creates the lockfile with `O_EXCL` semantics
/// (`create_new`), so two siblings racing the same resource can never
/// both believe they own it: exactly one `open` succeeds. If the file
/// already exists and names a live pid, the resource is owned elsewhere:
/// returns `OwnedByLivePid` rather than an error, since in the fan-out
/// worker pools this is an expected race, not a failure. If it names a
/// dead pid, reclaims it when `resume` is set (again through an atomic
/// create, so a sibling that wins the reclaim race is reported as the
/// owner rather than silently overwritten); otherwise refuses with
/// [`EngineError::LockHeldByDeadPid`], since a fresh (non-resumed) run
/// should never find stale locks.
pub fn acquire_lock(path: &Path, resource: &str, resume: bool) -> Result<LockOutcome, EngineError> {
    match create_lock_file(path) {
        Ok(guard) => return Ok(LockOutcome::Acquired(guard)),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(source) => {
            return Err(EngineError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let existing = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let owner_pid: u32 = existing.trim().parse().unwrap_or(0);
    if owner_pid != 0 && pid_is_alive(owner_pid) {
        return Ok(LockOutcome::OwnedByLivePid);
    }
    if !resume {
        return Err(EngineError::LockHeldByDeadPid {
            resource: resource.to_string(),
            pid: owner_pid,
        });
    }

    std::fs::remove_file(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match create_lock_file(path) {
        Ok(guard) => Ok(LockOutcome::Acquired(guard)),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(LockOutcome::OwnedByLivePid),
        Err(source) => Err(EngineError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn create_lock_file(path: &Path) -> std::io::Result<LockGuard> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(std::process::id().to_string().as_bytes())?;
    Ok(LockGuard {
        path: path.to_path_buf(),
    })
}

#[cfg(unix)]
fn pid_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    // Signal 0 probes liveness without actually signaling the process;
    // EPERM still means the pid exists, just not ours to signal.
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn pid_is_alive(_pid: u32) -> bool {
    false
}

pub fn read_donefile(path: &Path) -> Result<Option<DoneRecord>, EngineError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let record = serde_json::from_slice(&bytes).map_err(|err| EngineError::MalformedDonefile {
                resource: path.display().to_string(),
                reason: err.to_string(),
            })?;
            Ok(Some(record))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EngineError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn write_donefile(path: &Path, record: &DoneRecord) -> Result<(), EngineError> {
    let bytes = serde_json::to_vec_pretty(record).map_err(|err| EngineError::MalformedDonefile {
        resource: path.display().to_string(),
        reason: err.to_string(),
    })?;
    std::fs::write(path, bytes).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn is_done(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
#[path = "donefile_tests.rs"]
mod tests;
