// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level pidfile lifecycle (spec §4.1): every long-running role
//! (clone, stream receive/transform/apply) writes one of these at the
//! top of its work directory, and a second "service" pidfile when it
//! runs a sub-service under `--follow`. Three lines: pid, version, and
//! the id of a logging mutex a crashed process may have left stranded.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::DaemonError;

/// Contents of a pidfile, parsed or about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pidfile {
    pub pid: u32,
    pub version: String,
    pub log_mutex_id: String,
}

impl Pidfile {
    /// A pidfile describing this process.
    pub fn mine(log_mutex_id: impl Into<String>) -> Self {
        Self {
            pid: std::process::id(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_mutex_id: log_mutex_id.into(),
        }
    }

    fn render(&self) -> String {
        format!("{}\n{}\n{}\n", self.pid, self.version, self.log_mutex_id)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, DaemonError> {
        let mut lines = contents.lines();
        let pid = lines
            .next()
            .and_then(|line| line.trim().parse().ok())
            .ok_or_else(|| DaemonError::MalformedPidfile {
                path: path.to_path_buf(),
                reason: "missing or non-numeric pid on line 1".to_string(),
            })?;
        let version = lines.next().unwrap_or_default().trim().to_string();
        let log_mutex_id = lines.next().unwrap_or_default().trim().to_string();
        Ok(Self { pid, version, log_mutex_id })
    }
}

/// Read and parse a pidfile, if one exists at `path`.
pub fn read(path: &Path) -> Result<Option<Pidfile>, DaemonError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Pidfile::parse(&contents, path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DaemonError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Probe whether `pid` names a live process, the same way per-resource
/// lockfiles do (signal 0; `EPERM` still means the process exists).
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_alive(_pid: u32) -> bool {
    false
}

/// Remove a pidfile known to belong to a dead process, along with any
/// logging mutex file it left stranded under `mutex_dir`.
pub fn reclaim_stale(path: &Path, pidfile: &Pidfile, mutex_dir: &Path) -> Result<(), DaemonError> {
    if !pidfile.log_mutex_id.is_empty() {
        let _ = std::fs::remove_file(mutex_dir.join(&pidfile.log_mutex_id));
    }
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DaemonError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// A claimed pidfile. The cross-process advisory lock and the file on
/// disk are both released on drop, so a panicking process still frees
/// the slot for the next run to reclaim.
pub struct PidfileGuard {
    path: PathBuf,
    file: File,
}

impl Drop for PidfileGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Write `pidfile` at `path` under an exclusive advisory lock.
///
/// The lock is acquired before the file is truncated, so a process that
/// loses a startup race against a genuinely live sibling never wipes
/// that sibling's pid out from under it.
pub fn claim(path: &Path, pidfile: &Pidfile) -> Result<PidfileGuard, DaemonError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|source| DaemonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    file.try_lock_exclusive().map_err(|source| DaemonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.set_len(0).map_err(|source| DaemonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(pidfile.render().as_bytes()).map_err(|source| DaemonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PidfileGuard {
        path: path.to_path_buf(),
        file,
    })
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
