// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-bounded execution of the external dump/restore/vacuum
//! binaries pgcopydb shells out to. This crate never interprets shell
//! syntax; every command is an argv vector handed straight to `exec`.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default timeout for `pg_dump`/`pg_restore` invocations covering an
/// entire schema section (roles, pre-data, post-data).
pub const SCHEMA_SECTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for a single `VACUUM ANALYZE` on one table.
pub const VACUUM_TABLE_TIMEOUT: Duration = Duration::from_secs(900);

/// Default timeout for `pg_restore --list` / list-rewriting invocations,
/// which only read/write the table of contents and should be fast.
pub const RESTORE_LIST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{description} failed to launch: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {timeout_secs}s")]
    Timeout {
        description: String,
        timeout_secs: u64,
    },
    #[error("{description} exited with status {status}: {stderr}")]
    NonZeroExit {
        description: String,
        status: i32,
        stderr: String,
    },
}

/// Run a subprocess command with a timeout, returning its captured
/// output. The child process is killed on drop if the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ShellError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ShellError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ShellError::Timeout {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Run a subprocess and require a zero exit status, surfacing stderr on
/// failure.
pub async fn run_checked(
    cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ShellError> {
    let output = run_with_timeout(cmd, timeout, description).await?;
    if !output.status.success() {
        return Err(ShellError::NonZeroExit {
            description: description.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
