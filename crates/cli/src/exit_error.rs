// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Command handlers return `ExitError` instead of calling
//! `std::process::exit()` directly, so `main()` is the only place that
//! actually terminates the process.

use std::fmt;

use pgcopy_core::{ExitCode, HasExitCode};

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub message: String,
}

impl ExitError {
    pub fn new(code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_args(message: impl Into<String>) -> Self {
        Self::new(ExitCode::BadArgs, message)
    }

    pub fn bad_config(message: impl Into<String>) -> Self {
        Self::new(ExitCode::BadConfig, message)
    }

    pub fn from_exit_code(error: &impl HasExitCode, message: impl fmt::Display) -> Self {
        Self::new(error.exit_code(), message.to_string())
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<pgcopy_engine::EngineError> for ExitError {
    fn from(error: pgcopy_engine::EngineError) -> Self {
        Self::from_exit_code(&error, &error)
    }
}

impl From<pgcopy_storage::CatalogError> for ExitError {
    fn from(error: pgcopy_storage::CatalogError) -> Self {
        Self::new(ExitCode::Internal, error.to_string())
    }
}

impl From<pgcopy_adapters::AdapterError> for ExitError {
    fn from(error: pgcopy_adapters::AdapterError) -> Self {
        Self::new(ExitCode::Pgsql, error.to_string())
    }
}

impl From<pgcopy_runbook::RestoreListError> for ExitError {
    fn from(error: pgcopy_runbook::RestoreListError) -> Self {
        Self::new(ExitCode::BadState, error.to_string())
    }
}

impl From<pgcopy_shell::ShellError> for ExitError {
    fn from(error: pgcopy_shell::ShellError) -> Self {
        Self::new(ExitCode::Pgsql, error.to_string())
    }
}

impl From<pgcopy_daemon::DaemonError> for ExitError {
    fn from(error: pgcopy_daemon::DaemonError) -> Self {
        Self::new(ExitCode::BadState, error.to_string())
    }
}

impl From<std::io::Error> for ExitError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ExitCode::Internal, error.to_string())
    }
}

impl From<serde_json::Error> for ExitError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ExitCode::Internal, error.to_string())
    }
}

impl From<crate::filter_ini::FilterIniError> for ExitError {
    fn from(error: crate::filter_ini::FilterIniError) -> Self {
        Self::bad_config(error.to_string())
    }
}

impl From<anyhow::Error> for ExitError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ExitCode::BadArgs, error.to_string())
    }
}
