// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Error surface shared by every adapter in this crate. Whether a given
/// failure should map to the "source" or "target" exit code (spec §6/§7)
/// depends on which connection produced it, which only the caller knows,
/// so that mapping happens at the call site rather than in this type.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("{description}")]
    Shell {
        description: String,
        #[source]
        source: pgcopy_shell::ShellError,
    },

    #[error("no snapshot has been exported or adopted on this connection")]
    NoSnapshot,

    #[error("unexpected response shape reading {0}")]
    Malformed(String),
}

impl AdapterError {
    pub fn shell(description: impl Into<String>, source: pgcopy_shell::ShellError) -> Self {
        Self::Shell {
            description: description.into(),
            source,
        }
    }
}
