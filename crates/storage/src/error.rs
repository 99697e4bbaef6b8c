// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "register_setup called with arguments differing from the persisted run: {field} was \
         {persisted:?}, now {requested:?}"
    )]
    SetupMismatch {
        field: &'static str,
        persisted: String,
        requested: String,
    },

    #[error("no setup has been registered for this work directory yet")]
    SetupMissing,

    #[error("no sentinel has been configured for this work directory yet")]
    SentinelMissing,

    #[error("section {0:?} was never started with begin_section")]
    SectionMissing(String),
}
