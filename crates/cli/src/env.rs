// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable defaulting (spec §6/§7): every common flag falls
//! back to a `PGCOPYDB_*` variable when absent from the command line.
//! `clap`'s `env` attribute on each field does the actual fallback; this
//! module only loads a `.env` file first, the way the teacher's daemon
//! process loads its own environment before parsing flags.

/// Load a `.env` file from the current directory, if one exists. Missing
/// files are not an error; a malformed one is, since a typo there should
/// fail loudly rather than silently leave variables unset.
pub fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(_) | Err(dotenvy::Error::Io(_)) => Ok(()),
        Err(error) => Err(error.into()),
    }
}

pub const SOURCE_PGURI: &str = "PGCOPYDB_SOURCE_PGURI";
pub const TARGET_PGURI: &str = "PGCOPYDB_TARGET_PGURI";
pub const WORKDIR: &str = "PGCOPYDB_DIR";
pub const TABLE_JOBS: &str = "PGCOPYDB_TABLE_JOBS";
pub const INDEX_JOBS: &str = "PGCOPYDB_INDEX_JOBS";
pub const LARGE_OBJECTS_JOBS: &str = "PGCOPYDB_LARGE_OBJECTS_JOBS";
pub const RESTORE_JOBS: &str = "PGCOPYDB_RESTORE_JOBS";
pub const SPLIT_TABLES_LARGER_THAN: &str = "PGCOPYDB_SPLIT_TABLES_LARGER_THAN";
pub const SNAPSHOT: &str = "PGCOPYDB_SNAPSHOT";
pub const OUTPUT_PLUGIN: &str = "PGCOPYDB_OUTPUT_PLUGIN";
pub const SLOT_NAME: &str = "PGCOPYDB_SLOT_NAME";
pub const ORIGIN: &str = "PGCOPYDB_ORIGIN";
pub const DROP_IF_EXISTS: &str = "PGCOPYDB_DROP_IF_EXISTS";
pub const FAIL_FAST: &str = "PGCOPYDB_FAIL_FAST";
pub const SKIP_VACUUM: &str = "PGCOPYDB_SKIP_VACUUM";
pub const SKIP_LARGE_OBJECTS: &str = "PGCOPYDB_SKIP_LARGE_OBJECTS";
pub const SKIP_EXTENSIONS: &str = "PGCOPYDB_SKIP_EXTENSIONS";
pub const SKIP_COLLATIONS: &str = "PGCOPYDB_SKIP_COLLATIONS";
pub const FILTERS: &str = "PGCOPYDB_FILTERS";
pub const PG_DUMP: &str = "PGCOPYDB_PG_DUMP";
pub const PG_RESTORE: &str = "PGCOPYDB_PG_RESTORE";
pub const VACUUMDB: &str = "PGCOPYDB_VACUUMDB";
