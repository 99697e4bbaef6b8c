// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command tree (spec §6): `clone` (an alias of `copy db`), `copy
//! {db, data, table-data, sequences, indexes, constraints, roles,
//! extensions, blobs}`, `dump`, `restore`, `list`, `stream {setup,
//! cleanup, prefetch, catchup, receive, transform, apply, sentinel
//! {get, set}}`, `snapshot`, `compare`.

use clap::{Args, Parser, Subcommand};

use crate::env;

#[derive(Debug, Parser)]
#[command(name = "pgcopydb", version, about = "Copy a Postgres database, and follow it.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clone source into target end to end; an alias of `copy db`.
    Clone(CommonArgs),
    /// Copy all or part of a database's schema and/or data.
    Copy {
        #[command(subcommand)]
        command: CopyCommand,
    },
    /// Dump the source schema to the work directory's archive files.
    Dump(CommonArgs),
    /// Restore previously dumped schema archives into the target.
    Restore(CommonArgs),
    /// List catalog objects cached in the work directory.
    List(CommonArgs),
    /// Logical replication follower: receive, transform, apply, and the
    /// sentinel control channel.
    Stream {
        #[command(subcommand)]
        command: StreamCommand,
    },
    /// Export or display the shared clone snapshot.
    Snapshot(CommonArgs),
    /// Compare source and target row counts/checksums after a clone.
    Compare(CommonArgs),
}

#[derive(Debug, Subcommand)]
pub enum CopyCommand {
    /// Schema and data, end to end (what `clone` runs).
    Db(CommonArgs),
    /// Table rows, sequences and large objects, no schema DDL.
    Data(CommonArgs),
    /// Table rows only.
    TableData(CommonArgs),
    Sequences(CommonArgs),
    Indexes(CommonArgs),
    Constraints(CommonArgs),
    Roles(CommonArgs),
    Extensions(CommonArgs),
    Blobs(CommonArgs),
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Create the replication slot and the sentinel row.
    Setup(CommonArgs),
    /// Drop the replication slot and remove CDC work directory state.
    Cleanup(CommonArgs),
    /// Receive and transform without applying, to warm the CDC segments.
    Prefetch(CommonArgs),
    /// Prefetch then apply in one run.
    Catchup(CommonArgs),
    /// Run the Receiver only.
    Receive(CommonArgs),
    /// Run the Transformer only, over whatever JSON segments exist.
    Transform(CommonArgs),
    /// Run the Applier only, over whatever SQL segments exist.
    Apply(CommonArgs),
    /// Read or update the sentinel control row.
    Sentinel {
        #[command(subcommand)]
        command: SentinelCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SentinelCommand {
    /// Print the current sentinel row.
    Get(CommonArgs),
    /// Update one sentinel field.
    Set {
        #[command(subcommand)]
        command: SentinelSetCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SentinelSetCommand {
    Startpos {
        /// LSN in `HH.../LL...` format.
        lsn: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    Endpos {
        lsn: String,
        #[command(flatten)]
        common: CommonArgs,
    },
    Apply {
        enabled: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Flags shared by (almost) every subcommand (spec §6).
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source database connection string.
    #[arg(long, env = env::SOURCE_PGURI)]
    pub source: Option<String>,

    /// Target database connection string.
    #[arg(long, env = env::TARGET_PGURI)]
    pub target: Option<String>,

    /// Work directory; a temp directory is derived when absent.
    #[arg(long, env = env::WORKDIR)]
    pub dir: Option<std::path::PathBuf>,

    #[arg(long, env = env::TABLE_JOBS, default_value_t = 4)]
    pub table_jobs: u32,

    #[arg(long, env = env::INDEX_JOBS, default_value_t = 4)]
    pub index_jobs: u32,

    #[arg(long = "large-objects-jobs", env = env::LARGE_OBJECTS_JOBS, default_value_t = 4)]
    pub large_objects_jobs: u32,

    #[arg(long, env = env::RESTORE_JOBS, default_value_t = 4)]
    pub restore_jobs: u32,

    /// Tables larger than this many bytes are split across multiple
    /// copy workers (spec §4.4.1). `0` disables splitting.
    #[arg(long, env = env::SPLIT_TABLES_LARGER_THAN, default_value_t = 0)]
    pub split_tables_larger_than: u64,

    #[arg(long, env = env::DROP_IF_EXISTS, default_value_t = false)]
    pub drop_if_exists: bool,

    #[arg(long, default_value_t = false)]
    pub no_owner: bool,

    #[arg(long, default_value_t = false)]
    pub no_acl: bool,

    #[arg(long, default_value_t = false)]
    pub no_comments: bool,

    #[arg(long, env = env::SKIP_LARGE_OBJECTS, default_value_t = false)]
    pub skip_large_objects: bool,

    #[arg(long, env = env::SKIP_EXTENSIONS, default_value_t = false)]
    pub skip_extensions: bool,

    #[arg(long, env = env::SKIP_COLLATIONS, default_value_t = false)]
    pub skip_collations: bool,

    #[arg(long, env = env::SKIP_VACUUM, default_value_t = false)]
    pub skip_vacuum: bool,

    /// Path to the `--filters` INI file (spec §6).
    #[arg(long, env = env::FILTERS)]
    pub filters: Option<std::path::PathBuf>,

    #[arg(long, env = env::FAIL_FAST, default_value_t = false)]
    pub fail_fast: bool,

    /// Start a fresh run against an empty (or forcibly cleaned) work
    /// directory; mutually exclusive with `--resume`.
    #[arg(long, default_value_t = false)]
    pub restart: bool,

    /// Continue a previously interrupted run from its persisted state.
    #[arg(long, default_value_t = false)]
    pub resume: bool,

    /// Allow a worker to proceed without joining the shared snapshot.
    #[arg(long, default_value_t = false)]
    pub not_consistent: bool,

    /// Adopt an already-exported snapshot token instead of exporting a
    /// fresh one.
    #[arg(long, env = env::SNAPSHOT)]
    pub snapshot: Option<String>,

    /// After a clone finishes, keep following the source via logical
    /// decoding.
    #[arg(long, default_value_t = false)]
    pub follow: bool,

    /// Logical decoding output plugin.
    #[arg(long, env = env::OUTPUT_PLUGIN, default_value = "wal2json")]
    pub plugin: String,

    #[arg(long = "slot-name", env = env::SLOT_NAME, default_value = "pgcopydb")]
    pub slot_name: String,

    /// Replication origin name; defaults to the product name.
    #[arg(long, env = env::ORIGIN, default_value = "pgcopydb")]
    pub origin: String,

    /// Stop following once the sentinel's `replay_lsn` reaches this LSN.
    #[arg(long)]
    pub endpos: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
