//! CLI help output specs.
//!
//! Verify help text displays for the command tree (spec §6) without
//! needing a live Postgres connection.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    pgcopydb().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_usage() {
    pgcopydb().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn version_shows_version() {
    pgcopydb().args(&["--version"]).passes().stdout_has("pgcopydb");
}

#[test]
fn copy_help_shows_subcommands() {
    pgcopydb()
        .args(&["copy", "--help"])
        .passes()
        .stdout_has("data")
        .stdout_has("table-data")
        .stdout_has("sequences")
        .stdout_has("indexes")
        .stdout_has("constraints")
        .stdout_has("roles")
        .stdout_has("extensions")
        .stdout_has("blobs");
}

#[test]
fn stream_help_shows_subcommands() {
    pgcopydb()
        .args(&["stream", "--help"])
        .passes()
        .stdout_has("setup")
        .stdout_has("receive")
        .stdout_has("transform")
        .stdout_has("apply")
        .stdout_has("sentinel");
}

#[test]
fn stream_sentinel_help_shows_get_and_set() {
    pgcopydb().args(&["stream", "sentinel", "--help"]).passes().stdout_has("get").stdout_has("set");
}
