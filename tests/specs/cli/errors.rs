//! Argument and startup-arbitration error specs (spec §4.1, §6).
//!
//! Every path here fails before a connection is ever opened, so none
//! of it needs a live Postgres server.

use crate::prelude::*;

#[test]
fn missing_source_and_target_is_bad_args() {
    pgcopydb()
        .args(&["clone"])
        .fails()
        .exit_code(1)
        .stderr_has("--source");
}

#[test]
fn missing_target_is_bad_args() {
    pgcopydb()
        .args(&["clone", "--source", "postgres://localhost/src"])
        .fails()
        .exit_code(1)
        .stderr_has("--target");
}

#[test]
fn restart_and_resume_are_mutually_exclusive() {
    let workdir = tempfile::tempdir().expect("tempdir");
    pgcopydb()
        .args(&[
            "clone",
            "--source",
            "postgres://localhost/src",
            "--target",
            "postgres://localhost/dst",
            "--dir",
        ])
        .args(&[workdir.path().to_str().expect("utf8 path")])
        .args(&["--restart", "--resume"])
        .fails()
        .exit_code(3)
        .stderr_has("mutually exclusive");
}

#[test]
fn nonempty_workdir_without_restart_or_resume_is_refused() {
    let workdir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(workdir.path().join("run")).expect("create run dir");
    std::fs::write(workdir.path().join("run").join("stray-file"), b"leftover").expect("write stray file");

    pgcopydb()
        .args(&[
            "clone",
            "--source",
            "postgres://localhost/src",
            "--target",
            "postgres://localhost/dst",
            "--dir",
        ])
        .args(&[workdir.path().to_str().expect("utf8 path")])
        .fails()
        .exit_code(3)
        .stderr_has("--restart or --resume");
}

#[test]
fn invalid_endpos_lsn_is_bad_args() {
    let workdir = tempfile::tempdir().expect("tempdir");
    pgcopydb()
        .args(&[
            "stream",
            "sentinel",
            "set",
            "endpos",
            "not-an-lsn",
            "--source",
            "postgres://localhost/src",
            "--target",
            "postgres://localhost/dst",
            "--dir",
        ])
        .args(&[workdir.path().to_str().expect("utf8 path")])
        .fails()
        .exit_code(1)
        .stderr_has("invalid LSN");
}
