// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false")
        .await
        .unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn run_with_timeout_io_error() {
    let cmd = Command::new("/nonexistent/binary");
    let result = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent").await;
    assert!(matches!(result, Err(ShellError::Spawn { .. })));
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let result = run_with_timeout(cmd, Duration::from_millis(100), "test sleep").await;
    match result {
        Err(ShellError::Timeout { description, .. }) => assert_eq!(description, "test sleep"),
        other => panic!("expected timeout error, got {other:?}"),
    }
}

#[tokio::test]
async fn run_checked_fails_on_nonzero_exit() {
    let cmd = Command::new("false");
    let result = run_checked(cmd, Duration::from_secs(5), "false").await;
    assert!(matches!(result, Err(ShellError::NonZeroExit { .. })));
}

#[tokio::test]
async fn run_checked_succeeds_on_zero_exit() {
    let mut cmd = Command::new("echo");
    cmd.arg("ok");
    let output = run_checked(cmd, Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
}
