// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (deliberately out of the core's scope, spec §1):
//! `RUST_LOG`-driven filtering via `tracing-subscriber`, one line per
//! event to stderr so stdout stays free for `list`/`snapshot`/`compare`
//! output.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
