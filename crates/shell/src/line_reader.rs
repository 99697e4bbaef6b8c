// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming line reader for the textual output of `pg_restore --list`
//! and similar tools, so the runbook crate can parse a restore list
//! without buffering the whole child process stdout up front.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// Wrap an async reader (typically a child process's stdout) as a line
/// stream, discarding the trailing newline from each line.
pub fn lines_of<R: AsyncRead + Unpin>(reader: R) -> Lines<BufReader<R>> {
    BufReader::new(reader).lines()
}

/// Collect every line from an async reader into a `Vec<String>`. Intended
/// for the restore-list table of contents, which is small enough (one
/// line per catalog object) to hold in memory once read.
pub async fn collect_lines<R: AsyncRead + Unpin>(
    reader: R,
) -> Result<Vec<String>, std::io::Error> {
    let mut lines = lines_of(reader);
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        out.push(line);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "line_reader_tests.rs"]
mod tests;
