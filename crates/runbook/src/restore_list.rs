// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser and rewriter for `pg_restore --list` style archive tables of
//! contents (spec §4.5). Each entry is one line:
//!
//! ```text
//! dumpId; catalogOid objectOid desc schema name owner
//! ```
//!
//! Comment lines (already prefixed with `;`) and blank lines are
//! preserved verbatim so re-emitting an untouched list round-trips
//! byte-for-byte apart from whitespace at line ends.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

static ENTRY_RE: OnceLock<Regex> = OnceLock::new();

fn entry_regex() -> &'static Regex {
    ENTRY_RE.get_or_init(|| {
        Regex::new(
            r"^(?P<dump_id>\d+);\s+(?P<catalog_oid>\d+)\s+(?P<object_oid>\d+)\s+(?P<desc>\S+)\s+(?P<schema>\S+)\s+(?P<name>\S+)\s+(?P<owner>\S+)\s*$",
        )
        .expect("static regex is valid")
    })
}

/// One parsed line of a restore list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreLine {
    Entry(RestoreEntry),
    /// A line already commented out with `;` at the start, a blank line,
    /// or a header line this parser doesn't need to understand.
    Verbatim(String),
}

/// A single catalog object entry in the archive table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreEntry {
    pub dump_id: u32,
    pub catalog_oid: u32,
    pub object_oid: u32,
    pub desc: String,
    pub schema: String,
    pub name: String,
    pub owner: String,
}

impl RestoreEntry {
    /// The name a filter decision is keyed by when no oid is known yet,
    /// e.g. `public.accounts`.
    pub fn restore_list_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn render(&self) -> String {
        format!(
            "{}; {} {} {} {} {} {}",
            self.dump_id, self.catalog_oid, self.object_oid, self.desc, self.schema, self.name, self.owner
        )
    }
}

#[derive(Debug, Error)]
pub enum RestoreListError {
    #[error("line {line_no}: does not match the expected entry format: {line:?}")]
    Malformed { line_no: usize, line: String },
}

/// A parsed restore list: an ordered sequence of lines, some entries,
/// some verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreList {
    pub lines: Vec<RestoreLine>,
}

impl RestoreList {
    /// Parse `pg_restore --list` output. Lines already commented out
    /// (leading `;`), blank, or otherwise not matching the entry grammar
    /// are kept verbatim rather than rejected, since the real tool's
    /// header block and any previously-rewritten comments must survive
    /// a re-parse.
    pub fn parse(text: &str) -> Result<Self, RestoreListError> {
        let mut lines = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            if raw.trim().is_empty() || raw.trim_start().starts_with(';') {
                lines.push(RestoreLine::Verbatim(raw.to_string()));
                continue;
            }
            match entry_regex().captures(raw) {
                Some(caps) => {
                    let entry = RestoreEntry {
                        dump_id: caps["dump_id"].parse().map_err(|_| RestoreListError::Malformed {
                            line_no: idx + 1,
                            line: raw.to_string(),
                        })?,
                        catalog_oid: caps["catalog_oid"].parse().unwrap_or_default(),
                        object_oid: caps["object_oid"].parse().unwrap_or_default(),
                        desc: caps["desc"].to_string(),
                        schema: caps["schema"].to_string(),
                        name: caps["name"].to_string(),
                        owner: caps["owner"].to_string(),
                    };
                    lines.push(RestoreLine::Entry(entry));
                }
                None => {
                    tracing::trace!(line_no = idx + 1, %raw, "restore list line kept verbatim");
                    lines.push(RestoreLine::Verbatim(raw.to_string()));
                }
            }
        }
        Ok(Self { lines })
    }

    /// Re-emit the list, commenting out (prefixing with `;`) every entry
    /// for which `should_skip` returns true. Order, dumpIds, and
    /// descriptions are preserved exactly.
    pub fn rewrite(&self, mut should_skip: impl FnMut(&RestoreEntry) -> bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                RestoreLine::Entry(entry) => {
                    let rendered = entry.render();
                    if should_skip(entry) {
                        out.push_str("; ");
                        out.push_str(&rendered);
                    } else {
                        out.push_str(&rendered);
                    }
                }
                RestoreLine::Verbatim(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out
    }

    pub fn entries(&self) -> impl Iterator<Item = &RestoreEntry> {
        self.lines.iter().filter_map(|l| match l {
            RestoreLine::Entry(e) => Some(e),
            RestoreLine::Verbatim(_) => None,
        })
    }
}

#[cfg(test)]
#[path = "restore_list_tests.rs"]
mod tests;
