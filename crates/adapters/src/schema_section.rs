// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Which half of the schema a dump/restore invocation targets (spec
/// §4.4 steps 1, 3, 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSection {
    PreData,
    PostData,
}

impl SchemaSection {
    pub fn pg_dump_flag(self) -> &'static str {
        match self {
            SchemaSection::PreData => "pre-data",
            SchemaSection::PostData => "post-data",
        }
    }

    pub fn archive_filename(self) -> &'static str {
        match self {
            SchemaSection::PreData => "pre-data.dump",
            SchemaSection::PostData => "post-data.dump",
        }
    }
}
