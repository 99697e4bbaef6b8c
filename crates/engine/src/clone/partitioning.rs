// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! COPY partitioning (spec §4.4.1): split a large table's row copy into
//! up to `max_parts` ranges so several workers can stream it
//! concurrently. Tables under the size threshold, or with partitioning
//! disabled for their key kind, copy as a single part.

use pgcopy_core::{PartitionKey, SourceTable};

use crate::ctx::RunOptions;

/// One slice of a table's row data to COPY, identified by its position
/// among `total` parts and an optional `WHERE` clause narrowing it (no
/// clause means "the whole table", used both for unsplit tables and the
/// single part of a table under the split threshold).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPart {
    pub index: u32,
    pub total: u32,
    pub where_clause: Option<String>,
}

/// Page size pgcopydb assumes when converting a byte-size estimate into
/// a ctid page range; matches Postgres's fixed heap page size.
const HEAP_PAGE_BYTES: u64 = 8192;

/// Decide how to split `table`'s copy, given the run's size threshold
/// and part-count cap.
pub fn plan_table_copy(table: &SourceTable, options: &RunOptions) -> Vec<CopyPart> {
    let single = || vec![CopyPart {
        index: 0,
        total: 1,
        where_clause: None,
    }];

    if table.relation_size < 0 || (table.relation_size as u64) < options.split_threshold_bytes {
        return single();
    }
    let total = options.split_max_parts.max(1);
    if total <= 1 {
        return single();
    }

    match &table.partition_key {
        PartitionKey::None => single(),
        PartitionKey::PrimaryKey(column) => (0..total)
            .map(|index| CopyPart {
                index,
                total,
                where_clause: Some(format!(
                    "hashtext({column}::text) % {total} = {index}",
                    column = quote_ident(column),
                )),
            })
            .collect(),
        PartitionKey::Ctid => {
            let page_count = ((table.relation_size as u64) / HEAP_PAGE_BYTES).max(1);
            let pages_per_part = page_count.div_ceil(total as u64).max(1);
            (0..total)
                .map(|index| {
                    let start = index as u64 * pages_per_part;
                    let where_clause = if index + 1 == total {
                        format!("ctid >= '({start},0)'::tid")
                    } else {
                        let end = (index as u64 + 1) * pages_per_part;
                        format!("ctid >= '({start},0)'::tid AND ctid < '({end},0)'::tid")
                    };
                    CopyPart {
                        index,
                        total,
                        where_clause: Some(where_clause),
                    }
                })
                .collect()
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
#[path = "partitioning_tests.rs"]
mod tests;
