// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence restart (spec §4.7): once a table's rows are copied, its
//! sequences must be reset on the target to the value observed in the
//! shared snapshot, or a fresh insert on the target could collide with
//! a row that came from the source.

use std::collections::HashMap;

use pgcopy_adapters::TargetConnection;
use pgcopy_core::SourceSequence;

use crate::error::EngineError;

/// Reset every sequence in `sequences` on `target`, looking its
/// qualified name up in `names` (oid to `schema.name`, built from the
/// pre-data restore list's `SEQUENCE` entries). A sequence with no
/// matching name is logged and skipped rather than failing the whole
/// batch — it means the restore list and the fetched catalog disagree,
/// which is worth a warning but not fatal to the rest of the run.
pub async fn reset_sequences<T: TargetConnection>(
    target: &T,
    sequences: &[SourceSequence],
    names: &HashMap<u32, String>,
) -> Result<u32, EngineError> {
    let mut reset = 0;
    for sequence in sequences {
        let Some(name) = names.get(&sequence.oid) else {
            tracing::warn!(oid = sequence.oid, "no restore-list name for sequence; skipping reset");
            continue;
        };
        target
            .setval(name, sequence.last_value, sequence.is_called)
            .await
            .map_err(EngineError::Target)?;
        reset += 1;
    }
    Ok(reset)
}

#[cfg(test)]
#[path = "sequences_tests.rs"]
mod tests;
