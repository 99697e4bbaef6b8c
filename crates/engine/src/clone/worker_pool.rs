// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic fan-out over an oid queue (spec §4.4's table/index worker
//! pools, §4.7's large-object pool): the orchestrator hands every oid
//! to a bounded pool of tasks via a `WorkItem` channel, then pushes one
//! `Stop` per worker so each task exits once the queue is drained
//! rather than racing on channel closure.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use pgcopy_wire::WorkItem;

use crate::error::EngineError;

/// Outcome of running every item in one pool to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub succeeded: u32,
    pub failed: u32,
}

impl PoolSummary {
    pub fn total(&self) -> u32 {
        self.succeeded + self.failed
    }
}

/// Run `handler` over every oid in `oids` across `job_count` concurrent
/// workers. `make_item` wraps an oid into the `WorkItem` variant this
/// pool's queue carries (`TableOid`, `IndexOid`, or `LoOid`) so the
/// termination discipline matches the wire protocol used for an
/// out-of-process worker pool, even though these workers are plain
/// tokio tasks.
///
/// When `fail_fast` is set, the first failure stops workers from
/// picking up further items, though items already in flight still run
/// to completion.
pub async fn run_oid_pool<F, Fut>(
    oids: Vec<u32>,
    make_item: impl Fn(u32) -> WorkItem,
    job_count: u32,
    fail_fast: bool,
    handler: F,
) -> Result<PoolSummary, EngineError>
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EngineError>> + Send + 'static,
{
    let job_count = job_count.max(1) as usize;
    let (tx, rx) = tokio::sync::mpsc::channel::<WorkItem>(job_count * 2 + 1);
    let rx = Arc::new(AsyncMutex::new(rx));
    let handler = Arc::new(handler);
    let stop_flag = Arc::new(AtomicBool::new(false));
    let mut handles = Vec::with_capacity(job_count);

    for _ in 0..job_count {
        let rx = rx.clone();
        let handler = handler.clone();
        let stop_flag = stop_flag.clone();
        handles.push(tokio::spawn(async move {
            let mut summary = PoolSummary::default();
            loop {
                let item = { rx.lock().await.recv().await };
                let oid = match item {
                    None | Some(WorkItem::Stop) => break,
                    Some(WorkItem::TableOid(oid) | WorkItem::IndexOid(oid) | WorkItem::LoOid(oid)) => oid,
                };
                if fail_fast && stop_flag.load(Ordering::SeqCst) {
                    continue;
                }
                match handler(oid).await {
                    Ok(()) => summary.succeeded += 1,
                    Err(error) => {
                        tracing::error!(%error, oid, "worker item failed");
                        summary.failed += 1;
                        if fail_fast {
                            stop_flag.store(true, Ordering::SeqCst);
                        }
                    }
                }
            }
            summary
        }));
    }

    for oid in oids {
        if tx.send(make_item(oid)).await.is_err() {
            break;
        }
    }
    for _ in 0..job_count {
        let _ = tx.send(WorkItem::Stop).await;
    }
    drop(tx);

    let mut total = PoolSummary::default();
    for handle in handles {
        let summary = handle.await.map_err(|error| EngineError::Io {
            path: std::path::PathBuf::from("<worker task>"),
            source: std::io::Error::other(error.to_string()),
        })?;
        total.succeeded += summary.succeeded;
        total.failed += summary.failed;
    }

    if fail_fast && total.failed > 0 {
        return Err(EngineError::FailFast {
            phase: "worker pool".to_string(),
            failed: total.failed as usize,
            total: total.total() as usize,
        });
    }
    Ok(total)
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
