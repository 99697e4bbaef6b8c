// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation flags.
//!
//! Three signal kinds are recognized: `stop` (finish current item, then
//! exit), `stop_fast` (abandon current item), `quit` (orchestrator-issued
//! teardown). `reload` is bookkeeping only — it never causes a blocking
//! loop to return early. Installing OS signal handlers is out of scope
//! here; this type is the shared state a handler would flip.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RELOAD: u8 = 0b0001;
const STOP: u8 = 0b0010;
const STOP_FAST: u8 = 0b0100;
const QUIT: u8 = 0b1000;

/// Shared, cheaply-cloneable cancellation state threaded through every
/// worker as part of its application context.
#[derive(Clone, Default)]
pub struct SignalFlags(Arc<AtomicU8>);

impl SignalFlags {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(0)))
    }

    pub fn set_reload(&self) {
        self.0.fetch_or(RELOAD, Ordering::SeqCst);
    }

    pub fn set_stop(&self) {
        self.0.fetch_or(STOP, Ordering::SeqCst);
    }

    pub fn set_stop_fast(&self) {
        self.0.fetch_or(STOP | STOP_FAST, Ordering::SeqCst);
    }

    pub fn set_quit(&self) {
        self.0.fetch_or(STOP | QUIT, Ordering::SeqCst);
    }

    pub fn clear_reload(&self) {
        self.0.fetch_and(!RELOAD, Ordering::SeqCst);
    }

    /// True once any stop-shaped signal (stop, stop-fast, quit) was raised.
    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::SeqCst) & STOP != 0
    }

    pub fn should_stop_fast(&self) -> bool {
        self.0.load(Ordering::SeqCst) & STOP_FAST != 0
    }

    pub fn should_quit(&self) -> bool {
        self.0.load(Ordering::SeqCst) & QUIT != 0
    }

    /// True once a reload was requested; caller should re-read config and
    /// call [`SignalFlags::clear_reload`].
    pub fn reload_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst) & RELOAD != 0
    }
}

impl std::fmt::Debug for SignalFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalFlags")
            .field("stop", &self.should_stop())
            .field("stop_fast", &self.should_stop_fast())
            .field("quit", &self.should_quit())
            .field("reload", &self.reload_requested())
            .finish()
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
