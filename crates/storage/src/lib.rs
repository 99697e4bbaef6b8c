// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgcopy-storage: the embedded catalog store backing a work directory
//! (spec §2, §4.2). One SQLite file per run holds the fetched source
//! catalog, filter decisions, section/sentinel progress and LSN
//! tracking, so a `--resume`d run can pick up without re-querying the
//! source or re-copying what already finished.

mod catalog_entities;
mod catalog_store;
mod error;
mod filters;
mod lsn_tracking;
mod schema;
mod sections;
mod sentinel_store;
mod setup;

pub use catalog_store::CatalogStore;
pub use error::CatalogError;
pub use lsn_tracking::LsnMapping;
pub use sections::SectionStamp;
pub use setup::RegisteredSetup;
