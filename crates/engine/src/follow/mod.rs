// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Replication Follower: Receiver, Transformer and Applier (spec
//! §4.6), the three cooperating stages that keep a target database
//! caught up with the source's logical decoding stream after a clone
//! has completed.

pub mod applier;
pub mod decode;
pub mod receiver;
pub mod transformer;

pub use applier::{run_applier, ApplierOptions, ApplyReport};
pub use decode::{decode_message, DecodeError, WireDialect};
pub use receiver::{run_receiver, ReceiverOptions, ReceiverReport};
pub use transformer::transform_segment;
