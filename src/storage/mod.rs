// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Local Storage Module
//!
//! Durable, client-local state. The replicated graph is not stored here; this
//! module only holds the transaction event queue that mirrors wallet activity
//! for display and idempotence.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   queue.redb    # Transaction event queue (redb)
//! ```
//!
//! The queue is not the source of truth for blockchain state.

pub mod events;
pub mod paths;
pub mod tx_queue;

pub use events::{QueueStatus, QueuedEvent, TransactionEvent, TxEventData, TxEventType, CLAIM_SOURCE};
pub use paths::StoragePaths;
pub use tx_queue::{QueueError, QueueIter, QueueResult, TransactionQueue};
