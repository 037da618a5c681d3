// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction event records mirrored into the local queue.
//!
//! ## Persisted Layout
//!
//! ```json
//! {
//!   "id": "0xabc...",
//!   "createdDate": "2026-01-28T09:30:00Z",
//!   "type": "claim",
//!   "data": { "from": "GoodDollar", "amount": 1000 }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counterparty name used for UBI claims.
pub const CLAIM_SOURCE: &str = "GoodDollar";

/// Kind of blockchain-affecting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxEventType {
    /// Daily UBI claim
    Claim,
    /// Outgoing transfer
    Send,
    /// Incoming transfer
    Receive,
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TxEventData {
    /// Counterparty (sender for claims and receives)
    pub from: String,
    /// Amount in the token's smallest unit
    pub amount: u64,
}

/// Record of one blockchain-affecting action. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    /// Transaction hash
    pub id: String,
    /// When the event was produced
    pub created_date: DateTime<Utc>,
    /// Event kind
    #[serde(rename = "type")]
    pub event_type: TxEventType,
    /// Amount and counterparty
    pub data: TxEventData,
}

impl TransactionEvent {
    /// Event for a successful claim of `amount`.
    pub fn claim(tx_hash: impl Into<String>, amount: u64, created_date: DateTime<Utc>) -> Self {
        Self {
            id: tx_hash.into(),
            created_date,
            event_type: TxEventType::Claim,
            data: TxEventData {
                from: CLAIM_SOURCE.to_string(),
                amount,
            },
        }
    }
}

/// Display state of a queued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Enqueued, not yet shown to the user
    Pending,
    /// Surfaced to the user
    Visible,
}

impl QueueStatus {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            QueueStatus::Pending => 0,
            QueueStatus::Visible => 1,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            QueueStatus::Pending
        } else {
            QueueStatus::Visible
        }
    }
}

/// An event together with its display state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueuedEvent {
    pub event: TransactionEvent,
    pub status: QueueStatus,
}
