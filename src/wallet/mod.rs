// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet collaborator and the daily claim flow.
//!
//! Transaction construction and signing belong to the wallet; this module
//! only consumes its receipts and mirrors successful claims into the local
//! [`TransactionQueue`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::storage::{QueueError, TransactionEvent, TransactionQueue};

/// Outcome of a submitted transaction as reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// `true` when the transaction executed successfully
    pub status: bool,
    pub transaction_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet RPC error: {0}")]
    Rpc(String),

    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

/// Blockchain wallet capability.
pub trait Wallet: Send + Sync {
    /// Submit the daily UBI claim.
    fn claim(&self) -> impl Future<Output = Result<Receipt, WalletError>> + Send;

    /// Whether the account is a verified citizen.
    fn is_citizen(&self) -> impl Future<Output = Result<bool, WalletError>> + Send;

    /// Amount currently claimable, in the token's smallest unit.
    fn check_entitlement(&self) -> impl Future<Output = Result<u64, WalletError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Account must be verified before claiming.
    NotCitizen,
    /// Entitlement is zero.
    NothingToClaim,
    /// The wallet returned a failed receipt. Nothing was queued.
    Failed { tx_hash: String },
    /// Claim succeeded and its event is in the queue.
    Claimed {
        event: TransactionEvent,
        /// `false` when the same receipt had already been queued
        newly_enqueued: bool,
    },
}

/// Runs a claim against `W` and records the result.
pub struct ClaimFlow<W> {
    wallet: W,
    queue: Arc<TransactionQueue>,
}

impl<W: Wallet> ClaimFlow<W> {
    pub fn new(wallet: W, queue: Arc<TransactionQueue>) -> Self {
        Self { wallet, queue }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub async fn claim(&self) -> Result<ClaimOutcome, ClaimError> {
        if !self.wallet.is_citizen().await? {
            tracing::info!("Claim requested by unverified account");
            return Ok(ClaimOutcome::NotCitizen);
        }

        let entitlement = self.wallet.check_entitlement().await?;
        if entitlement == 0 {
            tracing::debug!("No entitlement to claim");
            return Ok(ClaimOutcome::NothingToClaim);
        }

        let receipt = self.wallet.claim().await?;
        if !receipt.status {
            tracing::error!(
                tx_id = %receipt.transaction_hash,
                entitlement,
                "Claim transaction failed"
            );
            return Ok(ClaimOutcome::Failed {
                tx_hash: receipt.transaction_hash,
            });
        }

        let event = TransactionEvent::claim(receipt.transaction_hash, entitlement, Utc::now());
        let newly_enqueued = self.queue.enqueue(&event)?;
        tracing::info!(tx_id = %event.id, amount = entitlement, "Claim succeeded");

        Ok(ClaimOutcome::Claimed {
            event,
            newly_enqueued,
        })
    }
}
