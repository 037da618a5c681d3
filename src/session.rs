// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Logged-in session: the local identity and the handles built around it.

use std::sync::Arc;

use crate::crypto::KeyPair;
use crate::graph::GraphStore;
use crate::secure_store::SecureGraphStore;
use crate::storage::{QueueResult, TransactionQueue};
use crate::wallet::{ClaimFlow, Wallet};

/// Owns the key pair for the lifetime of a login.
///
/// Dropping the session (or calling [`logout`](Self::logout)) releases the
/// last owned handle to the key pair; the private scalar is wiped when every
/// clone handed out through [`secure_store`](Self::secure_store) is gone too.
pub struct Session<S: ?Sized> {
    pair: Arc<KeyPair>,
    secure: SecureGraphStore<S>,
    queue: Arc<TransactionQueue>,
}

impl<S: GraphStore + ?Sized> Session<S> {
    pub fn new(store: Arc<S>, pair: KeyPair, queue: Arc<TransactionQueue>) -> Self {
        let pair = Arc::new(pair);
        let secure = SecureGraphStore::new(store, Arc::clone(&pair));
        tracing::info!(identity = %pair.public_text(), "Session started");
        Self {
            pair,
            secure,
            queue,
        }
    }

    pub fn key_pair(&self) -> &Arc<KeyPair> {
        &self.pair
    }

    pub fn public_text(&self) -> &str {
        self.pair.public_text()
    }

    pub fn secure_store(&self) -> &SecureGraphStore<S> {
        &self.secure
    }

    pub fn queue(&self) -> &Arc<TransactionQueue> {
        &self.queue
    }

    /// Claim flow for `wallet`, feeding this session's queue.
    pub fn claim_flow<W: Wallet>(&self, wallet: W) -> ClaimFlow<W> {
        ClaimFlow::new(wallet, Arc::clone(&self.queue))
    }

    /// End the session. The local queue is kept.
    pub fn logout(self) {
        tracing::info!(identity = %self.pair.public_text(), "Session ended");
    }

    /// End the session and wipe the local transaction queue.
    pub fn delete_account(self) -> QueueResult<()> {
        self.queue.clear()?;
        tracing::info!(identity = %self.pair.public_text(), "Account deleted");
        Ok(())
    }
}
