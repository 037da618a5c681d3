// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Graph Sync - Encrypted graph synchronization core for a wallet client
//!
//! Wraps an ack-based replicated graph store in request/response semantics,
//! resolves per-path secrets through sealed trust certificates, and mirrors
//! verified wallet transactions into a durable local queue.
//!
//! ## Modules
//!
//! - `graph` - Paths, the store contract and the ack channel
//! - `crypto` - Key pairs, sealing, node encryption
//! - `trust` - Certificate-based decrypt protocol
//! - `secure_store` - Secure reads and writes over an injected store
//! - `storage` - Durable transaction event queue (redb)
//! - `wallet` - Wallet collaborator and claim flow
//! - `session` - Identity lifecycle
//! - `api` - Local feed service (Axum)

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod graph;
pub mod secure_store;
pub mod session;
pub mod state;
pub mod storage;
pub mod trust;
pub mod wallet;
