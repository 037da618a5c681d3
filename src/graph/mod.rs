// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Replicated Graph Store Contract
//!
//! The replicated graph store is an external collaborator: it replicates and
//! merges writes across devices on its own. This module only describes the
//! slice of it the sync core consumes, and converts its callback style into
//! `async` results.
//!
//! ## Contract
//!
//! | Operation | Completion |
//! |-----------|------------|
//! | `put(path, value, ack)` | `ack` invoked once with an [`Ack`] (`err` set on failure) |
//! | `get(path, reply)` | `reply` invoked once with the value, or `None` when absent |
//!
//! Reads may be stale relative to in-flight writes from other clients.

pub mod ack;
pub mod memory;
pub mod path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{CryptoError, DecryptError};

pub use ack::{AckChannel, AckError};
pub use memory::InMemoryGraph;
pub use path::{AncestorChain, GraphPath, PathError, PathSegment};

/// Single-shot completion callback handed to the store.
pub type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Acknowledgement record returned by the store for a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// Error marker; a non-empty value means the write was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    /// Optional payload attached to a successful acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<Value>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            err: None,
            ok: Some(Value::from(1)),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            err: Some(message.into()),
            ok: None,
        }
    }

    /// True when the `err` field is present and non-empty.
    pub fn is_err(&self) -> bool {
        self.err.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Callback-based point reads and writes of the replicated store.
pub trait GraphStore: Send + Sync + 'static {
    /// Write `value` at `path`; `ack` fires once when the write settles.
    fn put(&self, path: &GraphPath, value: Value, ack: Callback<Ack>);

    /// Read the value at `path`; `reply` fires once with the value or `None`.
    fn get(&self, path: &GraphPath, reply: Callback<Option<Value>>);
}

/// Errors surfaced by the secure graph layer.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error(transparent)]
    Ack(#[from] AckError),

    #[error("decryption failed: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type GraphResult<T> = Result<T, GraphError>;
