// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process graph store.
//!
//! Implements the [`GraphStore`] contract over a map keyed by rendered path.
//! Writes can be made to fail or to never acknowledge, for exercising the
//! failure paths of the ack channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::{Ack, Callback, GraphPath, GraphStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum WriteMode {
    #[default]
    Accept,
    Reject(String),
    Swallow,
}

#[derive(Default)]
pub struct InMemoryGraph {
    nodes: Mutex<HashMap<String, Value>>,
    mode: Mutex<WriteMode>,
    puts: AtomicUsize,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent write with `err` in its acknowledgement.
    pub fn reject_writes(&self, err: impl Into<String>) {
        self.set_mode(WriteMode::Reject(err.into()));
    }

    /// Drop every subsequent write callback without invoking it.
    pub fn swallow_acks(&self) {
        self.set_mode(WriteMode::Swallow);
    }

    pub fn accept_writes(&self) {
        self.set_mode(WriteMode::Accept);
    }

    /// Number of `put` calls received, including rejected ones.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Peek at a stored value without going through the callback contract.
    pub fn raw(&self, path: &GraphPath) -> Option<Value> {
        let nodes = self.nodes.lock().ok()?;
        nodes.get(&path.to_string()).cloned()
    }

    /// Place a value directly, as if replicated from another device.
    pub fn insert_raw(&self, path: &GraphPath, value: Value) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.insert(path.to_string(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().map(|nodes| nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_mode(&self, mode: WriteMode) {
        if let Ok(mut current) = self.mode.lock() {
            *current = mode;
        }
    }

    fn mode(&self) -> WriteMode {
        self.mode
            .lock()
            .map(|mode| mode.clone())
            .unwrap_or_default()
    }
}

impl GraphStore for InMemoryGraph {
    fn put(&self, path: &GraphPath, value: Value, ack: Callback<Ack>) {
        self.puts.fetch_add(1, Ordering::SeqCst);

        let outcome = match self.mode() {
            WriteMode::Swallow => return,
            WriteMode::Reject(err) => Ack::err(err),
            WriteMode::Accept => match self.nodes.lock() {
                Ok(mut nodes) => {
                    nodes.insert(path.to_string(), value);
                    Ack::ok()
                }
                Err(_) => Ack::err("graph store lock poisoned"),
            },
        };

        // Lock released before the callback runs.
        ack(outcome);
    }

    fn get(&self, path: &GraphPath, reply: Callback<Option<Value>>) {
        let value = self.raw(path);
        reply(value);
    }
}
