// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request/response wrapper over the store's one-shot callbacks.
//!
//! Each call issues exactly one underlying operation and suspends until its
//! callback fires. A write whose [`Ack`] carries a non-empty `err` resolves to
//! [`AckError::Rejected`]. Nothing here retries.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

use super::{Ack, Callback, GraphPath, GraphStore};

#[derive(Debug, Clone, thiserror::Error)]
pub enum AckError {
    /// The store reported a failure for the write.
    #[error("write rejected: {err}")]
    Rejected { err: String, ack: Ack },

    /// The store released the callback without invoking it.
    #[error("store dropped the completion callback")]
    Dropped,
}

/// Convert a single-shot callback operation into a future.
pub async fn once<T, F>(operation: F) -> Result<T, AckError>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>),
{
    let (tx, rx) = oneshot::channel();
    operation(Box::new(move |value: T| {
        // Receiver gone means the caller stopped waiting; nothing to do.
        let _ = tx.send(value);
    }));
    rx.await.map_err(|_| AckError::Dropped)
}

/// Run a write and resolve on its acknowledgement.
pub async fn perform<F>(operation: F) -> Result<Ack, AckError>
where
    F: FnOnce(Callback<Ack>),
{
    let ack = once(operation).await?;
    if ack.is_err() {
        let err = ack.err.clone().unwrap_or_default();
        return Err(AckError::Rejected { err, ack });
    }
    Ok(ack)
}

/// Store handle exposing `put`/`get` as `async` operations.
pub struct AckChannel<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for AckChannel<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: GraphStore + ?Sized> AckChannel<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn put(&self, path: &GraphPath, value: Value) -> Result<Ack, AckError> {
        let result = perform(|ack| self.store.put(path, value, ack)).await;
        if let Err(e) = &result {
            tracing::warn!(path = %path, error = %e, "Graph write failed");
        }
        result
    }

    pub async fn get(&self, path: &GraphPath) -> Result<Option<Value>, AckError> {
        once(|reply| self.store.get(path, reply)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InMemoryGraph;

    #[tokio::test]
    async fn perform_resolves_on_success() {
        let ack = perform(|cb| cb(Ack::ok())).await.unwrap();
        assert!(!ack.is_err());
    }

    #[tokio::test]
    async fn perform_rejects_with_error_payload() {
        let result = perform(|cb| cb(Ack::err("quota exceeded"))).await;
        match result {
            Err(AckError::Rejected { err, ack }) => {
                assert_eq!(err, "quota exceeded");
                assert_eq!(ack.err.as_deref(), Some("quota exceeded"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_callback_is_reported() {
        let result = perform(|cb| drop(cb)).await;
        assert!(matches!(result, Err(AckError::Dropped)));
    }

    #[tokio::test]
    async fn callback_from_another_task_resumes_caller() {
        let ack = perform(|cb| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                cb(Ack::ok());
            });
        })
        .await
        .unwrap();
        assert_eq!(ack, Ack::ok());
    }

    #[tokio::test]
    async fn channel_put_then_get() {
        let store = Arc::new(InMemoryGraph::new());
        let channel = AckChannel::new(store);
        let path = GraphPath::parse("~alice/profile/name").unwrap();

        channel.put(&path, Value::from("Alice")).await.unwrap();
        let value = channel.get(&path).await.unwrap();
        assert_eq!(value, Some(Value::from("Alice")));

        let missing = GraphPath::parse("~alice/profile/phone").unwrap();
        assert_eq!(channel.get(&missing).await.unwrap(), None);
    }
}
