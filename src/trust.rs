// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Trust Resolver
//!
//! Resolves the secret protecting a path through a sealed trust certificate
//! and decrypts the node with it.
//!
//! ## Protocol
//!
//! 1. Compute the target's [`AncestorChain`] and its normalized path.
//! 2. Read the certificate at `~{local}/trust/{local}/{normalized}`.
//! 3. Unseal it with the local key pair. Absent or unopenable certificates
//!    mean *no secret available*, which is not an error.
//! 4. No secret: hand back the raw value at the target.
//! 5. Secret: decrypt the target value with it. Failure here is an error.
//!
//! Recovered secrets are dropped (and wiped) at the end of each call.

use std::sync::Arc;

use serde_json::Value;

use crate::crypto::{KeyPair, Secret};
use crate::graph::{AckChannel, AncestorChain, GraphPath, GraphResult, GraphStore};

/// Key under an identity root holding its trust certificates.
pub const TRUST_KEY: &str = "trust";

/// Location of the certificate for `chain`, addressed to `recipient_text`,
/// inside the sub-graph of `owner_text`.
pub fn certificate_path(
    owner_text: &str,
    recipient_text: &str,
    chain: &AncestorChain,
) -> GraphResult<GraphPath> {
    Ok(GraphPath::user(owner_text)?
        .child(TRUST_KEY)?
        .child(recipient_text)?
        .child(chain.normalized())?)
}

pub struct TrustResolver<S: ?Sized> {
    channel: AckChannel<S>,
    pair: Arc<KeyPair>,
}

impl<S: ?Sized> Clone for TrustResolver<S> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            pair: Arc::clone(&self.pair),
        }
    }
}

impl<S: GraphStore + ?Sized> TrustResolver<S> {
    pub fn new(store: Arc<S>, pair: Arc<KeyPair>) -> Self {
        Self {
            channel: AckChannel::new(store),
            pair,
        }
    }

    /// Where the local identity's certificate for `target` lives.
    pub fn local_certificate_path(&self, target: &GraphPath) -> GraphResult<GraphPath> {
        let chain = target.ancestors();
        if chain.identity_root().is_none() {
            tracing::debug!(path = %target, "Path has no identity root, using empty trust path");
        }
        let me = self.pair.public_text();
        certificate_path(me, me, &chain)
    }

    /// Try to recover the secret for `target`. `None` means no secret available.
    pub async fn resolve_secret(&self, target: &GraphPath) -> GraphResult<Option<Secret>> {
        let cert_path = self.local_certificate_path(target)?;
        let certificate = match self.channel.get(&cert_path).await? {
            Some(value) => value,
            None => {
                tracing::debug!(path = %target, "No trust certificate");
                return Ok(None);
            }
        };

        let secret = Secret::unseal_from(&certificate, &self.pair);
        if secret.is_none() {
            tracing::debug!(path = %target, "Trust certificate not sealed for local identity");
        }
        Ok(secret)
    }

    /// Run the decrypt protocol for `target`.
    pub async fn decrypt(&self, target: &GraphPath) -> GraphResult<Option<Value>> {
        self.decrypt_with(target, |value| value).await
    }

    /// Run the decrypt protocol and pass the resolved value through `transform`.
    pub async fn decrypt_with<T, F>(&self, target: &GraphPath, transform: F) -> GraphResult<T>
    where
        F: FnOnce(Option<Value>) -> T,
    {
        let secret = self.resolve_secret(target).await?;
        let raw = self.channel.get(target).await?;

        let Some(secret) = secret else {
            return Ok(transform(raw));
        };

        let plaintext = match raw {
            Some(node) => Some(secret.decrypt(&node).inspect_err(|e| {
                tracing::warn!(path = %target, error = %e, "Failed to decrypt node");
            })?),
            None => None,
        };
        Ok(transform(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DecryptError;
    use crate::graph::{GraphError, InMemoryGraph};
    use serde_json::json;

    struct Fixture {
        graph: Arc<InMemoryGraph>,
        pair: Arc<KeyPair>,
        resolver: TrustResolver<InMemoryGraph>,
    }

    fn fixture() -> Fixture {
        let graph = Arc::new(InMemoryGraph::new());
        let pair = Arc::new(KeyPair::generate());
        let resolver = TrustResolver::new(Arc::clone(&graph), Arc::clone(&pair));
        Fixture {
            graph,
            pair,
            resolver,
        }
    }

    fn profile_path(pair: &KeyPair, key: &str) -> GraphPath {
        GraphPath::user(pair.public_text())
            .unwrap()
            .child("profile")
            .unwrap()
            .child(key)
            .unwrap()
    }

    #[test]
    fn certificate_lives_under_local_trust() {
        let f = fixture();
        let target = profile_path(&f.pair, "email");
        let cert = f.resolver.local_certificate_path(&target).unwrap();
        let me = f.pair.public_text();
        assert_eq!(cert.to_string(), format!("~{me}/trust/{me}/emailprofile"));
    }

    #[test]
    fn rootless_path_uses_empty_trust_key() {
        let f = fixture();
        let target = GraphPath::parse("public/notice").unwrap();
        let cert = f.resolver.local_certificate_path(&target).unwrap();
        let me = f.pair.public_text();
        assert_eq!(cert.to_string(), format!("~{me}/trust/{me}/"));
    }

    #[tokio::test]
    async fn no_certificate_returns_raw_value() {
        let f = fixture();
        let target = profile_path(&f.pair, "name");
        f.graph.insert_raw(&target, json!("Dana"));

        assert!(f.resolver.resolve_secret(&target).await.unwrap().is_none());
        assert_eq!(f.resolver.decrypt(&target).await.unwrap(), Some(json!("Dana")));
    }

    #[tokio::test]
    async fn certificate_secret_decrypts_node() {
        let f = fixture();
        let target = profile_path(&f.pair, "email");
        let secret = Secret::generate();

        let cert_path = f.resolver.local_certificate_path(&target).unwrap();
        f.graph
            .insert_raw(&cert_path, json!(secret.seal_for(f.pair.public_key()).unwrap()));
        f.graph
            .insert_raw(&target, secret.encrypt(&json!("dana@example.org")).unwrap());

        let value = f.resolver.decrypt(&target).await.unwrap();
        assert_eq!(value, Some(json!("dana@example.org")));
    }

    #[tokio::test]
    async fn certificate_for_other_key_is_no_secret() {
        let f = fixture();
        let other = KeyPair::generate();
        let target = profile_path(&f.pair, "email");
        let secret = Secret::generate();

        // Sealed for someone else but filed under the local identity's trust path.
        let cert_path = f.resolver.local_certificate_path(&target).unwrap();
        f.graph
            .insert_raw(&cert_path, json!(secret.seal_for(other.public_key()).unwrap()));
        let ciphertext = secret.encrypt(&json!("hidden")).unwrap();
        f.graph.insert_raw(&target, ciphertext.clone());

        assert!(f.resolver.resolve_secret(&target).await.unwrap().is_none());
        assert_eq!(f.resolver.decrypt(&target).await.unwrap(), Some(ciphertext));
    }

    #[tokio::test]
    async fn corrupt_ciphertext_is_decrypt_failure() {
        let f = fixture();
        let target = profile_path(&f.pair, "email");
        let secret = Secret::generate();

        let cert_path = f.resolver.local_certificate_path(&target).unwrap();
        f.graph
            .insert_raw(&cert_path, json!(secret.seal_for(f.pair.public_key()).unwrap()));
        let wrong = Secret::generate().encrypt(&json!("x")).unwrap();
        f.graph.insert_raw(&target, wrong);

        let result = f.resolver.decrypt(&target).await;
        assert!(matches!(
            result,
            Err(GraphError::Decrypt(DecryptError::Authentication))
        ));
    }

    #[tokio::test]
    async fn transform_applies_to_fallback_and_plaintext() {
        let f = fixture();
        let target = profile_path(&f.pair, "age");
        f.graph.insert_raw(&target, json!(41));

        let doubled = f
            .resolver
            .decrypt_with(&target, |v| v.and_then(|v| v.as_i64()).map(|n| n * 2))
            .await
            .unwrap();
        assert_eq!(doubled, Some(82));

        let missing = profile_path(&f.pair, "phone");
        let present = f
            .resolver
            .decrypt_with(&missing, |v| v.is_some())
            .await
            .unwrap();
        assert!(!present);
    }
}
