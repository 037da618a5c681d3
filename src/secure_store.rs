// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secure graph store: ack-based writes and certificate-based decrypting reads
//! over an injected replicated store handle.
//!
//! `put_secure` writes the value it is given; encrypting before the write is
//! the job of certificate issuance (`issue_certificate` / `secret_ack`).

use std::sync::Arc;

use k256::PublicKey;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::crypto::{self, CryptoError, KeyPair, Secret};
use crate::graph::{Ack, AckChannel, GraphPath, GraphResult, GraphStore};
use crate::trust::{certificate_path, TrustResolver};

pub struct SecureGraphStore<S: ?Sized> {
    channel: AckChannel<S>,
    resolver: TrustResolver<S>,
    pair: Arc<KeyPair>,
}

impl<S: ?Sized> Clone for SecureGraphStore<S> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            resolver: self.resolver.clone(),
            pair: Arc::clone(&self.pair),
        }
    }
}

impl<S: GraphStore + ?Sized> SecureGraphStore<S> {
    pub fn new(store: Arc<S>, pair: Arc<KeyPair>) -> Self {
        Self {
            channel: AckChannel::new(Arc::clone(&store)),
            resolver: TrustResolver::new(store, Arc::clone(&pair)),
            pair,
        }
    }

    /// Public key text of the identity this store reads and writes as.
    pub fn public_text(&self) -> &str {
        self.pair.public_text()
    }

    /// Write `value` at `path` and wait for the store's acknowledgement.
    pub async fn put_secure(&self, path: &GraphPath, value: Value) -> GraphResult<Ack> {
        Ok(self.channel.put(path, value).await?)
    }

    /// Read `path`, decrypting it when a trust certificate for it exists.
    pub async fn get_secure(&self, path: &GraphPath) -> GraphResult<Option<Value>> {
        self.resolver.decrypt(path).await
    }

    /// Like [`get_secure`](Self::get_secure), passing the result through `transform`.
    pub async fn get_secure_with<T, F>(&self, path: &GraphPath, transform: F) -> GraphResult<T>
    where
        F: FnOnce(Option<Value>) -> T,
    {
        self.resolver.decrypt_with(path, transform).await
    }

    pub fn secret_seal(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<String, CryptoError> {
        crypto::seal(plaintext, recipient)
    }

    /// Open a sealed value with the local key pair; `None` if it is not ours.
    pub fn secret_unseal(&self, sealed: &str) -> Option<Zeroizing<Vec<u8>>> {
        crypto::unseal(sealed, &self.pair)
    }

    /// Create a fresh secret for `path` and file a certificate for `recipient`
    /// under the local identity's trust graph.
    pub async fn issue_certificate(
        &self,
        path: &GraphPath,
        recipient: &PublicKey,
    ) -> GraphResult<Secret> {
        let secret = Secret::generate();
        let recipient_text = crypto::encode_public_key(recipient);
        let cert_path = certificate_path(self.pair.public_text(), &recipient_text, &path.ancestors())?;

        let sealed = secret.seal_for(recipient)?;
        self.channel.put(&cert_path, Value::String(sealed)).await?;
        tracing::debug!(path = %path, "Issued trust certificate");
        Ok(secret)
    }

    /// Encrypt `value` under a new certificate for the local identity and write it.
    pub async fn secret_ack(&self, path: &GraphPath, value: &Value) -> GraphResult<Ack> {
        let secret = self.issue_certificate(path, self.pair.public_key()).await?;
        let node = secret.encrypt(value)?;
        self.put_secure(path, node).await
    }
}
