// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key material and the seal/unseal primitives of the graph store contract.
//!
//! - [`KeyPair`]: the local secp256k1 identity.
//! - Sealing: ECIES-style, ECDH with an ephemeral key, HKDF-SHA256, AES-256-GCM.
//! - [`Secret`]: per-path symmetric key recovered from a trust certificate.
//!
//! ## Value Formats
//!
//! ```text
//! sealed certificate:  "seal1:" + b64url(ephemeral_pub[33] | nonce[12] | ciphertext+tag)
//! encrypted node:      "aead1:" + b64url(nonce[12] | ciphertext+tag)
//! ```

pub mod keys;
pub mod seal;

pub use keys::{decode_public_key, encode_public_key, KeyPair};
pub use seal::{seal, unseal, Secret, NODE_PREFIX, SEAL_PREFIX};

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed")]
    Encryption,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure to decrypt a node with a recovered secret.
///
/// Distinct from "no secret available", which is not an error.
#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("value is not an encrypted node: {0}")]
    Malformed(String),

    #[error("authentication failed (wrong secret or corrupted ciphertext)")]
    Authentication,

    #[error("decrypted payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}
