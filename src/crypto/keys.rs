// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local identity key pair.
//!
//! The private key never leaves this type: there is no `Serialize` impl and
//! `Debug` redacts it. `k256::SecretKey` zeroizes itself on drop.

use std::fmt;

use aes_gcm::aead::OsRng;
use base64ct::{Base64UrlUnpadded, Encoding};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};

use super::CryptoError;

/// Render a public key as base64url (no padding) of its compressed SEC1 point.
///
/// The alphabet never contains `/`, so the text is usable as a path key.
pub fn encode_public_key(key: &PublicKey) -> String {
    Base64UrlUnpadded::encode_string(key.to_encoded_point(true).as_bytes())
}

/// Parse the text form produced by [`encode_public_key`].
pub fn decode_public_key(text: &str) -> Result<PublicKey, CryptoError> {
    let bytes = Base64UrlUnpadded::decode_vec(text)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("Invalid base64: {e}")))?;
    PublicKey::from_sec1_bytes(&bytes)
        .map_err(|e| CryptoError::InvalidPublicKey(format!("Invalid SEC1 point: {e}")))
}

/// Local identity: secp256k1 secret key and its public key.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
    public_text: String,
}

impl KeyPair {
    /// Generate a fresh identity from the OS RNG.
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::random(&mut OsRng))
    }

    /// Restore an identity from its 32 raw private key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        let public_text = encode_public_key(&public);
        Self {
            secret,
            public,
            public_text,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Text form of the public key, as used in graph paths.
    pub fn public_text(&self) -> &str {
        &self.public_text
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_text)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_text_round_trips() {
        let pair = KeyPair::generate();
        let decoded = decode_public_key(pair.public_text()).unwrap();
        assert_eq!(&decoded, pair.public_key());
        assert!(!pair.public_text().contains('/'));
    }

    #[test]
    fn restore_from_secret_bytes_is_deterministic() {
        let bytes = [7u8; 32];
        let a = KeyPair::from_secret_bytes(&bytes).unwrap();
        let b = KeyPair::from_secret_bytes(&bytes).unwrap();
        assert_eq!(a.public_text(), b.public_text());
    }

    #[test]
    fn zero_secret_is_rejected() {
        let result = KeyPair::from_secret_bytes(&[0u8; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidPrivateKey(_))));
    }

    #[test]
    fn debug_redacts_private_key() {
        let pair = KeyPair::from_secret_bytes(&[9u8; 32]).unwrap();
        let rendered = format!("{pair:?}");
        assert!(rendered.contains("<redacted>"));
        let secret_b64 = Base64UrlUnpadded::encode_string(&pair.secret_key().to_bytes());
        assert!(!rendered.contains(&secret_b64));
    }

    #[test]
    fn garbage_public_key_is_rejected() {
        assert!(decode_public_key("not-a-key").is_err());
        assert!(decode_public_key("%%%").is_err());
    }
}
