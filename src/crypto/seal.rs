// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sealing of small secrets to a recipient key, and bulk node encryption.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64ct::{Base64UrlUnpadded, Encoding};
use hkdf::Hkdf;
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use serde_json::Value;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{CryptoError, DecryptError, KeyPair};

/// Prefix of a sealed trust certificate value.
pub const SEAL_PREFIX: &str = "seal1:";

/// Prefix of an encrypted node value.
pub const NODE_PREFIX: &str = "aead1:";

/// HKDF info string binding derived keys to certificate sealing.
const SEAL_INFO: &[u8] = b"graph-sync/seal/v1";

const NONCE_LEN: usize = 12;
const COMPRESSED_POINT_LEN: usize = 33;
const SECRET_LEN: usize = 32;

fn cipher_for(key: &[u8; 32]) -> Aes256Gcm {
    Aes256Gcm::new(&Key::<Aes256Gcm>::from(*key))
}

fn derive_seal_key(shared: &[u8], ephemeral_pub: &[u8]) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_pub), shared);
    let mut key = Zeroizing::new([0u8; 32]);
    hkdf.expand(SEAL_INFO, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Seal `plaintext` so only the holder of `recipient`'s private key can open it.
pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<String, CryptoError> {
    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let ephemeral_pub = ephemeral.public_key().to_encoded_point(true);
    let shared = ephemeral.diffie_hellman(recipient);
    let key = derive_seal_key(shared.raw_secret_bytes(), ephemeral_pub.as_bytes())?;

    let cipher = cipher_for(&key);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    let mut out = Vec::with_capacity(COMPRESSED_POINT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral_pub.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(format!("{SEAL_PREFIX}{}", Base64UrlUnpadded::encode_string(&out)))
}

/// Open a sealed value with the local key pair.
///
/// Every failure (wrong recipient, malformed value, tampering) yields `None`:
/// callers treat it as "no secret available".
pub fn unseal(sealed: &str, pair: &KeyPair) -> Option<Zeroizing<Vec<u8>>> {
    let body = sealed.strip_prefix(SEAL_PREFIX)?;
    let bytes = Base64UrlUnpadded::decode_vec(body).ok()?;
    if bytes.len() <= COMPRESSED_POINT_LEN + NONCE_LEN {
        return None;
    }

    let (ephemeral_bytes, rest) = bytes.split_at(COMPRESSED_POINT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce.try_into().ok()?;
    let ephemeral_pub = PublicKey::from_sec1_bytes(ephemeral_bytes).ok()?;

    let shared = diffie_hellman(
        pair.secret_key().to_nonzero_scalar(),
        ephemeral_pub.as_affine(),
    );
    let key = derive_seal_key(shared.raw_secret_bytes(), ephemeral_bytes).ok()?;

    cipher_for(&key)
        .decrypt(&Nonce::from(nonce), ciphertext)
        .ok()
        .map(Zeroizing::new)
}

/// Symmetric key protecting the data at one path.
///
/// Lives only for the duration of an operation and is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    key: [u8; SECRET_LEN],
}

impl Secret {
    pub fn generate() -> Self {
        let generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut key = [0u8; SECRET_LEN];
        key.copy_from_slice(&generated);
        Self { key }
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SECRET_LEN {
            return None;
        }
        let mut key = [0u8; SECRET_LEN];
        key.copy_from_slice(bytes);
        Some(Self { key })
    }

    /// Seal this secret for `recipient`, producing a certificate value.
    pub fn seal_for(&self, recipient: &PublicKey) -> Result<String, CryptoError> {
        seal(&self.key, recipient)
    }

    /// Recover a secret from a certificate value, if it was sealed to `pair`.
    pub fn unseal_from(certificate: &Value, pair: &KeyPair) -> Option<Self> {
        let sealed = certificate.as_str()?;
        let bytes = unseal(sealed, pair)?;
        Self::from_slice(&bytes)
    }

    /// Encrypt a JSON value into an encrypted node value.
    pub fn encrypt(&self, value: &Value) -> Result<Value, CryptoError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(value)?);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher_for(&self.key)
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| CryptoError::Encryption)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(Value::String(format!(
            "{NODE_PREFIX}{}",
            Base64UrlUnpadded::encode_string(&out)
        )))
    }

    /// Decrypt an encrypted node value back into JSON.
    pub fn decrypt(&self, node: &Value) -> Result<Value, DecryptError> {
        let text = node
            .as_str()
            .ok_or_else(|| DecryptError::Malformed("expected a string value".to_string()))?;
        let body = text
            .strip_prefix(NODE_PREFIX)
            .ok_or_else(|| DecryptError::Malformed("missing node prefix".to_string()))?;
        let bytes = Base64UrlUnpadded::decode_vec(body)
            .map_err(|e| DecryptError::Malformed(format!("invalid base64: {e}")))?;
        if bytes.len() <= NONCE_LEN {
            return Err(DecryptError::Malformed("ciphertext too short".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| DecryptError::Malformed("invalid nonce".to_string()))?;
        let plaintext = cipher_for(&self.key)
            .decrypt(&Nonce::from(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| DecryptError::Authentication)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seal_opens_only_for_recipient() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let sealed = seal(b"per-path key", alice.public_key()).unwrap();
        assert!(sealed.starts_with(SEAL_PREFIX));

        let opened = unseal(&sealed, &alice).unwrap();
        assert_eq!(opened.as_slice(), b"per-path key");
        assert!(unseal(&sealed, &bob).is_none());
    }

    #[test]
    fn tampered_seal_is_rejected() {
        let alice = KeyPair::generate();
        let sealed = seal(b"payload", alice.public_key()).unwrap();

        let mut bytes = Base64UrlUnpadded::decode_vec(&sealed[SEAL_PREFIX.len()..]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = format!("{SEAL_PREFIX}{}", Base64UrlUnpadded::encode_string(&bytes));

        assert!(unseal(&tampered, &alice).is_none());
        assert!(unseal("plain text", &alice).is_none());
        assert!(unseal("seal1:AAAA", &alice).is_none());
    }

    #[test]
    fn secret_certificate_round_trip() {
        let alice = KeyPair::generate();
        let secret = Secret::generate();
        let certificate = Value::String(secret.seal_for(alice.public_key()).unwrap());

        let recovered = Secret::unseal_from(&certificate, &alice).unwrap();
        let node = secret.encrypt(&json!({"email": "a@example.org"})).unwrap();
        assert_eq!(
            recovered.decrypt(&node).unwrap(),
            json!({"email": "a@example.org"})
        );
    }

    #[test]
    fn encrypted_node_layout() {
        let value = json!({"n": 1});
        let node = Secret::generate().encrypt(&value).unwrap();
        let body = node.as_str().unwrap().strip_prefix(NODE_PREFIX).unwrap();
        let bytes = Base64UrlUnpadded::decode_vec(body).unwrap();

        let plaintext_len = serde_json::to_vec(&value).unwrap().len();
        assert_eq!(bytes.len(), NONCE_LEN + plaintext_len + 16);
    }

    #[test]
    fn decrypt_with_other_secret_fails_authentication() {
        let node = Secret::generate().encrypt(&json!("hello")).unwrap();
        let result = Secret::generate().decrypt(&node);
        assert!(matches!(result, Err(DecryptError::Authentication)));
    }

    #[test]
    fn decrypt_plain_value_is_malformed() {
        let secret = Secret::generate();
        assert!(matches!(
            secret.decrypt(&json!("just text")),
            Err(DecryptError::Malformed(_))
        ));
        assert!(matches!(
            secret.decrypt(&json!({"a": 1})),
            Err(DecryptError::Malformed(_))
        ));
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", Secret::generate()), "Secret(<redacted>)");
    }
}
