//! Deterministic crypto provider for testing
//!
//! NOT SECURE - the "public key" is the shared secret, so anyone holding it
//! can decrypt and sign. Enables fast, reproducible tests of graph and
//! protocol logic without elliptic-curve overhead.
//!
//! - keys: 32 bytes derived from a per-provider counter (public == private)
//! - encrypt: \[keyed Blake3 tag (32)\]\[plaintext XOR Blake3 keystream\]
//! - sign: keyed Blake3 hash of the digest

use super::hash::{hash_bytes, Digest};
use super::keys::{KeyMaterial, PrivateKey, PublicKey};
use super::signing::Signature;
use super::CryptoProvider;
use crate::error::{CryptoError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

const KEY_LEN: usize = 32;
const TAG_LEN: usize = 32;

/// Mock provider (TESTING ONLY)
#[derive(Debug)]
pub struct MockProvider {
    counter: AtomicU64,
    max_plaintext_size: usize,
}

impl MockProvider {
    /// Create a provider with no plaintext size limit
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            max_plaintext_size: usize::MAX,
        }
    }

    /// Limit the plaintext size this provider accepts
    pub fn with_max_plaintext_size(mut self, max: usize) -> Self {
        self.max_plaintext_size = max;
        self
    }

    fn key(bytes: &[u8]) -> Result<[u8; KEY_LEN]> {
        bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey {
                reason: format!("mock key must be {} bytes, got {}", KEY_LEN, bytes.len()),
            }
            .into()
        })
    }

    fn keystream(key: &[u8; KEY_LEN], data: &mut [u8]) {
        let mut stream = vec![0u8; data.len()];
        blake3::Hasher::new_keyed(key)
            .update(b"keystream")
            .finalize_xof()
            .fill(&mut stream);
        for (byte, k) in data.iter_mut().zip(stream) {
            *byte ^= k;
        }
    }

    fn tag(key: &[u8; KEY_LEN], body: &[u8]) -> blake3::Hash {
        blake3::keyed_hash(key, body)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock (TESTING ONLY)"
    }

    fn generate_key_pair(&self) -> KeyMaterial {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let seed = *blake3::hash(&n.to_le_bytes()).as_bytes();
        self.key_pair_from_seed(&seed)
    }

    fn key_pair_from_seed(&self, seed: &[u8; 32]) -> KeyMaterial {
        let key = blake3::derive_key("socialmesh mock key", seed);
        KeyMaterial::new(
            PublicKey::from_bytes(key.to_vec()),
            PrivateKey::from_bytes(key.to_vec()),
        )
    }

    fn encrypt(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>> {
        if plaintext.len() > self.max_plaintext_size {
            return Err(CryptoError::PayloadTooLarge {
                size: plaintext.len(),
                max: self.max_plaintext_size,
            }
            .into());
        }
        let key = Self::key(recipient.as_bytes())?;

        let mut body = plaintext.to_vec();
        Self::keystream(&key, &mut body);

        let mut out = Vec::with_capacity(TAG_LEN + body.len());
        out.extend_from_slice(Self::tag(&key, &body).as_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], owner: &PrivateKey) -> Result<Vec<u8>> {
        let key = Self::key(owner.expose_bytes())?;
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::DecryptionFailed {
                reason: "ciphertext too short".to_string(),
            }
            .into());
        }

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&ciphertext[..TAG_LEN]);
        let body = &ciphertext[TAG_LEN..];

        // blake3::Hash equality is constant-time
        if blake3::Hash::from(tag) != Self::tag(&key, body) {
            return Err(CryptoError::DecryptionFailed {
                reason: "tag mismatch (wrong key or corrupted ciphertext)".to_string(),
            }
            .into());
        }

        let mut plaintext = body.to_vec();
        Self::keystream(&key, &mut plaintext);
        Ok(plaintext)
    }

    fn digest(&self, data: &[u8]) -> Digest {
        hash_bytes(data)
    }

    fn sign(&self, digest: &Digest, key: &PrivateKey) -> Result<Signature> {
        let key = Self::key(key.expose_bytes())?;
        Ok(Signature::from_bytes(
            Self::tag(&key, digest.as_bytes()).as_bytes().to_vec(),
        ))
    }

    fn verify(&self, digest: &Digest, signature: &Signature, key: &PublicKey) -> bool {
        let Ok(key) = Self::key(key.as_bytes()) else {
            return false;
        };
        let Ok(sig) = <[u8; TAG_LEN]>::try_from(signature.as_bytes()) else {
            return false;
        };
        blake3::Hash::from(sig) == Self::tag(&key, digest.as_bytes())
    }

    fn max_plaintext_size(&self) -> usize {
        self.max_plaintext_size
    }
}
