//! Production crypto provider built on the dalek curves
//!
//! - Ed25519 signatures over Blake3 digests
//! - X25519 + ChaCha20-Poly1305 sealed-box encryption
//!
//! Key layout:
//! - public:  \[ed25519 verifying key (32)\]\[x25519 public key (32)\]
//! - private: \[ed25519 signing key (32)\]\[x25519 static secret (32)\]

use super::encryption::{open, seal};
use super::hash::{hash_bytes, Digest};
use super::keys::{KeyMaterial, PrivateKey, PublicKey};
use super::signing::{sign_digest, verify_digest, Signature};
use super::CryptoProvider;
use crate::error::{CryptoError, Result};
use chacha20poly1305::aead::OsRng;
use ed25519_dalek::{SigningKey, VerifyingKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
use zeroize::Zeroize;

const KEY_HALF_LEN: usize = 32;
const KEY_LEN: usize = 2 * KEY_HALF_LEN;

/// Ed25519 / X25519 / ChaCha20-Poly1305 / Blake3 provider
///
/// Sealed-box encryption has no intrinsic plaintext limit; the effective
/// limit comes from the codec configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DalekProvider;

impl DalekProvider {
    /// Create a new provider
    pub fn new() -> Self {
        Self
    }

    fn assemble(signing_key: SigningKey, encryption_secret: X25519StaticSecret) -> KeyMaterial {
        let mut public = Vec::with_capacity(KEY_LEN);
        public.extend_from_slice(signing_key.verifying_key().as_bytes());
        public.extend_from_slice(X25519PublicKey::from(&encryption_secret).as_bytes());

        let mut private = Vec::with_capacity(KEY_LEN);
        private.extend_from_slice(&signing_key.to_bytes());
        private.extend_from_slice(&encryption_secret.to_bytes());

        KeyMaterial::new(PublicKey::from_bytes(public), PrivateKey::from_bytes(private))
    }

    fn split(bytes: &[u8], what: &str) -> Result<([u8; 32], [u8; 32])> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey {
                reason: format!("{} must be {} bytes, got {}", what, KEY_LEN, bytes.len()),
            }
            .into());
        }
        let mut first = [0u8; KEY_HALF_LEN];
        let mut second = [0u8; KEY_HALF_LEN];
        first.copy_from_slice(&bytes[..KEY_HALF_LEN]);
        second.copy_from_slice(&bytes[KEY_HALF_LEN..]);
        Ok((first, second))
    }

    fn signing_key(private_key: &PrivateKey) -> Result<SigningKey> {
        let (mut signing, mut encryption) = Self::split(private_key.expose_bytes(), "private key")?;
        let key = SigningKey::from_bytes(&signing);
        signing.zeroize();
        encryption.zeroize();
        Ok(key)
    }

    fn encryption_secret(private_key: &PrivateKey) -> Result<X25519StaticSecret> {
        let (mut signing, encryption) = Self::split(private_key.expose_bytes(), "private key")?;
        signing.zeroize();
        Ok(X25519StaticSecret::from(encryption))
    }

    fn verifying_key(public_key: &PublicKey) -> Result<VerifyingKey> {
        let (signing, _) = Self::split(public_key.as_bytes(), "public key")?;
        VerifyingKey::from_bytes(&signing).map_err(|e| {
            CryptoError::InvalidKey {
                reason: format!("invalid Ed25519 point: {}", e),
            }
            .into()
        })
    }

    fn encryption_key(public_key: &PublicKey) -> Result<X25519PublicKey> {
        let (_, encryption) = Self::split(public_key.as_bytes(), "public key")?;
        Ok(X25519PublicKey::from(encryption))
    }
}

impl CryptoProvider for DalekProvider {
    fn name(&self) -> &'static str {
        "Ed25519/X25519/ChaCha20-Poly1305/Blake3"
    }

    fn generate_key_pair(&self) -> KeyMaterial {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let encryption_secret = X25519StaticSecret::random_from_rng(csprng);
        Self::assemble(signing_key, encryption_secret)
    }

    fn key_pair_from_seed(&self, seed: &[u8; 32]) -> KeyMaterial {
        // Separate derivation contexts so the two keys are independent
        let mut signing_seed = blake3::derive_key("socialmesh ed25519 signing key", seed);
        let mut encryption_seed = blake3::derive_key("socialmesh x25519 encryption key", seed);

        let keys = Self::assemble(
            SigningKey::from_bytes(&signing_seed),
            X25519StaticSecret::from(encryption_seed),
        );

        signing_seed.zeroize();
        encryption_seed.zeroize();
        keys
    }

    fn encrypt(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>> {
        let encryption_key = Self::encryption_key(recipient)?;
        seal(&encryption_key, plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8], owner: &PrivateKey) -> Result<Vec<u8>> {
        let secret = Self::encryption_secret(owner)?;
        open(&secret, ciphertext)
    }

    fn digest(&self, data: &[u8]) -> Digest {
        hash_bytes(data)
    }

    fn sign(&self, digest: &Digest, key: &PrivateKey) -> Result<Signature> {
        let signing_key = Self::signing_key(key)?;
        Ok(sign_digest(&signing_key, digest))
    }

    fn verify(&self, digest: &Digest, signature: &Signature, key: &PublicKey) -> bool {
        match Self::verifying_key(key) {
            Ok(verifying_key) => verify_digest(&verifying_key, digest, signature),
            Err(_) => false,
        }
    }

    fn max_plaintext_size(&self) -> usize {
        usize::MAX
    }
}
