//! Cryptography module
//!
//! The core never calls a cryptographic library directly. Every primitive
//! goes through an injected [`CryptoProvider`]:
//!
//! - [`DalekProvider`]: Ed25519 signatures, X25519 + ChaCha20-Poly1305
//!   sealed-box encryption, Blake3 digests
//! - [`MockProvider`]: deterministic and insecure, for tests
//!
//! All production primitives come from audited RustCrypto / dalek crates.

mod dalek;
mod encryption;
pub mod hash;
pub mod keys;
pub mod mock;
pub mod signing;

// Re-export main types
pub use dalek::DalekProvider;
pub use hash::{hash_bytes, Digest};
pub use keys::{KeyMaterial, PrivateKey, PublicKey};
pub use mock::MockProvider;
pub use signing::Signature;

use crate::error::Result;

/// A source of the six primitive operations the network depends on
///
/// Implementations must be deterministic in outcome: `decrypt` always
/// recovers what `encrypt` sealed for the matching key pair, and `verify`
/// always accepts what `sign` produced with the matching key pair.
pub trait CryptoProvider: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Generate a fresh random key pair
    fn generate_key_pair(&self) -> KeyMaterial;

    /// Derive a key pair deterministically from a 32-byte seed
    fn key_pair_from_seed(&self, seed: &[u8; 32]) -> KeyMaterial;

    /// Encrypt `plaintext` for the holder of `recipient`'s private key
    fn encrypt(&self, plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext produced for `owner`'s public key
    ///
    /// Must fail, never return garbage, when the ciphertext was produced for
    /// another key or has been modified.
    fn decrypt(&self, ciphertext: &[u8], owner: &PrivateKey) -> Result<Vec<u8>>;

    /// Collision-resistant digest of `data`
    fn digest(&self, data: &[u8]) -> Digest;

    /// Sign a digest
    fn sign(&self, digest: &Digest, key: &PrivateKey) -> Result<Signature>;

    /// Verify a signature over a digest; malformed input yields `false`
    fn verify(&self, digest: &Digest, signature: &Signature, key: &PublicKey) -> bool;

    /// Maximum plaintext size this provider can encrypt directly
    fn max_plaintext_size(&self) -> usize;
}
