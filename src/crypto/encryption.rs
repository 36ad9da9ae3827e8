//! Sealed-box encryption using X25519 key exchange and ChaCha20-Poly1305 AEAD
//!
//! Each call generates an ephemeral X25519 key pair, derives a symmetric key
//! from the shared secret with Blake3 and encrypts under a random nonce.
//!
//! Format: \[ephemeral_public_key (32)\]\[nonce (12)\]\[ciphertext + tag\]

use crate::error::{CryptoError, Result};
use chacha20poly1305::{
    aead::{Aead, KeyInit, OsRng},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
use zeroize::Zeroize;

const EPHEMERAL_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Bytes added to every plaintext by [`seal`]
pub(crate) const SEAL_OVERHEAD: usize = EPHEMERAL_KEY_LEN + NONCE_LEN + TAG_LEN;

fn derive_cipher(shared_secret: &[u8]) -> ChaCha20Poly1305 {
    let mut encryption_key = *blake3::hash(shared_secret).as_bytes();
    let cipher = ChaCha20Poly1305::new(&encryption_key.into());
    encryption_key.zeroize();
    cipher
}

/// Encrypt `plaintext` so only the holder of `recipient`'s secret can read it
pub(crate) fn seal(recipient: &X25519PublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let ephemeral_secret = X25519StaticSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);

    let shared_secret = ephemeral_secret.diffie_hellman(recipient);
    let cipher = derive_cipher(shared_secret.as_bytes());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext =
        cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::EncryptionFailed {
                reason: format!("ChaCha20-Poly1305 encryption failed: {}", e),
            })?;

    let mut sealed = Vec::with_capacity(SEAL_OVERHEAD + plaintext.len());
    sealed.extend_from_slice(ephemeral_public.as_bytes());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a payload produced by [`seal`] for `secret`'s public key
///
/// Fails when the payload is truncated, was sealed for another key, or has
/// been modified.
pub(crate) fn open(secret: &X25519StaticSecret, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(CryptoError::DecryptionFailed {
            reason: format!(
                "ciphertext too short: {} bytes (minimum {})",
                sealed.len(),
                SEAL_OVERHEAD
            ),
        }
        .into());
    }

    let mut ephemeral_bytes = [0u8; EPHEMERAL_KEY_LEN];
    ephemeral_bytes.copy_from_slice(&sealed[..EPHEMERAL_KEY_LEN]);
    let ephemeral_public = X25519PublicKey::from(ephemeral_bytes);

    let nonce = Nonce::from_slice(&sealed[EPHEMERAL_KEY_LEN..EPHEMERAL_KEY_LEN + NONCE_LEN]);
    let ciphertext = &sealed[EPHEMERAL_KEY_LEN + NONCE_LEN..];

    let shared_secret = secret.diffie_hellman(&ephemeral_public);
    let cipher = derive_cipher(shared_secret.as_bytes());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| {
            CryptoError::DecryptionFailed {
                reason: "ChaCha20-Poly1305 decryption failed (authentication tag mismatch)"
                    .to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair(seed: u8) -> (X25519StaticSecret, X25519PublicKey) {
        let secret = X25519StaticSecret::from([seed; 32]);
        let public = X25519PublicKey::from(&secret);
        (secret, public)
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let (secret, public) = key_pair(1);

        let sealed = seal(&public, b"Hello, Bob!").unwrap();
        assert_eq!(sealed.len(), SEAL_OVERHEAD + 11);
        assert_eq!(open(&secret, &sealed).unwrap(), b"Hello, Bob!");
    }

    #[test]
    fn test_open_fails_with_wrong_recipient() {
        let (_, public) = key_pair(1);
        let (other_secret, _) = key_pair(2);

        let sealed = seal(&public, b"Secret message").unwrap();
        assert!(open(&other_secret, &sealed).is_err());
    }

    #[test]
    fn test_open_fails_with_modified_ciphertext() {
        let (secret, public) = key_pair(1);

        let mut sealed = seal(&public, b"Secret message").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(open(&secret, &sealed).is_err());

        // Modified nonce
        let mut sealed = seal(&public, b"Secret message").unwrap();
        sealed[EPHEMERAL_KEY_LEN] ^= 0xFF;
        assert!(open(&secret, &sealed).is_err());
    }

    #[test]
    fn test_open_fails_when_truncated() {
        let (secret, _) = key_pair(1);
        assert!(open(&secret, &[0u8; SEAL_OVERHEAD - 1]).is_err());
        assert!(open(&secret, &[]).is_err());
    }

    #[test]
    fn test_seal_is_randomized() {
        let (secret, public) = key_pair(1);

        let sealed1 = seal(&public, b"Same message").unwrap();
        let sealed2 = seal(&public, b"Same message").unwrap();
        assert_ne!(sealed1, sealed2);

        assert_eq!(open(&secret, &sealed1).unwrap(), b"Same message");
        assert_eq!(open(&secret, &sealed2).unwrap(), b"Same message");
    }

    #[test]
    fn test_various_plaintext_sizes() {
        let (secret, public) = key_pair(9);

        for plaintext in [Vec::new(), b"a".to_vec(), vec![0x42u8; 10000]] {
            let sealed = seal(&public, &plaintext).unwrap();
            assert_eq!(open(&secret, &sealed).unwrap(), plaintext);
        }
    }
}
