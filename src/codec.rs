//! Message codec
//!
//! [`MessageCodec`] is the only path from message bodies to the injected
//! [`CryptoProvider`]. It enforces the plaintext limit and turns decrypted
//! bytes back into text.

use crate::config::{MeshConfig, DEFAULT_MAX_PLAINTEXT_LEN};
use crate::crypto::{CryptoProvider, Digest, PrivateKey, PublicKey, Signature};
use crate::error::{ConfigError, CryptoError, Result};
use std::fmt;
use std::sync::Arc;

/// Encrypts, decrypts, hashes, signs and verifies message bodies
#[derive(Clone)]
pub struct MessageCodec {
    provider: Arc<dyn CryptoProvider>,
    max_plaintext_len: usize,
}

impl MessageCodec {
    /// Create a codec with the default plaintext limit
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            max_plaintext_len: DEFAULT_MAX_PLAINTEXT_LEN,
        }
    }

    /// Create a codec using the limit from `config`
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if `config` fails validation
    pub fn from_config(provider: Arc<dyn CryptoProvider>, config: &MeshConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            max_plaintext_len: config.max_plaintext_len,
        })
    }

    /// Override the configured plaintext limit
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if `max` is zero
    pub fn with_max_plaintext_len(mut self, max: usize) -> Result<Self> {
        if max == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_plaintext_len".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        self.max_plaintext_len = max;
        Ok(self)
    }

    /// Effective plaintext limit: the configured limit capped by the provider's
    pub fn max_plaintext_len(&self) -> usize {
        self.max_plaintext_len.min(self.provider.max_plaintext_size())
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<dyn CryptoProvider> {
        &self.provider
    }

    /// Whether a body of `len` bytes can be encrypted directly
    pub fn fits(&self, len: usize) -> bool {
        len <= self.max_plaintext_len()
    }

    /// Encrypt `body` for the holder of `recipient`'s private key
    ///
    /// # Errors
    ///
    /// `CryptoError::PayloadTooLarge` when the body exceeds
    /// [`max_plaintext_len`](Self::max_plaintext_len). Bodies are never
    /// truncated.
    pub fn encrypt(&self, body: impl AsRef<[u8]>, recipient: &PublicKey) -> Result<Vec<u8>> {
        let body = body.as_ref();
        let max = self.max_plaintext_len();
        if body.len() > max {
            return Err(CryptoError::PayloadTooLarge {
                size: body.len(),
                max,
            }
            .into());
        }
        self.provider.encrypt(body, recipient)
    }

    /// Decrypt a ciphertext and interpret it as UTF-8 text
    ///
    /// # Errors
    ///
    /// `CryptoError::DecryptionFailed` on a wrong key, corrupted ciphertext,
    /// or a plaintext that is not valid UTF-8.
    pub fn decrypt(&self, ciphertext: &[u8], owner: &PrivateKey) -> Result<String> {
        let bytes = self.decrypt_bytes(ciphertext, owner)?;
        String::from_utf8(bytes).map_err(|e| {
            CryptoError::DecryptionFailed {
                reason: format!("plaintext is not UTF-8: {}", e),
            }
            .into()
        })
    }

    /// Decrypt a ciphertext to raw bytes
    pub fn decrypt_bytes(&self, ciphertext: &[u8], owner: &PrivateKey) -> Result<Vec<u8>> {
        self.provider.decrypt(ciphertext, owner)
    }

    /// Digest of `body`
    pub fn digest(&self, body: impl AsRef<[u8]>) -> Digest {
        self.provider.digest(body.as_ref())
    }

    /// Sign a digest
    pub fn sign(&self, digest: &Digest, key: &PrivateKey) -> Result<Signature> {
        self.provider.sign(digest, key)
    }

    /// Verify a signature; malformed input yields `false`
    pub fn verify(&self, digest: &Digest, signature: &Signature, key: &PublicKey) -> bool {
        self.provider.verify(digest, signature, key)
    }
}

impl fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCodec")
            .field("provider", &self.provider.name())
            .field("max_plaintext_len", &self.max_plaintext_len())
            .finish()
    }
}
