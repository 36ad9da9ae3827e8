//! Key material held by network participants
//!
//! Keys are opaque byte strings whose layout is defined by the
//! [`CryptoProvider`](super::CryptoProvider) that generated them. The public
//! half is freely shareable; the private half is zeroized on drop, cannot be
//! cloned or serialized, and is redacted from `Debug` output.

use crate::error::{CryptoError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Public key that can be safely shared with others
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wrap raw public key bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding of the raw key bytes
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a hex-encoded public key
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidEncoding {
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Get a human-readable fingerprint of this public key
    ///
    /// Blake3 hash of the key bytes, as lowercase hex.
    ///
    /// # Example
    ///
    /// ```
    /// use socialmesh::crypto::{CryptoProvider, DalekProvider};
    ///
    /// let keys = DalekProvider::new().generate_key_pair();
    /// println!("Fingerprint: {}", keys.public_key().fingerprint());
    /// ```
    pub fn fingerprint(&self) -> String {
        blake3::hash(&self.0).to_hex().to_string()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fingerprint = self.fingerprint();
        write!(f, "PublicKey({})", &fingerprint[..16])
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Private key bytes, owned by exactly one node
pub struct PrivateKey(Zeroizing<Vec<u8>>);

impl PrivateKey {
    /// Wrap raw private key bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw key bytes, for use by a [`CryptoProvider`](super::CryptoProvider)
    /// implementation only
    pub fn expose_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// A public/private key pair
///
/// Created once per node and immutable afterwards.
pub struct KeyMaterial {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyMaterial {
    /// Assemble key material from its halves
    pub fn new(public_key: PublicKey, private_key: PrivateKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    /// The shareable half
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The secret half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .finish()
    }
}
