//! Digital signatures over message digests using Ed25519

use super::hash::Digest;
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An opaque signature produced by a [`CryptoProvider`](super::CryptoProvider)
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wrap raw signature bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding of the signature
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s)
            .map(Signature)
            .map_err(serde::de::Error::custom)
    }
}

/// Sign a digest with an Ed25519 signing key
pub(crate) fn sign_digest(key: &SigningKey, digest: &Digest) -> Signature {
    Signature(key.sign(digest.as_bytes()).to_bytes().to_vec())
}

/// Verify an Ed25519 signature over a digest
///
/// Returns `false` for signatures of the wrong length or that fail
/// verification.
pub(crate) fn verify_digest(key: &VerifyingKey, digest: &Digest, signature: &Signature) -> bool {
    match Ed25519Signature::from_slice(signature.as_bytes()) {
        Ok(sig) => key.verify(digest.as_bytes(), &sig).is_ok(),
        Err(_) => false,
    }
}
