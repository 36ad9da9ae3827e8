//! Error types for socialmesh
//!
//! Every fallible operation returns [`MeshError`], which wraps one of the
//! domain-specific error enums below. None of these represent transient
//! conditions; the core never retries on its own.

use crate::crypto::Digest;
use crate::network::NodeId;
use thiserror::Error;

/// Misuse of the graph API (registration and edge insertion)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this id is already registered
    #[error("Node '{id}' is already registered")]
    DuplicateId {
        /// The conflicting id
        id: NodeId,
    },

    /// The id does not name a registered node
    #[error("Unknown node '{id}'")]
    UnknownNode {
        /// The id that failed to resolve
        id: NodeId,
    },
}

/// Path discovery failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// Both endpoints exist but no path connects them
    #[error("No path from '{from}' to '{to}'")]
    Unreachable {
        /// Sending node
        from: NodeId,
        /// Receiving node
        to: NodeId,
    },

    /// A path with no nodes
    #[error("Path must contain at least one node")]
    EmptyPath,

    /// The attached path does not run from sender to receiver
    #[error("Path does not run from '{from}' to '{to}'")]
    PathMismatch {
        /// Sending node
        from: NodeId,
        /// Receiving node
        to: NodeId,
    },
}

/// Failures of the cryptographic primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The provider could not encrypt the payload
    #[error("Encryption failed: {reason}")]
    EncryptionFailed {
        /// Description of the failure
        reason: String,
    },

    /// The payload exceeds the maximum directly encryptable size
    #[error("Payload of {size} bytes exceeds the {max} byte encryption limit")]
    PayloadTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Effective limit in bytes
        max: usize,
    },

    /// Ciphertext was not produced for this key pair, or is corrupted
    #[error("Decryption failed: {reason}")]
    DecryptionFailed {
        /// Description of the failure
        reason: String,
    },

    /// Key bytes do not form a valid key for the provider
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Description of the failure
        reason: String,
    },

    /// Malformed hex input
    #[error("Invalid hex encoding: {reason}")]
    InvalidEncoding {
        /// Description of the failure
        reason: String,
    },
}

/// Violations of the signed-message / response protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The carried hash does not match the digest of the carried body
    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityViolation {
        /// Digest computed locally
        expected: Digest,
        /// Digest carried by the message
        actual: Digest,
    },

    /// The signature does not verify under the sender's registered key
    #[error("Signature from '{signer}' failed verification")]
    AuthenticationFailed {
        /// The node whose key was used for verification
        signer: NodeId,
    },
}

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {reason}")]
    ParseFailed {
        /// Parser message
        reason: String,
    },
}

/// Failures of the payload compression collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    /// Compressed input is malformed
    #[error("Corrupted compressed payload: {reason}")]
    Corrupted {
        /// Description of the failure
        reason: String,
    },

    /// A compressed payload arrived but no compressor is attached
    #[error("Payload is compressed but no compressor is configured")]
    Unavailable,
}

/// Main error type for socialmesh operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Graph API misuse
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Path discovery failure
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Cryptographic failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Protocol violation
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Compression failure
    #[error(transparent)]
    Compression(#[from] CompressionError),

    /// Message (de)serialization failure
    #[error("Serialization failed: {reason}")]
    Serialization {
        /// Serializer message
        reason: String,
    },
}

impl MeshError {
    /// Whether the error indicates caller misuse of the graph API
    pub fn is_caller_misuse(&self) -> bool {
        matches!(self, Self::Graph(_))
    }

    /// Whether the caller can reasonably recover, e.g. by trying another
    /// path policy or rejecting the message
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Routing(RoutingError::Unreachable { .. })
                | Self::Protocol(ProtocolError::AuthenticationFailed { .. })
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MeshError>;
