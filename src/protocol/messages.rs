//! Message shapes
//!
//! Each stage of the protocol has its own struct carrying only the fields it
//! needs. [`Message`] tags them so a consumer must handle every case
//! explicitly.

use crate::crypto::{Digest, Signature};
use crate::error::{MeshError, Result};
use crate::network::{NodeId, Path};
use serde::{Deserialize, Serialize};

/// An unencrypted message; exists only transiently before sending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainMessage {
    /// Sending node
    pub sender: NodeId,
    /// Receiving node
    pub receiver: NodeId,
    /// Message text
    pub body: String,
}

impl PlainMessage {
    /// Create a plaintext message
    pub fn new(
        sender: impl Into<NodeId>,
        receiver: impl Into<NodeId>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            body: body.into(),
        }
    }
}

/// A body encrypted for the receiver, with the discovered route attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    /// Sending node
    pub sender: NodeId,
    /// Receiving node
    pub receiver: NodeId,
    /// Body encrypted under the receiver's public key
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    /// Route from sender to receiver; metadata only
    ///
    /// A path parsed from JSON is untrusted. [`Router::open`] rejects one
    /// whose endpoints differ from `sender` and `receiver`, but never checks
    /// the hops in between against the graph.
    ///
    /// [`Router::open`]: crate::routing::Router::open
    pub path: Path,
    /// Whether the body was compressed before encryption
    #[serde(default)]
    pub compressed: bool,
}

/// A plaintext body with its digest and the sender's signature over it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// Signing node
    pub sender: NodeId,
    /// Intended receiver
    pub receiver: NodeId,
    /// Message text
    pub body: String,
    /// Digest of `body`
    pub hash: Digest,
    /// `sign(hash, sender's private key)`
    pub signature: Signature,
}

/// Acknowledgment chained to the signed message it answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Responding node (the original receiver)
    pub sender: NodeId,
    /// Original sender
    pub receiver: NodeId,
    /// Acknowledgment text
    pub body: String,
    /// Signature of the message being answered
    pub original_signature: Signature,
    /// Digest of the message being answered
    pub original_hash: Digest,
    /// Digest of `body`
    pub response_hash: Digest,
    /// `sign(response_hash, responder's private key)`
    pub response_signature: Signature,
}

/// Any message handled by the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    /// Not yet encrypted or signed
    Plaintext(PlainMessage),
    /// Encrypted for the receiver
    Encrypted(EncryptedMessage),
    /// Signed by the sender
    Signed(SignedMessage),
    /// Signed acknowledgment of a signed message
    Response(ResponseMessage),
}

impl Message {
    /// Sending node
    pub fn sender(&self) -> &NodeId {
        match self {
            Self::Plaintext(m) => &m.sender,
            Self::Encrypted(m) => &m.sender,
            Self::Signed(m) => &m.sender,
            Self::Response(m) => &m.sender,
        }
    }

    /// Receiving node
    pub fn receiver(&self) -> &NodeId {
        match self {
            Self::Plaintext(m) => &m.receiver,
            Self::Encrypted(m) => &m.receiver,
            Self::Signed(m) => &m.receiver,
            Self::Response(m) => &m.receiver,
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plaintext(_) => "plaintext",
            Self::Encrypted(_) => "encrypted",
            Self::Signed(_) => "signed",
            Self::Response(_) => "response",
        }
    }

    /// Render as JSON, for inspection or hand-off to a transport
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| MeshError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parse a message rendered by [`Message::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MeshError::Serialization {
            reason: e.to_string(),
        })
    }
}

impl From<PlainMessage> for Message {
    fn from(m: PlainMessage) -> Self {
        Self::Plaintext(m)
    }
}

impl From<EncryptedMessage> for Message {
    fn from(m: EncryptedMessage) -> Self {
        Self::Encrypted(m)
    }
}

impl From<SignedMessage> for Message {
    fn from(m: SignedMessage) -> Self {
        Self::Signed(m)
    }
}

impl From<ResponseMessage> for Message {
    fn from(m: ResponseMessage) -> Self {
        Self::Response(m)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_bytes;

    fn signed() -> SignedMessage {
        SignedMessage {
            sender: "alice".into(),
            receiver: "bob".into(),
            body: "ping".to_string(),
            hash: hash_bytes(b"ping"),
            signature: Signature::from_bytes(vec![1, 2, 3]),
        }
    }

    #[test]
    fn test_accessors() {
        let message = Message::from(PlainMessage::new("alice", "bob", "hi"));
        assert_eq!(message.sender(), "alice");
        assert_eq!(message.receiver(), "bob");
        assert_eq!(message.kind(), "plaintext");

        let message = Message::from(signed());
        assert_eq!(message.kind(), "signed");
    }

    #[test]
    fn test_json_is_tagged() {
        let json = Message::from(signed()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "signed");
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["hash"], hash_bytes(b"ping").to_hex());
        assert_eq!(value["signature"], "010203");
    }

    #[test]
    fn test_json_roundtrip_preserves_variant() {
        let message = Message::from(signed());
        let back = Message::from_json(&message.to_json().unwrap()).unwrap();
        assert_eq!(back, message);
        assert!(matches!(back, Message::Signed(_)));
    }

    #[test]
    fn test_from_json_rejects_unknown_kind() {
        let err = Message::from_json(r#"{"kind":"telegram","sender":"a"}"#).unwrap_err();
        assert!(matches!(err, MeshError::Serialization { .. }));
    }

    #[test]
    fn test_from_json_rejects_empty_path() {
        let json = r#"{"kind":"encrypted","sender":"alice","receiver":"bob","ciphertext":"00","path":[]}"#;
        let err = Message::from_json(json).unwrap_err();
        assert!(matches!(err, MeshError::Serialization { .. }));

        let json = r#"{"kind":"encrypted","sender":"alice","receiver":"bob","ciphertext":"00","path":["alice","bob"]}"#;
        match Message::from_json(json).unwrap() {
            Message::Encrypted(message) => {
                assert_eq!(message.path.source(), "alice");
                assert_eq!(message.path.destination(), "bob");
                assert!(!message.compressed);
            },
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
