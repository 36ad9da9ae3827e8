//! Signed-message response protocol
//!
//! A responder checks a [`SignedMessage`] in two stages before answering:
//!
//! 1. **Integrity**: the carried hash must equal the digest of the carried body.
//! 2. **Authentication**: the signature must verify under the sender's key as
//!    registered in the [`Network`]. A key carried by the message is never
//!    trusted.
//!
//! Only then is a signed acknowledgment produced, chained to the original by
//! its hash and signature. Each failure is terminal for that message.

use super::messages::{ResponseMessage, SignedMessage};
use crate::codec::MessageCodec;
use crate::config::MeshConfig;
use crate::crypto::{CryptoProvider, Digest, PublicKey, Signature};
use crate::error::{ProtocolError, Result};
use crate::network::{Network, Node, NodeId};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Labels for trace output as a signed message moves through `respond`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    IntegrityChecked,
    Authenticated,
    Responded,
}

/// Validates signed messages and produces chained acknowledgments
#[derive(Debug, Clone)]
pub struct ResponseProtocol {
    codec: MessageCodec,
    config: MeshConfig,
}

impl ResponseProtocol {
    /// Create a protocol instance with the default acknowledgment text
    pub fn new(codec: MessageCodec) -> Self {
        Self {
            codec,
            config: MeshConfig::default(),
        }
    }

    /// Create a protocol instance from configuration
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if `config` fails validation
    pub fn from_config(provider: Arc<dyn CryptoProvider>, config: &MeshConfig) -> Result<Self> {
        Ok(Self {
            codec: MessageCodec::from_config(provider, config)?,
            config: config.clone(),
        })
    }

    /// Replace the acknowledgment template (`{responder}` is substituted)
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if the template is blank
    pub fn with_ack_template(mut self, template: impl Into<String>) -> Result<Self> {
        let config = self.config.with_ack_template(template);
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// The codec used for hashing and signatures
    pub fn codec(&self) -> &MessageCodec {
        &self.codec
    }

    /// Check that `signed.hash` is the digest of `signed.body`
    ///
    /// # Errors
    ///
    /// `ProtocolError::IntegrityViolation` on mismatch.
    pub fn check_integrity(&self, signed: &SignedMessage) -> Result<()> {
        self.ensure_digest(&signed.body, signed.hash, &signed.sender)
    }

    /// Check the signature against the sender's registered key
    ///
    /// # Errors
    ///
    /// - `GraphError::UnknownNode` if the sender is unregistered
    /// - `ProtocolError::AuthenticationFailed` if the signature does not verify
    pub fn authenticate(&self, network: &Network, signed: &SignedMessage) -> Result<()> {
        let key = network.public_key_of(signed.sender.as_str())?;
        self.ensure_signature(&signed.hash, &signed.signature, key, &signed.sender)
    }

    /// Validate `signed` and answer it on behalf of `responder`
    ///
    /// Integrity is always checked before authentication, so a tampered body
    /// is reported as an integrity failure even if the signature is also bad.
    ///
    /// # Example
    ///
    /// ```
    /// use socialmesh::{MessageCodec, MockProvider, Network, ResponseProtocol};
    /// use std::sync::Arc;
    ///
    /// let provider = Arc::new(MockProvider::new());
    /// let mut network = Network::new(provider.clone());
    /// network.add_node("alice").unwrap();
    /// network.add_node("bob").unwrap();
    ///
    /// let protocol = ResponseProtocol::new(MessageCodec::new(provider));
    /// let signed = network
    ///     .node("alice")
    ///     .unwrap()
    ///     .sign_message(protocol.codec(), "bob", "ping")
    ///     .unwrap();
    ///
    /// let response = protocol
    ///     .respond(&network, &signed, network.node("bob").unwrap())
    ///     .unwrap();
    /// assert_eq!(response.body, "Message received and validated by bob.");
    /// assert_eq!(response.original_hash, signed.hash);
    /// ```
    pub fn respond(
        &self,
        network: &Network,
        signed: &SignedMessage,
        responder: &Node,
    ) -> Result<ResponseMessage> {
        trace!(sender = %signed.sender, responder = %responder.id(), stage = ?Stage::Received);

        self.check_integrity(signed)?;
        trace!(sender = %signed.sender, stage = ?Stage::IntegrityChecked);

        self.authenticate(network, signed)?;
        trace!(sender = %signed.sender, stage = ?Stage::Authenticated);

        let body = self.config.ack_body(responder.id().as_str());
        let ack = responder.sign_message(&self.codec, signed.sender.clone(), body)?;

        debug!(
            responder = %responder.id(),
            receiver = %signed.sender,
            hash = %ack.hash,
            stage = ?Stage::Responded,
            "Response signed"
        );

        Ok(ResponseMessage {
            sender: ack.sender,
            receiver: ack.receiver,
            body: ack.body,
            original_signature: signed.signature.clone(),
            original_hash: signed.hash,
            response_hash: ack.hash,
            response_signature: ack.signature,
        })
    }

    /// Check, on the original sender's side, that `response` answers `original`
    ///
    /// # Errors
    ///
    /// - `ProtocolError::IntegrityViolation` if the response does not carry the
    ///   original hash and signature, or its own hash does not match its body
    /// - `GraphError::UnknownNode` if the responder is unregistered
    /// - `ProtocolError::AuthenticationFailed` if the response signature does
    ///   not verify under the responder's registered key
    pub fn confirm(
        &self,
        network: &Network,
        response: &ResponseMessage,
        original: &SignedMessage,
    ) -> Result<()> {
        if response.original_hash != original.hash {
            warn!(responder = %response.sender, "Response chained to a different message");
            return Err(ProtocolError::IntegrityViolation {
                expected: original.hash,
                actual: response.original_hash,
            }
            .into());
        }

        if response.original_signature != original.signature {
            warn!(responder = %response.sender, "Response carries a different signature");
            return Err(ProtocolError::IntegrityViolation {
                expected: self.codec.digest(original.signature.as_bytes()),
                actual: self.codec.digest(response.original_signature.as_bytes()),
            }
            .into());
        }

        self.ensure_digest(&response.body, response.response_hash, &response.sender)?;

        let key = network.public_key_of(response.sender.as_str())?;
        self.ensure_signature(
            &response.response_hash,
            &response.response_signature,
            key,
            &response.sender,
        )?;

        debug!(responder = %response.sender, "Response confirmed");
        Ok(())
    }

    fn ensure_digest(&self, body: &str, carried: Digest, sender: &NodeId) -> Result<()> {
        let computed = self.codec.digest(body);
        if computed != carried {
            warn!(%sender, expected = %computed, actual = %carried, "Integrity check failed");
            return Err(ProtocolError::IntegrityViolation {
                expected: computed,
                actual: carried,
            }
            .into());
        }
        Ok(())
    }

    fn ensure_signature(
        &self,
        digest: &Digest,
        signature: &Signature,
        key: &PublicKey,
        signer: &NodeId,
    ) -> Result<()> {
        if !self.codec.verify(digest, signature, key) {
            warn!(%signer, "Signature verification failed");
            return Err(ProtocolError::AuthenticationFailed {
                signer: signer.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DalekProvider, MockProvider};
    use crate::error::{ConfigError, GraphError, MeshError};

    fn setup(provider: Arc<dyn CryptoProvider>) -> (Network, ResponseProtocol) {
        let protocol = ResponseProtocol::new(MessageCodec::new(provider.clone()));
        let mut network = Network::new(provider);
        for id in ["alice", "bob", "mallory"] {
            network.add_node(id).unwrap();
        }
        (network, protocol)
    }

    fn sign(
        network: &Network,
        protocol: &ResponseProtocol,
        from: &str,
        body: &str,
    ) -> SignedMessage {
        network
            .node(from)
            .unwrap()
            .sign_message(protocol.codec(), "bob", body)
            .unwrap()
    }

    #[test]
    fn test_ping_ack_chain() {
        let (network, protocol) = setup(Arc::new(MockProvider::new()));
        let protocol = protocol.with_ack_template("ack").unwrap();

        let signed = sign(&network, &protocol, "alice", "ping");
        let bob = network.node("bob").unwrap();
        let response = protocol.respond(&network, &signed, bob).unwrap();

        assert_eq!(response.sender, "bob");
        assert_eq!(response.receiver, "alice");
        assert_eq!(response.body, "ack");
        assert_eq!(response.response_hash, protocol.codec().digest("ack"));
        assert_eq!(response.original_hash, signed.hash);
        assert_eq!(response.original_signature, signed.signature);

        let bob_key = network.public_key_of("bob").unwrap();
        assert!(protocol.codec().verify(
            &response.response_hash,
            &response.response_signature,
            bob_key
        ));
    }

    #[test]
    fn test_tampered_body_is_an_integrity_violation() {
        for provider in [
            Arc::new(MockProvider::new()) as Arc<dyn CryptoProvider>,
            Arc::new(DalekProvider::new()) as Arc<dyn CryptoProvider>,
        ] {
            let (network, protocol) = setup(provider);
            let mut signed = sign(&network, &protocol, "alice", "ping");
            signed.body = "pong".to_string();

            let err = protocol
                .respond(&network, &signed, network.node("bob").unwrap())
                .unwrap_err();
            assert_eq!(
                err,
                MeshError::Protocol(ProtocolError::IntegrityViolation {
                    expected: protocol.codec().digest("pong"),
                    actual: protocol.codec().digest("ping"),
                })
            );
        }
    }

    #[test]
    fn test_forged_signature_is_an_authentication_failure() {
        for provider in [
            Arc::new(MockProvider::new()) as Arc<dyn CryptoProvider>,
            Arc::new(DalekProvider::new()) as Arc<dyn CryptoProvider>,
        ] {
            let (network, protocol) = setup(provider);

            // Mallory signs with their own key but claims to be Alice
            let mut forged = sign(&network, &protocol, "mallory", "ping");
            forged.sender = "alice".into();

            let err = protocol
                .respond(&network, &forged, network.node("bob").unwrap())
                .unwrap_err();
            assert_eq!(
                err,
                MeshError::Protocol(ProtocolError::AuthenticationFailed {
                    signer: "alice".into()
                })
            );
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_integrity_is_checked_before_authentication() {
        let (network, protocol) = setup(Arc::new(MockProvider::new()));
        let mut signed = sign(&network, &protocol, "mallory", "ping");
        signed.sender = "alice".into();
        signed.body = "ping!".to_string();

        let err = protocol
            .respond(&network, &signed, network.node("bob").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            MeshError::Protocol(ProtocolError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn test_unregistered_sender() {
        let (network, protocol) = setup(Arc::new(MockProvider::new()));
        let mut signed = sign(&network, &protocol, "alice", "ping");
        signed.sender = "ghost".into();

        let err = protocol
            .respond(&network, &signed, network.node("bob").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            MeshError::Graph(GraphError::UnknownNode { id: "ghost".into() })
        );
    }

    #[test]
    fn test_confirm() {
        let (network, protocol) = setup(Arc::new(DalekProvider::new()));
        let signed = sign(&network, &protocol, "alice", "ping");
        let response = protocol
            .respond(&network, &signed, network.node("bob").unwrap())
            .unwrap();

        protocol.confirm(&network, &response, &signed).unwrap();

        // A response to some other message does not confirm this one
        let other = sign(&network, &protocol, "alice", "another ping");
        assert!(matches!(
            protocol.confirm(&network, &response, &other),
            Err(MeshError::Protocol(ProtocolError::IntegrityViolation { .. }))
        ));

        // Tampered acknowledgment body
        let mut tampered = response.clone();
        tampered.body.push('!');
        assert!(matches!(
            protocol.confirm(&network, &tampered, &signed),
            Err(MeshError::Protocol(ProtocolError::IntegrityViolation { .. }))
        ));

        // Response re-attributed to another node
        let mut misattributed = response;
        misattributed.sender = "mallory".into();
        assert_eq!(
            protocol.confirm(&network, &misattributed, &signed).unwrap_err(),
            MeshError::Protocol(ProtocolError::AuthenticationFailed {
                signer: "mallory".into()
            })
        );
    }

    #[test]
    fn test_confirm_rejects_swapped_original_signature() {
        let (network, protocol) = setup(Arc::new(MockProvider::new()));
        let signed = sign(&network, &protocol, "alice", "ping");
        let mut response = protocol
            .respond(&network, &signed, network.node("bob").unwrap())
            .unwrap();
        response.original_signature = Signature::from_bytes(vec![0u8; 32]);

        assert!(matches!(
            protocol.confirm(&network, &response, &signed),
            Err(MeshError::Protocol(ProtocolError::IntegrityViolation { .. }))
        ));
    }

    #[test]
    fn test_from_config_template() {
        let config = MeshConfig::default().with_ack_template("{responder} got it");
        let protocol =
            ResponseProtocol::from_config(Arc::new(MockProvider::new()), &config).unwrap();
        let (network, _) = setup(protocol.codec().provider().clone());

        let signed = sign(&network, &protocol, "alice", "ping");
        let response = protocol
            .respond(&network, &signed, network.node("bob").unwrap())
            .unwrap();
        assert_eq!(response.body, "bob got it");
    }

    #[test]
    fn test_blank_ack_template_is_rejected() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(MockProvider::new());

        let config = MeshConfig::default().with_ack_template("   ");
        assert!(matches!(
            ResponseProtocol::from_config(provider.clone(), &config),
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));

        let config = MeshConfig::default().with_max_plaintext_len(0);
        assert!(matches!(
            ResponseProtocol::from_config(provider.clone(), &config),
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));

        let protocol = ResponseProtocol::new(MessageCodec::new(provider));
        assert!(matches!(
            protocol.with_ack_template(""),
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
