//! Sender-side message routing
//!
//! The [`Router`] resolves both endpoints, discovers a path, encrypts the body
//! for the receiver and attaches the path as metadata. It performs no
//! delivery; the returned [`EncryptedMessage`] is handed to whatever
//! transport the caller uses.

use crate::codec::MessageCodec;
use crate::compression::{Compressor, RunLengthCompressor};
use crate::config::MeshConfig;
use crate::crypto::CryptoProvider;
use crate::error::{CompressionError, ConfigError, CryptoError, Result, RoutingError};
use crate::network::{Network, PathPolicy};
use crate::protocol::EncryptedMessage;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Encrypts and routes messages across a [`Network`]
#[derive(Clone)]
pub struct Router {
    /// Crypto access and plaintext limit
    codec: MessageCodec,

    /// Which edges path discovery may follow
    policy: PathPolicy,

    /// Compress bodies over the plaintext limit
    compress_oversized: bool,

    /// Compressor for oversized bodies
    compressor: Option<Arc<dyn Compressor>>,
}

impl Router {
    /// Create a router with the directed path policy and no compression
    pub fn new(codec: MessageCodec) -> Self {
        Self {
            codec,
            policy: PathPolicy::Directed,
            compress_oversized: false,
            compressor: None,
        }
    }

    /// Create a router from configuration
    ///
    /// When `compress_oversized` is set, a [`RunLengthCompressor`] is
    /// attached; replace it with [`with_compressor`](Self::with_compressor).
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if `config` fails validation
    pub fn from_config(provider: Arc<dyn CryptoProvider>, config: &MeshConfig) -> Result<Self> {
        let codec = MessageCodec::from_config(provider, config)?;
        let compressor: Option<Arc<dyn Compressor>> = if config.compress_oversized {
            Some(Arc::new(RunLengthCompressor::new()))
        } else {
            None
        };

        Ok(Self {
            codec,
            policy: config.path_policy,
            compress_oversized: config.compress_oversized,
            compressor,
        })
    }

    /// Set the path policy
    pub fn with_policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a compressor and enable compression of oversized bodies
    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Some(Arc::new(compressor));
        self.compress_oversized = true;
        self
    }

    /// The codec used for encryption
    pub fn codec(&self) -> &MessageCodec {
        &self.codec
    }

    /// The active path policy
    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// Encrypt `body` for `receiver` and attach the path from `sender`
    ///
    /// # Errors
    ///
    /// - `GraphError::UnknownNode` if either id is unregistered
    /// - `RoutingError::Unreachable` if no path exists under the policy
    /// - `CryptoError::PayloadTooLarge` if the body (after compression, when
    ///   enabled) exceeds the plaintext limit
    pub fn send(
        &self,
        network: &Network,
        sender: &str,
        receiver: &str,
        body: &str,
    ) -> Result<EncryptedMessage> {
        let from = network.resolve(sender)?;
        let to = network.resolve(receiver)?;

        let path = network
            .find_path_with(sender, receiver, self.policy)
            .ok_or_else(|| {
                debug!(%sender, %receiver, policy = ?self.policy, "Receiver unreachable");
                RoutingError::Unreachable {
                    from: from.id().clone(),
                    to: to.id().clone(),
                }
            })?;

        let (payload, compressed) = self.prepare(body.as_bytes());
        let ciphertext = self.codec.encrypt(&*payload, to.public_key())?;

        debug!(
            %sender,
            %receiver,
            hops = path.hops(),
            compressed,
            size = ciphertext.len(),
            "Message encrypted for route"
        );

        Ok(EncryptedMessage {
            sender: from.id().clone(),
            receiver: to.id().clone(),
            ciphertext,
            path,
            compressed,
        })
    }

    /// Decrypt a message on behalf of its receiver
    ///
    /// # Errors
    ///
    /// - `GraphError::UnknownNode` if the receiver is unregistered
    /// - `RoutingError::PathMismatch` if the attached path does not run from
    ///   sender to receiver
    /// - `CryptoError::DecryptionFailed` on a wrong key or corrupted ciphertext
    /// - `CompressionError` if the body is compressed and cannot be restored
    pub fn open(&self, network: &Network, message: &EncryptedMessage) -> Result<String> {
        let receiver = network.resolve(message.receiver.as_str())?;

        let (sender, to) = (message.sender.as_str(), message.receiver.as_str());
        if !message.path.connects(sender, to) {
            warn!(
                path = %message.path,
                sender = %message.sender,
                receiver = %message.receiver,
                "Path endpoints do not match message"
            );
            return Err(RoutingError::PathMismatch {
                from: message.sender.clone(),
                to: message.receiver.clone(),
            }
            .into());
        }

        if !message.compressed {
            return receiver.open(&self.codec, &message.ciphertext);
        }

        let compressor = self.compressor.as_ref().ok_or_else(|| {
            warn!(receiver = %message.receiver, "Compressed message but no compressor attached");
            CompressionError::Unavailable
        })?;

        let packed = receiver.decrypt_bytes(&self.codec, &message.ciphertext)?;
        let bytes = compressor.decompress(&packed)?;

        String::from_utf8(bytes).map_err(|e| {
            CryptoError::DecryptionFailed {
                reason: format!("plaintext is not UTF-8: {}", e),
            }
            .into()
        })
    }

    /// Compress the body when it is over the limit and compression is on
    fn prepare<'a>(&self, body: &'a [u8]) -> (Cow<'a, [u8]>, bool) {
        if self.codec.fits(body.len()) || !self.compress_oversized {
            return (Cow::Borrowed(body), false);
        }

        match &self.compressor {
            Some(compressor) => {
                let packed = compressor.compress(body);
                debug!(
                    compressor = compressor.name(),
                    original = body.len(),
                    packed = packed.len(),
                    "Compressed oversized body"
                );
                (Cow::Owned(packed), true)
            },
            None => (Cow::Borrowed(body), false),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("codec", &self.codec)
            .field("policy", &self.policy)
            .field("compress_oversized", &self.compress_oversized)
            .field("compressor", &self.compressor.as_ref().map(|c| c.name()))
            .finish()
    }
}

/// Builder for Router configuration
pub struct RouterBuilder {
    codec: Option<MessageCodec>,
    policy: PathPolicy,
    compressor: Option<Arc<dyn Compressor>>,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            codec: None,
            policy: PathPolicy::Directed,
            compressor: None,
        }
    }

    /// Set the codec
    pub fn codec(mut self, codec: MessageCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the path policy
    pub fn policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a compressor for oversized bodies
    pub fn compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Some(Arc::new(compressor));
        self
    }

    /// Build the router
    pub fn build(self) -> Result<Router> {
        let codec = self.codec.ok_or_else(|| ConfigError::InvalidValue {
            field: "codec".to_string(),
            reason: "a codec is required".to_string(),
        })?;

        Ok(Router {
            codec,
            policy: self.policy,
            compress_oversized: self.compressor.is_some(),
            compressor: self.compressor,
        })
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DalekProvider, MockProvider};
    use crate::error::{GraphError, MeshError};
    use crate::network::Path;

    fn setup(provider: Arc<dyn CryptoProvider>) -> (Network, Router) {
        let router = Router::new(MessageCodec::new(provider.clone()));
        let mut network = Network::new(provider);
        for id in ["alice", "bob", "carol", "dave"] {
            network.add_node(id).unwrap();
        }
        network.connect("alice", "bob").unwrap();
        network.connect("bob", "carol").unwrap();
        network.add_edge("dave", "carol").unwrap();
        (network, router)
    }

    #[test]
    fn test_send_attaches_path_and_encrypts() {
        let (network, router) = setup(Arc::new(DalekProvider::new()));

        let message = router.send(&network, "alice", "carol", "hello carol").unwrap();
        assert_eq!(message.sender, "alice");
        assert_eq!(message.receiver, "carol");
        assert_eq!(message.path.to_string(), "alice -> bob -> carol");
        assert!(!message.compressed);

        // Only the receiver can read it
        let carol = network.node("carol").unwrap();
        let bob = network.node("bob").unwrap();
        assert_eq!(
            carol.open(router.codec(), &message.ciphertext).unwrap(),
            "hello carol"
        );
        assert!(bob.open(router.codec(), &message.ciphertext).is_err());

        assert_eq!(router.open(&network, &message).unwrap(), "hello carol");
    }

    #[test]
    fn test_send_to_self() {
        let (network, router) = setup(Arc::new(MockProvider::new()));
        let message = router.send(&network, "alice", "alice", "note to self").unwrap();
        assert_eq!(message.path.hops(), 0);
        assert_eq!(router.open(&network, &message).unwrap(), "note to self");
    }

    #[test]
    fn test_unknown_endpoints() {
        let (network, router) = setup(Arc::new(MockProvider::new()));

        let err = router.send(&network, "mallory", "bob", "hi").unwrap_err();
        assert_eq!(
            err,
            MeshError::Graph(GraphError::UnknownNode { id: "mallory".into() })
        );

        let err = router.send(&network, "alice", "mallory", "hi").unwrap_err();
        assert!(err.is_caller_misuse());
    }

    #[test]
    fn test_unreachable_under_directed_policy() {
        let (network, router) = setup(Arc::new(MockProvider::new()));

        let err = router.send(&network, "alice", "dave", "hi").unwrap_err();
        assert_eq!(
            err,
            MeshError::Routing(RoutingError::Unreachable {
                from: "alice".into(),
                to: "dave".into(),
            })
        );
        assert!(err.is_recoverable());

        let router = router.with_policy(PathPolicy::Symmetric);
        let message = router.send(&network, "alice", "dave", "hi").unwrap();
        assert_eq!(message.path.to_string(), "alice -> bob -> carol -> dave");
    }

    #[test]
    fn test_oversized_body_is_rejected() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(MockProvider::new());
        let (network, _) = setup(provider.clone());
        let codec = MessageCodec::new(provider).with_max_plaintext_len(8).unwrap();
        let router = Router::new(codec);

        let err = router.send(&network, "alice", "bob", "123456789").unwrap_err();
        assert_eq!(
            err,
            MeshError::Crypto(CryptoError::PayloadTooLarge { size: 9, max: 8 })
        );
    }

    #[test]
    fn test_oversized_body_is_compressed_when_enabled() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(MockProvider::new());
        let (network, _) = setup(provider.clone());
        let codec = MessageCodec::new(provider).with_max_plaintext_len(64).unwrap();
        let router = Router::new(codec).with_compressor(RunLengthCompressor::new());

        let body = "z".repeat(1000);
        let message = router.send(&network, "alice", "bob", &body).unwrap();
        assert!(message.compressed);
        assert_eq!(router.open(&network, &message).unwrap(), body);

        // Short bodies are left alone
        let message = router.send(&network, "alice", "bob", "short").unwrap();
        assert!(!message.compressed);
    }

    #[test]
    fn test_compression_that_does_not_help_still_fails() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(MockProvider::new());
        let (network, _) = setup(provider.clone());
        let codec = MessageCodec::new(provider).with_max_plaintext_len(8).unwrap();
        let router = Router::new(codec).with_compressor(RunLengthCompressor::new());

        let err = router.send(&network, "alice", "bob", "abcdefghij").unwrap_err();
        assert!(matches!(
            err,
            MeshError::Crypto(CryptoError::PayloadTooLarge { size: 20, max: 8 })
        ));
    }

    #[test]
    fn test_open_compressed_without_compressor() {
        let provider: Arc<dyn CryptoProvider> = Arc::new(MockProvider::new());
        let (network, _) = setup(provider.clone());
        let codec = MessageCodec::new(provider.clone())
            .with_max_plaintext_len(16)
            .unwrap();
        let sender = Router::new(codec).with_compressor(RunLengthCompressor::new());
        let receiver = Router::new(MessageCodec::new(provider));

        let message = sender.send(&network, "alice", "bob", &"y".repeat(100)).unwrap();
        assert_eq!(
            receiver.open(&network, &message).unwrap_err(),
            MeshError::Compression(CompressionError::Unavailable)
        );
    }

    #[test]
    fn test_from_config() {
        let config = MeshConfig::default()
            .with_path_policy(PathPolicy::Symmetric)
            .with_max_plaintext_len(32)
            .with_compression(true);
        let router = Router::from_config(Arc::new(MockProvider::new()), &config).unwrap();

        assert_eq!(router.policy(), PathPolicy::Symmetric);
        assert_eq!(router.codec().max_plaintext_len(), 32);
        assert!(format!("{:?}", router).contains("RunLength"));

        let config = MeshConfig::default().with_max_plaintext_len(0);
        assert!(matches!(
            Router::from_config(Arc::new(MockProvider::new()), &config),
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_open_rejects_path_with_wrong_endpoints() {
        let (network, router) = setup(Arc::new(MockProvider::new()));
        let mut message = router.send(&network, "alice", "carol", "hi").unwrap();

        message.path = Path::try_from(vec!["dave".into(), "carol".into()]).unwrap();
        assert_eq!(
            router.open(&network, &message).unwrap_err(),
            MeshError::Routing(RoutingError::PathMismatch {
                from: "alice".into(),
                to: "carol".into(),
            })
        );

        // Only the endpoints are checked; the hops are metadata
        message.path =
            Path::try_from(vec!["alice".into(), "dave".into(), "carol".into()]).unwrap();
        assert_eq!(router.open(&network, &message).unwrap(), "hi");
    }

    #[test]
    fn test_router_builder() {
        let router = RouterBuilder::new()
            .codec(MessageCodec::new(Arc::new(MockProvider::new())))
            .policy(PathPolicy::Symmetric)
            .compressor(RunLengthCompressor::new())
            .build()
            .unwrap();
        assert_eq!(router.policy(), PathPolicy::Symmetric);

        let result = RouterBuilder::new().build();
        assert!(matches!(
            result,
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
