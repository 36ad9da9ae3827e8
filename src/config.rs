//! Configuration for the messaging core
//!
//! [`MeshConfig`] collects the tunables shared by the codec, router and
//! response protocol. It can be built in code or parsed from JSON, and is
//! validated before use.

use crate::error::{ConfigError, Result};
use crate::network::PathPolicy;
use serde::{Deserialize, Serialize};

/// Default maximum plaintext size accepted for direct encryption (4 KiB)
pub const DEFAULT_MAX_PLAINTEXT_LEN: usize = 4096;

/// Placeholder replaced by the responder's id in acknowledgment bodies
pub const RESPONDER_PLACEHOLDER: &str = "{responder}";

fn default_max_plaintext_len() -> usize {
    DEFAULT_MAX_PLAINTEXT_LEN
}

fn default_ack_template() -> String {
    format!("Message received and validated by {}.", RESPONDER_PLACEHOLDER)
}

/// Core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Maximum plaintext size, in bytes, the codec will encrypt directly
    ///
    /// The effective limit is the smaller of this value and the provider's
    /// own limit. Larger bodies fail rather than being truncated.
    #[serde(default = "default_max_plaintext_len")]
    pub max_plaintext_len: usize,

    /// Which edges path discovery may follow
    #[serde(default)]
    pub path_policy: PathPolicy,

    /// Compress bodies that exceed the plaintext limit before encrypting
    ///
    /// The router uses run-length encoding unless another compressor is
    /// attached.
    #[serde(default)]
    pub compress_oversized: bool,

    /// Acknowledgment body produced by the response protocol
    ///
    /// Every `{responder}` is replaced by the responder's id. Must not be
    /// empty.
    #[serde(default = "default_ack_template")]
    pub ack_template: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_plaintext_len: DEFAULT_MAX_PLAINTEXT_LEN,
            path_policy: PathPolicy::default(),
            compress_oversized: false,
            ack_template: default_ack_template(),
        }
    }
}

impl MeshConfig {
    /// Set the plaintext limit
    pub fn with_max_plaintext_len(mut self, max: usize) -> Self {
        self.max_plaintext_len = max;
        self
    }

    /// Set the path policy
    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    /// Enable or disable compression of oversized bodies
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_oversized = enabled;
        self
    }

    /// Set the acknowledgment template
    pub fn with_ack_template<S: Into<String>>(mut self, template: S) -> Self {
        self.ack_template = template.into();
        self
    }

    /// Parse and validate a JSON configuration document
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `max_plaintext_len` is 0
    /// - `ack_template` is empty or only whitespace
    pub fn validate(&self) -> Result<()> {
        if self.max_plaintext_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_plaintext_len".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.ack_template.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ack_template".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Render the acknowledgment body for `responder`
    pub fn ack_body(&self, responder: &str) -> String {
        self.ack_template.replace(RESPONDER_PLACEHOLDER, responder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;

    #[test]
    fn test_default_config() {
        let config = MeshConfig::default();

        assert_eq!(config.max_plaintext_len, 4096);
        assert_eq!(config.path_policy, PathPolicy::Directed);
        assert!(!config.compress_oversized);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.ack_body("bob"),
            "Message received and validated by bob."
        );
    }

    #[test]
    fn test_validation_zero_limit() {
        let config = MeshConfig::default().with_max_plaintext_len(0);
        assert!(matches!(
            config.validate(),
            Err(MeshError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_validation_ack_template() {
        let config = MeshConfig::default().with_ack_template("  ");
        assert!(config.validate().is_err());

        let config = MeshConfig::default().with_ack_template("ack");
        assert!(config.validate().is_ok());
        assert_eq!(config.ack_body("carol"), "ack");

        let config = MeshConfig::default().with_ack_template("ack from {responder}");
        assert!(config.validate().is_ok());
        assert_eq!(config.ack_body("carol"), "ack from carol");
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            MeshConfig::from_json(r#"{ "path_policy": "symmetric", "max_plaintext_len": 64 }"#)
                .unwrap();

        assert_eq!(config.path_policy, PathPolicy::Symmetric);
        assert_eq!(config.max_plaintext_len, 64);
        assert_eq!(config.ack_template, MeshConfig::default().ack_template);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            MeshConfig::from_json("{ not json"),
            Err(MeshError::Config(ConfigError::ParseFailed { .. }))
        ));
        assert!(MeshConfig::from_json(r#"{ "max_plaintext_len": 0 }"#).is_err());
        assert!(MeshConfig::from_json(r#"{ "path_policy": "sideways" }"#).is_err());
    }
}
