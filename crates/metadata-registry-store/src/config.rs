//! Registry configuration.

use metadata_registry_core::{SignatureContext, ValidationLimits, MAX_STATEMENT_SIZE};
use serde::{Deserialize, Serialize};

/// Configuration for a registry provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Domain separation context statements are signed under.
    pub signature_context: SignatureContext,
    /// Maximum size of a stored statement in bytes.
    pub max_statement_size: usize,
    /// Field validation bounds.
    pub limits: ValidationLimits,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            signature_context: SignatureContext::default(),
            max_statement_size: MAX_STATEMENT_SIZE,
            limits: ValidationLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_statement_size, 16 * 1024);
        assert_eq!(config.signature_context.as_str(), "metadata-registry/entity/v1");
        assert_eq!(config.limits.max_url_length, 64);
    }

    #[test]
    fn test_partial_json() {
        let config: RegistryConfig = serde_json::from_str(
            r#"{"max_statement_size": 1024, "limits": {"max_name_length": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.max_statement_size, 1024);
        assert_eq!(config.limits.max_name_length, 10);
        assert_eq!(config.limits.max_email_length, 32);
        assert_eq!(config.signature_context, SignatureContext::default());
    }

    #[test]
    fn test_rejects_empty_context() {
        assert!(serde_json::from_str::<RegistryConfig>(r#"{"signature_context": ""}"#).is_err());
    }
}
