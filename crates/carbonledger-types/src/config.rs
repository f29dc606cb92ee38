//! Configuration for a CarbonLedger instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Principal, Result, constants};

/// Bootstrap configuration for a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Principal that receives both the admin and issuer roles at startup.
    pub admin: Principal,
    /// Prefix for per-batch metadata URIs; the decimal batch id is appended.
    #[serde(default = "default_metadata_base_uri")]
    pub metadata_base_uri: String,
    /// Upper bound on a retirement reason, in bytes.
    #[serde(default = "default_max_reason_len")]
    pub max_reason_len: usize,
}

fn default_metadata_base_uri() -> String {
    constants::DEFAULT_METADATA_BASE_URI.to_string()
}

fn default_max_reason_len() -> usize {
    constants::DEFAULT_MAX_REASON_LEN
}

impl LedgerConfig {
    /// Config with defaults for everything but the bootstrap admin.
    #[must_use]
    pub fn new(admin: Principal) -> Self {
        Self {
            admin,
            metadata_base_uri: default_metadata_base_uri(),
            max_reason_len: default_max_reason_len(),
        }
    }

    #[must_use]
    pub fn with_metadata_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.metadata_base_uri = base_uri.into();
        self
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configs the ledger cannot bootstrap from.
    pub fn validate(&self) -> Result<()> {
        if !self.admin.is_well_formed() {
            return Err(LedgerError::Configuration(
                "admin must not be the nil principal".into(),
            ));
        }
        if self.metadata_base_uri.is_empty() {
            return Err(LedgerError::Configuration(
                "metadata_base_uri must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let admin = Principal::new();
        let cfg = LedgerConfig::new(admin);
        assert_eq!(cfg.admin, admin);
        assert_eq!(cfg.metadata_base_uri, "https://example.com/metadata/");
        assert_eq!(cfg.max_reason_len, 1024);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_minimal_json() {
        let admin = Principal::new();
        let json = format!(r#"{{"admin":"{admin}"}}"#);
        let cfg = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, LedgerConfig::new(admin));
    }

    #[test]
    fn nil_admin_rejected() {
        let json = r#"{"admin":"00000000-0000-0000-0000-000000000000"}"#;
        let err = LedgerConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn empty_base_uri_rejected() {
        let cfg = LedgerConfig::new(Principal::new()).with_metadata_base_uri("");
        assert!(matches!(
            cfg.validate().unwrap_err(),
            LedgerError::Configuration(_)
        ));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = LedgerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LedgerConfig::load("/nonexistent/carbonledger.json").unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
