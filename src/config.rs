//! Registry configuration
//!
//! Supplies the pool names, the fee granularity and the native token that
//! backs fee payments. The native token is fixed at start-up and threaded
//! into genesis construction.

use crate::core::fee::FeeCurve;
use crate::ledger::module_address;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the registry's own pool; minted tokens and collected fees pass through it
pub const MODULE_NAME: &str = "token";

/// Pool receiving the community tax share of fees
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The default native token: six decimals, owned by the registry pool
pub fn default_native_token() -> Token {
    Token::new(
        "stake",
        "Network staking token",
        "ustake",
        6,
        2_000_000_000,
        10_000_000_000,
        true,
        module_address(MODULE_NAME),
    )
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Pool that mints new supply and receives fees
    pub module_name: String,
    /// Pool that receives the community tax
    pub fee_collector_name: String,
    /// Token fees are paid in
    pub native_token: Token,
    /// Fee granularity; one whole native token when unset
    pub power_reduction: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            module_name: MODULE_NAME.to_string(),
            fee_collector_name: FEE_COLLECTOR_NAME.to_string(),
            native_token: default_native_token(),
            power_reduction: None,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let config: RegistryConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable pool names or a malformed native token
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() || self.fee_collector_name.trim().is_empty() {
            return Err(ConfigError::Invalid("pool names must not be empty".to_string()));
        }
        if self.module_name == self.fee_collector_name {
            return Err(ConfigError::Invalid(
                "module and fee collector pools must differ".to_string(),
            ));
        }
        if self.power_reduction == Some(0) {
            return Err(ConfigError::Invalid(
                "power reduction must be positive".to_string(),
            ));
        }
        self.native_token
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Fee curve for this configuration
    pub fn fee_curve(&self) -> FeeCurve {
        match self.power_reduction {
            Some(unit) => FeeCurve::new(unit as u128),
            None => FeeCurve::for_scale(self.native_token.scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.native_token.symbol, "stake");
        assert_eq!(config.native_token.min_unit, "ustake");
        assert_eq!(config.fee_curve().power_reduction(), 1_000_000);
    }

    #[test]
    fn test_load_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{"fee_collector_name":"community","power_reduction":1}"#).unwrap();

        let config = RegistryConfig::load(&path).unwrap();
        assert_eq!(config.fee_collector_name, "community");
        assert_eq!(config.module_name, MODULE_NAME);
        assert_eq!(config.fee_curve().power_reduction(), 1);
    }

    #[test]
    fn test_invalid_config() {
        let config = RegistryConfig {
            fee_collector_name: MODULE_NAME.to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = RegistryConfig {
            power_reduction: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
