//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the bridge ledger service.
//! Configuration includes the administrative authority, amount and confirmation
//! policy, the initial validator set, snapshot location and API settings.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::controller::{BridgePolicy, MAX_DEPOSIT_AMOUNT, MIN_DEPOSIT_AMOUNT, REQUIRED_CONFIRMATIONS};
use crate::types::Principal;
use crate::validation::{is_valid_account_identity, AmountRange};

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV: &str = "BRIDGE_LEDGER_CONFIG_PATH";

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "config/bridge.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger policy and bootstrap settings
    pub bridge: BridgeConfig,
    /// API server configuration (host, port, CORS settings)
    pub api: ApiConfig,
}

/// Ledger policy and bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Administrative authority (destination-chain principal)
    pub admin: Principal,
    /// Smallest accepted deposit/withdrawal in source-chain minor units
    #[serde(default = "default_min_deposit_amount")]
    pub min_deposit_amount: u64,
    /// Largest accepted deposit/withdrawal in source-chain minor units
    #[serde(default = "default_max_deposit_amount")]
    pub max_deposit_amount: u64,
    /// Validator confirmations needed before a deposit is credited
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u32,
    /// Validators active at first start (ignored when a snapshot is restored)
    #[serde(default)]
    pub initial_validators: Vec<Principal>,
    /// Where ledger snapshots are persisted; in-memory only when unset
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_min_deposit_amount() -> u64 {
    MIN_DEPOSIT_AMOUNT
}

fn default_max_deposit_amount() -> u64 {
    MAX_DEPOSIT_AMOUNT
}

fn default_required_confirmations() -> u32 {
    REQUIRED_CONFIRMATIONS
}

impl BridgeConfig {
    /// Policy the controller enforces for this configuration.
    pub fn policy(&self) -> BridgePolicy {
        BridgePolicy {
            amounts: AmountRange::new(self.min_deposit_amount, self.max_deposit_amount),
            required_confirmations: self.required_confirmations,
        }
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// This function:
    /// 1. Uses the provided path, or BRIDGE_LEDGER_CONFIG_PATH, or config/bridge.toml
    /// 2. If the file exists, loads, parses and validates it
    /// 3. If it doesn't exist, returns an error asking user to copy the template
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - Failed to load configuration, file doesn't exist, or validation failed
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/bridge.template.toml config/bridge.toml\n\
                Then edit config/bridge.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks:
    /// - The admin is a well-formed principal
    /// - The amount range is non-empty and excludes zero
    /// - At least one confirmation is required
    /// - Initial validators are well-formed and unique
    /// - CORS origins are scheme + host
    pub fn validate(&self) -> anyhow::Result<()> {
        let bridge = &self.bridge;

        if !is_valid_account_identity(bridge.admin.as_str()) {
            return Err(anyhow::anyhow!(
                "Configuration error: admin '{}' is not a valid principal",
                bridge.admin
            ));
        }

        if bridge.min_deposit_amount == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: min_deposit_amount must be greater than zero"
            ));
        }

        if bridge.min_deposit_amount > bridge.max_deposit_amount {
            return Err(anyhow::anyhow!(
                "Configuration error: min_deposit_amount {} exceeds max_deposit_amount {}",
                bridge.min_deposit_amount,
                bridge.max_deposit_amount
            ));
        }

        if bridge.required_confirmations == 0 {
            return Err(anyhow::anyhow!(
                "Configuration error: required_confirmations must be at least 1"
            ));
        }

        let mut seen = HashSet::new();
        for validator in &bridge.initial_validators {
            if !is_valid_account_identity(validator.as_str()) {
                return Err(anyhow::anyhow!(
                    "Configuration error: initial validator '{}' is not a valid principal",
                    validator
                ));
            }
            if !seen.insert(validator) {
                return Err(anyhow::anyhow!(
                    "Configuration error: initial validator '{}' is listed twice",
                    validator
                ));
            }
        }

        for origin in &self.api.cors_origins {
            let has_scheme = origin.starts_with("http://") || origin.starts_with("https://");
            if !has_scheme || origin.contains(char::is_whitespace) || origin.ends_with('/') {
                return Err(anyhow::anyhow!(
                    "Configuration error: CORS origin '{}' must look like http(s)://host[:port]",
                    origin
                ));
            }
        }

        Ok(())
    }

    /// Creates a default configuration with placeholder values.
    ///
    /// This configuration is suitable for local development and testing.
    /// For production use, the admin must be replaced with the real
    /// administrative principal.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self {
            bridge: BridgeConfig {
                admin: Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"),
                min_deposit_amount: MIN_DEPOSIT_AMOUNT,
                max_deposit_amount: MAX_DEPOSIT_AMOUNT,
                required_confirmations: REQUIRED_CONFIRMATIONS,
                initial_validators: Vec::new(),
                state_file: None,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3335,
                cors_origins: vec!["http://localhost:3335".to_string()],
            },
        }
    }
}
