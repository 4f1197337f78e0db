//! Client configuration.
//!
//! This module defines the TOML/env-loadable configuration for [`BraspagClient`] and the
//! static table of gateway hosts per environment.
//!
//! # Examples
//!
//! ```toml
//! merchant_id = "94e5ea52-79b0-7dba-1867-be7b081edd97"
//! merchant_key = "..."
//! environment = "sandbox"
//! timeout_secs = 10
//! ```
//!
//! [`BraspagClient`]: crate::client::BraspagClient

use std::{fmt, path::Path, time::Duration};

use serde::Deserialize;
use zeroize::Zeroize;

use crate::error::{BraspagError, Result};

/// Environment variable holding the merchant id.
pub const ENV_MERCHANT_ID: &str = "BRASPAG_MERCHANT_ID";
/// Environment variable holding the merchant key.
pub const ENV_MERCHANT_KEY: &str = "BRASPAG_MERCHANT_KEY";
/// Environment variable selecting `sandbox` or `production`.
pub const ENV_ENVIRONMENT: &str = "BRASPAG_ENVIRONMENT";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "BRASPAG_TIMEOUT_SECS";

/// Gateway environment.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Homologation hosts, for integration testing.
    #[default]
    #[serde(alias = "homologation")]
    Sandbox,
    /// Live hosts.
    Production,
}

impl Environment {
    /// Returns the pair of base hosts for this environment.
    #[must_use]
    pub const fn hosts(self) -> GatewayHosts<'static> {
        match self {
            Self::Sandbox => GatewayHosts {
                query_url: "https://apiqueryhomolog.braspag.com.br",
                transaction_url: "https://apihomolog.braspag.com.br",
            },
            Self::Production => GatewayHosts {
                query_url: "https://apiquery.braspag.com.br",
                transaction_url: "https://api.braspag.com.br",
            },
        }
    }

    /// Parses an environment name as used in [`ENV_ENVIRONMENT`].
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] for unknown names.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "sandbox" | "homologation" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(BraspagError::Config(format!("unknown environment '{other}'"))),
        }
    }
}

/// Base hosts of the gateway.
///
/// Read operations go to `query_url`, everything else to `transaction_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayHosts<'a> {
    /// Host serving query (read-only) resources.
    pub query_url: &'a str,
    /// Host serving transactional resources.
    pub transaction_url: &'a str,
}

/// Merchant secret key.
///
/// Never printed by `Debug` and wiped from memory on drop.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MerchantKey(String);

impl MerchantKey {
    /// Wraps a secret key.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Exposes the secret, for the `MerchantKey` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MerchantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MerchantKey([REDACTED])")
    }
}

impl Drop for MerchantKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Client configuration, immutable once the client is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Merchant identifier sent as the `MerchantId` header.
    pub merchant_id: String,

    /// Merchant secret sent as the `MerchantKey` header.
    pub merchant_key: MerchantKey,

    /// Selects the gateway hosts.
    #[serde(default)]
    pub environment: Environment,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            merchant_key: MerchantKey::default(),
            environment: Environment::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the default environment and timeout.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(merchant_id: impl Into<String>, merchant_key: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_key: MerchantKey::new(merchant_key),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| BraspagError::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if the file cannot be read or is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BraspagError::Config(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Builds a configuration from `BRASPAG_*` environment variables.
    ///
    /// The environment defaults to sandbox and the timeout to 10 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if a merchant credential is unset, the environment
    /// is unknown, the timeout is not numeric or the result fails
    /// [`validate`](Self::validate).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let environment = lookup(ENV_ENVIRONMENT)
            .map(|name| Environment::parse(&name))
            .transpose()?
            .unwrap_or_default();

        let timeout_secs = lookup(ENV_TIMEOUT_SECS)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    BraspagError::Config(format!("{ENV_TIMEOUT_SECS} must be an integer: {e}"))
                })
            })
            .transpose()?
            .unwrap_or_else(default_timeout_secs);

        let required = |name: &str| {
            lookup(name).ok_or_else(|| BraspagError::Config(format!("{name} is not set")))
        };

        let config = Self {
            merchant_id: required(ENV_MERCHANT_ID)?,
            merchant_key: MerchantKey::new(required(ENV_MERCHANT_KEY)?),
            environment,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::Config`] if:
    /// - `timeout_secs` is outside 1-300 seconds
    /// - merchant id or key is blank
    /// - merchant id or key contain control characters (they become header values)
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(BraspagError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.merchant_id.trim().is_empty() {
            return Err(BraspagError::Config("merchant_id must not be empty".to_owned()));
        }
        if self.merchant_key.expose().trim().is_empty() {
            return Err(BraspagError::Config("merchant_key must not be empty".to_owned()));
        }
        if self.merchant_id.chars().any(char::is_control) {
            return Err(BraspagError::Config(
                "merchant_id must not contain control characters".to_owned(),
            ));
        }
        if self.merchant_key.expose().chars().any(char::is_control) {
            return Err(BraspagError::Config(
                "merchant_key must not contain control characters".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}
