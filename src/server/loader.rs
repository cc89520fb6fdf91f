//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and
//! environment, plus the secrets that only ever come from the environment.

use super::config::AppConfig;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use rumbo_llm::util::mask_api_key;
use std::fmt;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

pub const STRIPE_SECRET_KEY: &str = "STRIPE_SECRET_KEY";
pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("RUMBO_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority), e.g. RUMBO_SERVER__PORT
        .add_source(
            Environment::with_prefix("RUMBO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// API keys read from the environment
#[derive(Clone)]
pub struct Secrets {
    pub stripe_secret_key: String,
    pub google_maps_api_key: String,
    pub openai_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("stripe_secret_key", &mask_api_key(&self.stripe_secret_key))
            .field("google_maps_api_key", &mask_api_key(&self.google_maps_api_key))
            .field(
                "openai_api_key",
                &self.openai_api_key.as_deref().map(mask_api_key),
            )
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read secrets through `lookup`; every missing required key is
    /// reported at once
    pub fn from_lookup(
        config: &AppConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let stripe_secret_key = get(STRIPE_SECRET_KEY);
        let google_maps_api_key = get(GOOGLE_MAPS_API_KEY);
        let openai_api_key = get(OPENAI_API_KEY);

        let mut missing = Vec::new();
        if stripe_secret_key.is_none() {
            missing.push(STRIPE_SECRET_KEY);
        }
        if google_maps_api_key.is_none() {
            missing.push(GOOGLE_MAPS_API_KEY);
        }
        if config.llm.enabled && openai_api_key.is_none() {
            missing.push(OPENAI_API_KEY);
        }

        match (stripe_secret_key, google_maps_api_key) {
            (Some(stripe_secret_key), Some(google_maps_api_key)) if missing.is_empty() => {
                Ok(Self {
                    stripe_secret_key,
                    google_maps_api_key,
                    openai_api_key,
                })
            }
            _ => bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert!(!config.llm.enabled);
        assert_eq!(config.commerce.discount_percent, 12);
        assert_eq!(config.commerce.payment_currency, "mxn");
        assert_eq!(config.maps.command, "npx");
        assert!(config.orchestrator.purchase_includes_info);
    }

    #[test]
    fn test_required_secrets() {
        let config = AppConfig::default();
        let secrets = Secrets::from_lookup(
            &config,
            lookup(&[
                (STRIPE_SECRET_KEY, "sk_test_abcdefghijkl"),
                (GOOGLE_MAPS_API_KEY, "maps-key-123456"),
            ]),
        )
        .unwrap();
        assert!(secrets.openai_api_key.is_none());
        assert!(!format!("{:?}", secrets).contains("abcdefghijkl"));

        let err = Secrets::from_lookup(&config, lookup(&[(STRIPE_SECRET_KEY, " ")])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(STRIPE_SECRET_KEY));
        assert!(message.contains(GOOGLE_MAPS_API_KEY));
    }

    #[test]
    fn test_openai_key_required_only_with_llm() {
        let mut config = AppConfig::default();
        config.llm.enabled = true;
        let err = Secrets::from_lookup(
            &config,
            lookup(&[
                (STRIPE_SECRET_KEY, "sk_test_abcdefghijkl"),
                (GOOGLE_MAPS_API_KEY, "maps-key-123456"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY));
    }
}
