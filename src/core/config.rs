//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::rate_limit::{interval_for, MAX_INTERVAL};

/// Environment variable prefix used by [`TranslationConfig::load`]
pub const ENV_PREFIX: &str = "MT";

fn default_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> f64 {
    1.0
}

/// Connection parameters handed to every provider instance.
///
/// Built once by the caller and moved into exactly one provider; providers
/// only ever read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Authentication key
    pub api_key: String,
    /// Endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Service region, required by some providers
    #[serde(default)]
    pub region: Option<String>,
    /// Network timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Requests-per-second cap
    #[serde(default)]
    pub rate_limit: Option<f64>,
    #[serde(default = "default_retry_attempts")]
    /// Attempts a provider makes per request before giving up
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff")]
    /// Base backoff in seconds between provider retries
    pub retry_backoff: f64,
}

impl TranslationConfig {
    /// Create a configuration with the documented defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            region: None,
            timeout: default_timeout(),
            rate_limit: None,
            retry_attempts: default_retry_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }

    /// Override the service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the service region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the network timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Cap requests per second for each provider instance
    pub fn with_rate_limit(mut self, requests_per_second: f64) -> Self {
        self.rate_limit = Some(requests_per_second);
        self
    }

    /// Set retry attempts and base backoff in seconds
    pub fn with_retry(mut self, attempts: u32, backoff: f64) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff = backoff;
        self
    }

    /// Validate configuration for a provider
    pub fn validate(&self, requires_region: bool) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TranslationError::config("API key is required"));
        }

        if requires_region
            && self
                .region
                .as_deref()
                .map_or(true, |region| region.trim().is_empty())
        {
            return Err(TranslationError::config(
                "Region is required for this provider",
            ));
        }

        if self.timeout < 1 {
            return Err(TranslationError::config(
                "timeout must be at least 1 second",
            ));
        }

        if let Some(rate) = self.rate_limit {
            if interval_for(rate).is_none() {
                return Err(TranslationError::config(format!(
                    "rate_limit must allow at least one request per {}s (got {})",
                    MAX_INTERVAL.as_secs(),
                    rate
                )));
            }
        }

        if !self.retry_backoff.is_finite() || self.retry_backoff < 0.0 {
            return Err(TranslationError::config(format!(
                "retry_backoff must not be negative (got {})",
                self.retry_backoff
            )));
        }

        Ok(())
    }

    /// Load configuration from an optional file layered under `MT_*` environment variables.
    ///
    /// The file format is picked from its extension (TOML, JSON, YAML, ...).
    /// Environment variables win over file values, e.g. `MT_API_KEY`, `MT_REGION`,
    /// `MT_TIMEOUT`, `MT_RATE_LIMIT`.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            let path = path.as_ref();
            debug!("Loading provider configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        info!(
            "Loaded provider configuration (region: {:?}, rate_limit: {:?})",
            config.region, config.rate_limit
        );
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        Self::load(None::<&Path>)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TranslationConfig::new("test-key");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_backoff, 1.0);
        assert!(config.endpoint.is_none());
        assert!(config.region.is_none());
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = TranslationConfig::new("test-key").with_region("westus2");
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslationConfig::new("");
        let err = config.validate(false).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
        assert!(err.to_string().contains("API key is required"));
    }

    #[test]
    fn test_config_validation_missing_region() {
        let config = TranslationConfig::new("test-key");
        assert!(config.validate(false).is_ok());
        assert!(matches!(
            config.validate(true),
            Err(TranslationError::ConfigError { .. })
        ));

        let blank = TranslationConfig::new("test-key").with_region("  ");
        assert!(blank.validate(true).is_err());
    }

    #[test]
    fn test_config_validation_numeric_bounds() {
        assert!(TranslationConfig::new("k").with_timeout(0).validate(false).is_err());
        assert!(TranslationConfig::new("k").with_rate_limit(0.0).validate(false).is_err());
        assert!(TranslationConfig::new("k").with_rate_limit(-1.0).validate(false).is_err());
        assert!(TranslationConfig::new("k")
            .with_rate_limit(f64::NAN)
            .validate(false)
            .is_err());
        assert!(TranslationConfig::new("k").with_retry(3, -0.5).validate(false).is_err());
        assert!(TranslationConfig::new("k").with_rate_limit(0.5).validate(false).is_ok());
    }

    #[test]
    fn test_config_validation_rejects_unrepresentable_rate() {
        for rate in [1e-320, 1e-19, 1.0 / (2.0 * 86_400.0)] {
            let err = TranslationConfig::new("k")
                .with_rate_limit(rate)
                .validate(false)
                .unwrap_err();
            assert!(matches!(err, TranslationError::ConfigError { .. }));
            assert!(err.to_string().contains("rate_limit"));
        }
        assert!(TranslationConfig::new("k")
            .with_rate_limit(1.0 / 1024.0)
            .validate(false)
            .is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_key = \"file-key\"\nregion = \"westus2\"\nrate_limit = 2.5\ntimeout = 10"
        )
        .unwrap();

        let config = TranslationConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.region.as_deref(), Some("westus2"));
        assert_eq!(config.rate_limit, Some(2.5));
        assert_eq!(config.timeout, 10);
        assert_eq!(config.retry_attempts, 3);

        // Environment overrides the file. Kept in this test so no other load races the variable.
        std::env::set_var("MT_REGION", "eastus");
        let layered = TranslationConfig::load(Some(file.path()));
        std::env::remove_var("MT_REGION");

        let layered = layered.unwrap();
        assert_eq!(layered.region.as_deref(), Some("eastus"));
        assert_eq!(layered.api_key, "file-key");
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.json");

        let config = TranslationConfig::new("test-key")
            .with_endpoint("https://example.test/translate")
            .with_rate_limit(4.0);
        config.to_file(&path).unwrap();

        let loaded = TranslationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_applies_serde_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.json");
        std::fs::write(&path, r#"{"api_key": "only-key"}"#).unwrap();

        let loaded = TranslationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, TranslationConfig::new("only-key"));
    }
}
