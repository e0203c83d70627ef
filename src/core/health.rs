//! Retrying provider health probe

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::TranslationConfig;
use crate::core::errors::Result;
use crate::core::registry::ProviderRegistry;

/// Source language of the probe translation
pub const PROBE_SOURCE_LANG: &str = "en";
/// Target language of the probe translation
pub const PROBE_TARGET_LANG: &str = "fr";
/// Text translated when the caller does not pick one
pub const DEFAULT_PROBE_TEXT: &str = "test";

/// Exponential backoff between health-check attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Seconds multiplied by `2^(retry - 1)`
    pub multiplier: f64,
    /// Floor for every wait
    pub min_wait: Duration,
    /// Ceiling for every wait
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1 for the first retry)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(63);
        let seconds = self.multiplier * 2_f64.powi(exponent as i32);
        let delay = if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).unwrap_or(self.max_wait)
        } else {
            Duration::ZERO
        };
        delay.clamp(self.min_wait, self.max_wait.max(self.min_wait))
    }
}

enum Probe {
    Healthy,
    Unhealthy(String),
}

impl ProviderRegistry {
    /// Check whether provider `name` translates successfully with `config`.
    ///
    /// Uses the default [`RetryPolicy`]: up to three attempts with 4-10 second
    /// waits. Never returns an error; any failure ends as `false`.
    pub async fn check_health(&self, name: &str, config: &TranslationConfig, test_text: &str) -> bool {
        self.check_health_with_policy(name, config, test_text, &RetryPolicy::default())
            .await
    }

    /// [`ProviderRegistry::check_health`] with an explicit retry policy.
    ///
    /// Unknown providers and configuration errors fail immediately since no
    /// retry can fix them; failed probe translations and other errors are retried.
    pub async fn check_health_with_policy(
        &self,
        name: &str,
        config: &TranslationConfig,
        test_text: &str,
        policy: &RetryPolicy,
    ) -> bool {
        let attempts = policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = policy.delay_for(attempt - 1);
                debug!("Retrying health check for {} in {:?}", name, delay);
                sleep(delay).await;
            }

            match self.probe(name, config, test_text).await {
                Ok(Probe::Healthy) => {
                    if attempt > 1 {
                        info!("Provider {} healthy after {} attempts", name, attempt);
                    }
                    return true;
                }
                Ok(Probe::Unhealthy(reason)) => {
                    warn!(
                        "Health check attempt {}/{} for provider {} failed: {}",
                        attempt, attempts, name, reason
                    );
                }
                Err(e) if e.is_permanent() => {
                    warn!("Health check failed for provider {}: {}", name, e);
                    return false;
                }
                Err(e) => {
                    warn!(
                        "Health check attempt {}/{} for provider {} errored: {}",
                        attempt, attempts, name, e
                    );
                }
            }
        }

        warn!("Provider {} unhealthy after {} attempts", name, attempts);
        false
    }

    async fn probe(&self, name: &str, config: &TranslationConfig, test_text: &str) -> Result<Probe> {
        let provider = self.create(name, config.clone())?;
        let response = provider
            .translate_async(test_text, PROBE_SOURCE_LANG, PROBE_TARGET_LANG)
            .await;

        if response.is_success() {
            Ok(Probe::Healthy)
        } else {
            Ok(Probe::Unhealthy(
                response
                    .error()
                    .unwrap_or("translation did not succeed")
                    .to_string(),
            ))
        }
    }
}

/// Check a provider in the global registry
pub async fn check_provider_health(name: &str, config: &TranslationConfig, test_text: &str) -> bool {
    ProviderRegistry::global()
        .check_health(name, config, test_text)
        .await
}
