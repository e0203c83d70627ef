//! Mock translation provider for testing
//!
//! A deterministic, network-free provider for exercising the registry, the
//! async fallback and health checks without API keys.
//!
//! # Example
//!
//! ```ignore
//! use mt_providers::providers::mock::{MockMode, MockProvider};
//! use mt_providers::{ProviderInfo, TranslationConfig};
//!
//! let factory = MockProvider::factory(ProviderInfo::new("mock"), MockMode::Suffix);
//! let provider = factory.create(TranslationConfig::new("test-key"))?;
//! assert_eq!(provider.translate("hello", "en", "fr").translated_text(), "hello_fr");
//! ```

use async_trait::async_trait;
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::TranslationConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Metadata, TranslationResponse};
use crate::core::provider::{ProviderBase, ProviderFactory, ProviderInfo, TranslationProvider};

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// Append target suffix: "hello" → "hello_fr"
    Suffix,
    /// "hello" → "HELLO"
    Uppercase,
    /// Return input unchanged
    NoOp,
    /// Every call fails with this message
    Error(String),
    /// The first `n` calls across all instances of one factory fail, later ones echo
    FailTimes(usize),
}

type DelayFn = dyn Fn(&str) -> Duration + Send + Sync;

/// How a mock provider behaves
#[derive(Clone)]
pub struct MockBehavior {
    mode: MockMode,
    delay: Arc<DelayFn>,
    batch_poison: Option<String>,
}

impl MockBehavior {
    /// Behave per `mode`, without delay or batching
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Arc::new(|_| Duration::ZERO),
            batch_poison: None,
        }
    }

    /// Simulated latency for every call
    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_fn(move |_| delay)
    }

    /// Simulated latency depending on the text being translated
    pub fn with_delay_fn<F>(mut self, delay: F) -> Self
    where
        F: Fn(&str) -> Duration + Send + Sync + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    /// Translate bulk requests as one batch; texts containing `poison` fail individually
    pub fn with_batch(mut self, poison: impl Into<String>) -> Self {
        self.batch_poison = Some(poison.into());
        self
    }
}

impl fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBehavior")
            .field("mode", &self.mode)
            .field("batch_poison", &self.batch_poison)
            .finish_non_exhaustive()
    }
}

/// Mock provider that simulates various translation scenarios
#[derive(Debug)]
pub struct MockProvider {
    base: ProviderBase,
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Factory producing mock providers declared as `info`
    pub fn factory(info: ProviderInfo, mode: MockMode) -> ProviderFactory {
        Self::factory_with(info, MockBehavior::new(mode))
    }

    /// Factory with full control over the simulated behavior.
    ///
    /// All instances created by one factory share a call counter, so
    /// [`MockMode::FailTimes`] spans instances.
    pub fn factory_with(info: ProviderInfo, behavior: MockBehavior) -> ProviderFactory {
        let calls = Arc::new(AtomicUsize::new(0));
        let declared = info.clone();
        ProviderFactory::new(info, move |config: TranslationConfig| {
            let provider: Arc<dyn TranslationProvider> = Arc::new(MockProvider {
                base: ProviderBase::new(declared.clone(), config)?,
                behavior: behavior.clone(),
                calls: Arc::clone(&calls),
            });
            Ok(provider)
        })
    }

    /// Calls made so far by every instance of this provider's factory
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_translation(&self, text: &str, target_lang: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target_lang)),
            MockMode::Uppercase => Ok(text.to_uppercase()),
            MockMode::NoOp => Ok(text.to_string()),
            MockMode::Error(message) => Err(TranslationError::NetworkError {
                message: message.clone(),
            }),
            MockMode::FailTimes(n) if call < *n => Err(TranslationError::NetworkError {
                message: format!("simulated transient failure {}/{}", call + 1, n),
            }),
            MockMode::FailTimes(_) => Ok(text.to_string()),
        }
    }

    fn respond(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
        match self.apply_translation(text, target_lang) {
            Ok(translated) => self.create_response(
                &translated,
                source_lang,
                target_lang,
                text.chars().count(),
                None,
                None,
            ),
            Err(e) => self.failure(text, source_lang, target_lang, &e),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn base(&self) -> &ProviderBase {
        &self.base
    }

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
        self.handle_rate_limit_blocking();
        let delay = (self.behavior.delay)(text);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.respond(text, source_lang, target_lang)
    }

    fn bulk_translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Vec<TranslationResponse> {
        let Some(poison) = &self.behavior.batch_poison else {
            return texts
                .iter()
                .map(|text| self.translate(text, source_lang, target_lang))
                .collect();
        };

        // One request for the whole batch.
        self.handle_rate_limit_blocking();
        let mut metadata = Metadata::new();
        metadata.insert("batch_size".to_string(), json!(texts.len()));

        texts
            .iter()
            .map(|text| {
                if text.contains(poison.as_str()) {
                    return self.failure(
                        text,
                        source_lang,
                        target_lang,
                        &TranslationError::ApiError {
                            status: 400,
                            message: "text rejected in batch".to_string(),
                        },
                    );
                }
                match self.apply_translation(text, target_lang) {
                    Ok(translated) => self.create_response(
                        &translated,
                        source_lang,
                        target_lang,
                        text.chars().count(),
                        None,
                        Some(metadata.clone()),
                    ),
                    Err(e) => self.failure(text, source_lang, target_lang, &e),
                }
            })
            .collect()
    }

    async fn translate_async(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResponse {
        self.handle_rate_limit().await;
        let delay = (self.behavior.delay)(text);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.respond(text, source_lang, target_lang)
    }
}
