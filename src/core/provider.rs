//! Provider capability contract and the shared async/sync execution adapter
//!
//! A concrete provider embeds a [`ProviderBase`], implements
//! [`TranslationProvider::translate`], and optionally overrides
//! `bulk_translate` or (when it declares native async support)
//! `translate_async`. Callers never talk to the trait object directly: they go
//! through a [`Provider`] handle, which owns the fallback that offloads
//! synchronous providers to the blocking pool and the timeout guard around
//! every async call.

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{error, warn};

use crate::core::config::TranslationConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Metadata, TranslationResponse};
use crate::core::rate_limit::RateLimiter;

/// Default upper bound on characters per request
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 5000;

/// Oldest framework version a provider declares by default
pub const DEFAULT_MIN_SUPPORTED_VERSION: &str = "0.1.0";

/// Identity and capability flags declared by a provider type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// Unique provider name
    pub name: String,
    /// Configuration must carry a region
    pub requires_region: bool,
    /// Provider implements `translate_async` natively
    pub supports_async: bool,
    /// Advisory upper bound on characters per request
    pub max_chunk_size: usize,
    /// Oldest framework version this provider works with
    pub min_supported_version: String,
}

impl ProviderInfo {
    /// Synchronous provider named `name` with default limits
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_region: false,
            supports_async: false,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            min_supported_version: DEFAULT_MIN_SUPPORTED_VERSION.to_string(),
        }
    }

    /// Require `region` in the configuration
    pub fn with_region_required(mut self) -> Self {
        self.requires_region = true;
        self
    }

    /// Declare a native `translate_async` implementation
    pub fn with_native_async(mut self) -> Self {
        self.supports_async = true;
        self
    }

    /// Advisory upper bound on characters per request
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Oldest framework version the provider works with
    pub fn with_min_supported_version(mut self, version: impl Into<String>) -> Self {
        self.min_supported_version = version.into();
        self
    }
}

/// State every provider instance carries: declared info, validated config and
/// the lazily created rate limiter.
#[derive(Debug)]
pub struct ProviderBase {
    info: ProviderInfo,
    config: TranslationConfig,
    rate_limiter: OnceLock<Option<RateLimiter>>,
}

impl ProviderBase {
    /// Validate `config` against `info` and build the shared provider state.
    ///
    /// Fails with [`TranslationError::ConfigError`] before any network activity
    /// when the name is empty, the key is missing, a required region is missing
    /// or a numeric option is out of range.
    pub fn new(info: ProviderInfo, config: TranslationConfig) -> Result<Self> {
        if info.name.trim().is_empty() {
            return Err(TranslationError::config("Provider name must be set"));
        }
        config.validate(info.requires_region)?;

        Ok(Self {
            info,
            config,
            rate_limiter: OnceLock::new(),
        })
    }

    /// Declared identity and capabilities
    pub fn info(&self) -> &ProviderInfo {
        &self.info
    }

    /// Validated configuration
    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter
            .get_or_init(|| self.config.rate_limit.map(RateLimiter::new))
            .as_ref()
    }

    /// Wait for the configured rate limit, if any, suspending the current task
    pub async fn handle_rate_limit(&self) {
        if let Some(limiter) = self.rate_limiter() {
            limiter.acquire().await;
        }
    }

    /// Wait for the configured rate limit, if any, blocking the current thread
    pub fn handle_rate_limit_blocking(&self) {
        if let Some(limiter) = self.rate_limiter() {
            limiter.acquire_blocking();
        }
    }
}

/// Capability contract every translation provider implements.
///
/// `translate` must not fail: network and API problems are reported as a
/// failed [`TranslationResponse`] (see [`TranslationProvider::failure`]).
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Shared provider state
    fn base(&self) -> &ProviderBase;

    /// Translate a single text
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse;

    /// Translate many texts, one response per input in input order.
    ///
    /// Providers overriding this with a real batch call must still return a
    /// dedicated failed response for every text that fails inside the batch.
    fn bulk_translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Vec<TranslationResponse> {
        texts
            .iter()
            .map(|text| self.translate(text, source_lang, target_lang))
            .collect()
    }

    /// Native asynchronous translation.
    ///
    /// Only called through [`Provider::translate_async`] when
    /// [`ProviderInfo::supports_async`] is set; synchronous providers are
    /// offloaded to the blocking pool instead and never reach this method.
    async fn translate_async(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResponse {
        error!(
            "Provider {} declares native async support but does not implement translate_async",
            self.name()
        );
        self.failure(
            text,
            source_lang,
            target_lang,
            &TranslationError::InternalError("Async translation not implemented".to_string()),
        )
    }

    /// Declared identity and capabilities
    fn info(&self) -> &ProviderInfo {
        self.base().info()
    }

    /// Registered provider name
    fn name(&self) -> &str {
        &self.base().info().name
    }

    /// Whether the configuration must carry a region
    fn requires_region(&self) -> bool {
        self.base().info().requires_region
    }

    /// Whether `translate_async` is implemented natively
    fn supports_async(&self) -> bool {
        self.base().info().supports_async
    }

    /// Advisory upper bound on characters per request
    fn max_chunk_size(&self) -> usize {
        self.base().info().max_chunk_size
    }

    /// Validated configuration
    fn config(&self) -> &TranslationConfig {
        self.base().config()
    }

    /// Build a standardized response attributed to this provider
    fn create_response(
        &self,
        translated_text: &str,
        source_lang: &str,
        target_lang: &str,
        char_count: usize,
        error: Option<String>,
        metadata: Option<Metadata>,
    ) -> TranslationResponse {
        TranslationResponse::new(
            self.name(),
            translated_text,
            source_lang,
            target_lang,
            char_count,
            error,
            metadata,
        )
    }

    /// Build the failed response for `text`
    fn failure(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        error: &TranslationError,
    ) -> TranslationResponse {
        self.create_response(
            "",
            source_lang,
            target_lang,
            text.chars().count(),
            Some(error.to_string()),
            None,
        )
    }

    /// Wait for the configured rate limit before issuing a request
    async fn handle_rate_limit(&self) {
        self.base().handle_rate_limit().await;
    }

    /// Blocking variant of [`TranslationProvider::handle_rate_limit`] for `translate`
    fn handle_rate_limit_blocking(&self) {
        self.base().handle_rate_limit_blocking();
    }
}

/// A provider type that can be built from a configuration alone
pub trait ProviderType: TranslationProvider + Sized + 'static {
    /// Identity and capabilities declared by the type, before any instance exists
    fn declared_info() -> ProviderInfo;

    /// Construct and validate an instance
    fn from_config(config: TranslationConfig) -> Result<Self>;
}

type Constructor =
    dyn Fn(TranslationConfig) -> Result<Arc<dyn TranslationProvider>> + Send + Sync;

/// What the registry stores under a name: declared info plus a constructor.
///
/// Clones share the constructor, and equality is identity of that constructor,
/// so two lookups of the same registration compare equal.
#[derive(Clone)]
pub struct ProviderFactory {
    info: Arc<ProviderInfo>,
    constructor: Arc<Constructor>,
}

impl ProviderFactory {
    /// Wrap a constructor closure
    pub fn new<F>(info: ProviderInfo, constructor: F) -> Self
    where
        F: Fn(TranslationConfig) -> Result<Arc<dyn TranslationProvider>> + Send + Sync + 'static,
    {
        Self {
            info: Arc::new(info),
            constructor: Arc::new(constructor),
        }
    }

    /// Factory for a statically known provider type
    pub fn of<P: ProviderType>() -> Self {
        Self::new(P::declared_info(), |config| {
            let provider: Arc<dyn TranslationProvider> = Arc::new(P::from_config(config)?);
            Ok(provider)
        })
    }

    /// Declared identity and capabilities
    pub fn info(&self) -> &ProviderInfo {
        &self.info
    }

    /// Provider name
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Instantiate the provider with `config`
    pub fn create(&self, config: TranslationConfig) -> Result<Provider> {
        (self.constructor)(config).map(Provider::from_arc)
    }
}

impl PartialEq for ProviderFactory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.constructor, &other.constructor)
    }
}

impl Eq for ProviderFactory {}

impl fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Handle to a constructed provider instance
#[derive(Clone)]
pub struct Provider {
    inner: Arc<dyn TranslationProvider>,
}

impl Provider {
    /// Wrap a provider instance
    pub fn new<P: TranslationProvider + 'static>(provider: P) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    /// Wrap a shared provider instance
    pub fn from_arc(inner: Arc<dyn TranslationProvider>) -> Self {
        Self { inner }
    }

    /// Declared identity and capabilities
    pub fn info(&self) -> &ProviderInfo {
        self.inner.info()
    }

    /// Provider name
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Whether the configuration must carry a region
    pub fn requires_region(&self) -> bool {
        self.inner.requires_region()
    }

    /// Whether `translate_async` is implemented natively
    pub fn supports_async(&self) -> bool {
        self.inner.supports_async()
    }

    /// Advisory upper bound on characters per request
    pub fn max_chunk_size(&self) -> usize {
        self.inner.max_chunk_size()
    }

    /// Validated configuration
    pub fn config(&self) -> &TranslationConfig {
        self.inner.config()
    }

    /// Translate a single text, blocking the current thread
    pub fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
        self.inner.translate(text, source_lang, target_lang)
    }

    /// Translate many texts, blocking the current thread
    pub fn bulk_translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Vec<TranslationResponse> {
        self.inner.bulk_translate(texts, source_lang, target_lang)
    }

    /// Translate a single text without blocking the async scheduler.
    ///
    /// Providers with native async support are awaited directly; all others run
    /// `translate` on tokio's blocking pool. Either way the call is bounded by
    /// the configured timeout, and expiry is reported as a failed response.
    pub async fn translate_async(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResponse {
        let seconds = self.inner.config().timeout;
        let limit = Duration::from_secs(seconds);

        let outcome = if self.inner.supports_async() {
            tokio::time::timeout(limit, self.inner.translate_async(text, source_lang, target_lang))
                .await
                .map_err(|_| TranslationError::TimeoutError { seconds })
        } else {
            let provider = Arc::clone(&self.inner);
            let (owned_text, source, target) =
                (text.to_string(), source_lang.to_string(), target_lang.to_string());
            let task = tokio::task::spawn_blocking(move || {
                provider.translate(&owned_text, &source, &target)
            });

            match tokio::time::timeout(limit, task).await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(join_error)) => Err(TranslationError::InternalError(format!(
                    "Blocking translation task failed: {}",
                    join_error
                ))),
                Err(_) => Err(TranslationError::TimeoutError { seconds }),
            }
        };

        outcome.unwrap_or_else(|e| {
            warn!("Provider {} translation failed: {}", self.inner.name(), e);
            self.inner.failure(text, source_lang, target_lang, &e)
        })
    }

    /// Translate many texts concurrently, returning responses in input order
    pub async fn bulk_translate_async(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Vec<TranslationResponse> {
        join_all(
            texts
                .iter()
                .map(|text| self.translate_async(text, source_lang, target_lang)),
        )
        .await
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("info", self.inner.info())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TranslationStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct UpperProvider {
        base: ProviderBase,
    }

    impl TranslationProvider for UpperProvider {
        fn base(&self) -> &ProviderBase {
            &self.base
        }

        fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
            self.handle_rate_limit_blocking();
            self.create_response(
                &text.to_uppercase(),
                source_lang,
                target_lang,
                text.chars().count(),
                None,
                None,
            )
        }
    }

    impl ProviderType for UpperProvider {
        fn declared_info() -> ProviderInfo {
            ProviderInfo::new("upper")
        }

        fn from_config(config: TranslationConfig) -> Result<Self> {
            Ok(Self {
                base: ProviderBase::new(Self::declared_info(), config)?,
            })
        }
    }

    /// Declares native async but sleeps longer than any sane timeout.
    struct SlowAsyncProvider {
        base: ProviderBase,
    }

    #[async_trait]
    impl TranslationProvider for SlowAsyncProvider {
        fn base(&self) -> &ProviderBase {
            &self.base
        }

        fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
            self.create_response(text, source_lang, target_lang, text.len(), None, None)
        }

        async fn translate_async(
            &self,
            text: &str,
            source_lang: &str,
            target_lang: &str,
        ) -> TranslationResponse {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            self.translate(text, source_lang, target_lang)
        }
    }

    /// Declares native async without implementing it.
    struct ForgetfulProvider {
        base: ProviderBase,
    }

    impl TranslationProvider for ForgetfulProvider {
        fn base(&self) -> &ProviderBase {
            &self.base
        }

        fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
            self.create_response(text, source_lang, target_lang, text.len(), None, None)
        }
    }

    struct PanickingProvider {
        base: ProviderBase,
    }

    impl TranslationProvider for PanickingProvider {
        fn base(&self) -> &ProviderBase {
            &self.base
        }

        fn translate(&self, _text: &str, _source_lang: &str, _target_lang: &str) -> TranslationResponse {
            panic!("provider bug");
        }
    }

    fn config() -> TranslationConfig {
        TranslationConfig::new("test-key")
    }

    #[test]
    fn test_info_builder() {
        let info = ProviderInfo::new("microsoft")
            .with_region_required()
            .with_native_async()
            .with_max_chunk_size(10_000);
        assert!(info.requires_region);
        assert!(info.supports_async);
        assert_eq!(info.max_chunk_size, 10_000);
        assert_eq!(info.min_supported_version, DEFAULT_MIN_SUPPORTED_VERSION);
    }

    #[test]
    fn test_base_rejects_empty_name() {
        let err = ProviderBase::new(ProviderInfo::new(""), config()).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[test]
    fn test_base_validates_region_before_use() {
        let info = ProviderInfo::new("regional").with_region_required();
        let err = ProviderBase::new(info, TranslationConfig::new("")).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));

        let info = ProviderInfo::new("regional").with_region_required();
        let err = ProviderBase::new(info, config()).unwrap_err();
        assert!(err.to_string().contains("Region is required"));
    }

    #[test]
    fn test_create_response_uses_provider_name() {
        let provider = UpperProvider::from_config(config()).unwrap();
        let response = provider.create_response("hola", "en", "es", 5, None, None);
        assert_eq!(response.provider(), "upper");
        assert_eq!(response.status(), TranslationStatus::Success);

        let failed = provider.failure(
            "hello",
            "en",
            "es",
            &TranslationError::NetworkError {
                message: "connection reset".to_string(),
            },
        );
        assert_eq!(failed.status(), TranslationStatus::Failed);
        assert_eq!(failed.char_count(), 5);
        assert_eq!(failed.error(), Some("Network error: connection reset"));
    }

    #[test]
    fn test_factory_creates_validated_provider() {
        let factory = ProviderFactory::of::<UpperProvider>();
        assert_eq!(factory.name(), "upper");

        let provider = factory.create(config()).unwrap();
        let response = provider.translate("hi", "en", "es");
        assert_eq!(response.translated_text(), "HI");

        assert!(factory.create(TranslationConfig::new(" ")).is_err());
    }

    #[test]
    fn test_factory_identity() {
        let factory = ProviderFactory::of::<UpperProvider>();
        let clone = factory.clone();
        assert_eq!(factory, clone);
        assert_ne!(factory, ProviderFactory::of::<UpperProvider>());
    }

    #[test]
    fn test_declared_info_matches_instance_info() {
        let factory = ProviderFactory::of::<UpperProvider>();
        assert_eq!(*factory.info(), UpperProvider::declared_info());

        let instance = UpperProvider::from_config(config()).unwrap();
        assert_eq!(*instance.info(), UpperProvider::declared_info());
        assert_eq!(instance.name(), "upper");
    }

    #[test]
    fn test_default_bulk_translate_preserves_order() {
        let provider = ProviderFactory::of::<UpperProvider>().create(config()).unwrap();
        let texts: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let responses = provider.bulk_translate(&texts, "en", "es");
        let translated: Vec<_> = responses.iter().map(|r| r.translated_text()).collect();
        assert_eq!(translated, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_async_fallback_matches_sync() {
        let provider = ProviderFactory::of::<UpperProvider>().create(config()).unwrap();
        assert!(!provider.supports_async());

        let sync = provider.translate("hello world", "en", "fr");
        let fallback = provider.translate_async("hello world", "en", "fr").await;
        assert!(fallback.same_outcome(&sync));
        assert_ne!(fallback.request_id(), sync.request_id());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_async_fallback_does_not_block_scheduler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = ProviderFactory::new(ProviderInfo::new("sleepy"), move |config| {
            struct Sleepy {
                base: ProviderBase,
            }
            impl TranslationProvider for Sleepy {
                fn base(&self) -> &ProviderBase {
                    &self.base
                }
                fn translate(&self, text: &str, s: &str, t: &str) -> TranslationResponse {
                    std::thread::sleep(Duration::from_millis(200));
                    self.create_response(text, s, t, text.len(), None, None)
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let provider: Arc<dyn TranslationProvider> = Arc::new(Sleepy {
                base: ProviderBase::new(ProviderInfo::new("sleepy"), config)?,
            });
            Ok(provider)
        });
        let provider = factory.create(config()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let ticker = tokio::spawn(async {
            let mut ticks = 0;
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks += 1;
            }
            ticks
        });

        let response = provider.translate_async("zzz", "en", "fr").await;
        assert!(response.is_success());
        // The single scheduler thread kept running the ticker while translate slept.
        assert!(ticker.is_finished());
        assert_eq!(ticker.await.unwrap(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_native_async_timeout_becomes_failed_response() {
        let base = ProviderBase::new(
            ProviderInfo::new("slow").with_native_async(),
            config().with_timeout(2),
        )
        .unwrap();
        let provider = Provider::new(SlowAsyncProvider { base });

        let response = provider.translate_async("hello", "en", "fr").await;
        assert_eq!(response.status(), TranslationStatus::Failed);
        assert!(response.error().unwrap().contains("timeout"));
        assert_eq!(response.provider(), "slow");
    }

    #[tokio::test]
    async fn test_unimplemented_native_async_is_reported() {
        let base =
            ProviderBase::new(ProviderInfo::new("forgetful").with_native_async(), config()).unwrap();
        let provider = Provider::new(ForgetfulProvider { base });

        let response = provider.translate_async("hello", "en", "fr").await;
        assert_eq!(response.status(), TranslationStatus::Failed);
        assert!(response.error().unwrap().contains("not implemented"));
    }

    #[tokio::test]
    async fn test_panicking_provider_becomes_failed_response() {
        let base = ProviderBase::new(ProviderInfo::new("panicky"), config()).unwrap();
        let provider = Provider::new(PanickingProvider { base });

        let response = provider.translate_async("hello", "en", "fr").await;
        assert_eq!(response.status(), TranslationStatus::Failed);
        assert!(response.error().unwrap().contains("Blocking translation task failed"));
    }

    #[test]
    fn test_unrepresentable_rate_limit_rejected_at_construction() {
        for rate in [1e-320, 1e-19] {
            let err = UpperProvider::from_config(config().with_rate_limit(rate)).unwrap_err();
            assert!(matches!(err, TranslationError::ConfigError { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_applies_per_instance() {
        let provider = UpperProvider::from_config(config().with_rate_limit(2.0)).unwrap();
        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            provider.handle_rate_limit().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(999));

        let unlimited = UpperProvider::from_config(config()).unwrap();
        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            unlimited.handle_rate_limit().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
