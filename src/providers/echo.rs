//! Loopback provider
//!
//! Returns every text unchanged. Useful for wiring checks: it needs no network
//! access but still goes through validation, rate limiting and the async fallback.

use linkme::distributed_slice;
use serde_json::json;

use crate::core::config::TranslationConfig;
use crate::core::discovery::{EntryPoint, ENTRY_POINT_GROUP, PROVIDER_ENTRY_POINTS};
use crate::core::errors::Result;
use crate::core::models::{Metadata, TranslationResponse};
use crate::core::provider::{
    ProviderBase, ProviderFactory, ProviderInfo, ProviderType, TranslationProvider,
};

#[distributed_slice(PROVIDER_ENTRY_POINTS)]
static ECHO_ENTRY_POINT: EntryPoint = EntryPoint {
    group: ENTRY_POINT_GROUP,
    name: EchoProvider::NAME,
    load: load_echo,
};

fn load_echo() -> Result<ProviderFactory> {
    Ok(ProviderFactory::of::<EchoProvider>())
}

/// Provider that echoes its input
#[derive(Debug)]
pub struct EchoProvider {
    base: ProviderBase,
}

impl EchoProvider {
    /// Registered name
    pub const NAME: &'static str = "echo";
}

impl TranslationProvider for EchoProvider {
    fn base(&self) -> &ProviderBase {
        &self.base
    }

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> TranslationResponse {
        self.handle_rate_limit_blocking();

        let mut metadata = Metadata::new();
        metadata.insert("echo".to_string(), json!(true));
        self.create_response(
            text,
            source_lang,
            target_lang,
            text.chars().count(),
            None,
            Some(metadata),
        )
    }
}

impl ProviderType for EchoProvider {
    fn declared_info() -> ProviderInfo {
        ProviderInfo::new(Self::NAME)
    }

    fn from_config(config: TranslationConfig) -> Result<Self> {
        Ok(Self {
            base: ProviderBase::new(Self::declared_info(), config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;

    #[test]
    fn test_echo_returns_input() {
        let provider = EchoProvider::from_config(TranslationConfig::new("test-key")).unwrap();
        let response = provider.translate("Hello world", "en", "es");
        assert_eq!(response.translated_text(), "Hello world");
        assert_eq!(response.provider(), "echo");
        assert_eq!(response.char_count(), 11);
        assert_eq!(response.metadata()["echo"], json!(true));
    }

    #[test]
    fn test_echo_counts_characters_not_bytes() {
        let provider = EchoProvider::from_config(TranslationConfig::new("test-key")).unwrap();
        assert_eq!(provider.translate("¡Hola!", "es", "en").char_count(), 6);
    }

    #[test]
    fn test_echo_factory_uses_declared_info() {
        let factory = ProviderFactory::of::<EchoProvider>();
        assert_eq!(factory.name(), EchoProvider::NAME);
        assert_eq!(*factory.info(), EchoProvider::declared_info());

        let provider = factory.create(TranslationConfig::new("test-key")).unwrap();
        assert_eq!(*provider.info(), EchoProvider::declared_info());
    }

    #[test]
    fn test_echo_requires_key() {
        let err = EchoProvider::from_config(TranslationConfig::new("")).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_echo_async_fallback() {
        let provider = ProviderFactory::of::<EchoProvider>()
            .create(TranslationConfig::new("test-key"))
            .unwrap();
        let response = provider.translate_async("ping", "en", "fr").await;
        assert!(response.is_success());
        assert_eq!(response.translated_text(), "ping");
    }
}
