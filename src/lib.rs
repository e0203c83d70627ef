//! mt-providers - Pluggable machine translation provider framework
//!
//! Providers implement one capability contract, register themselves in a
//! thread-safe registry (directly or through link-time discovery) and get a
//! uniform async interface, client-side rate limiting and health checks.
//!
//! ```
//! use mt_providers::providers::mock::{MockMode, MockProvider};
//! use mt_providers::{ProviderInfo, ProviderRegistry, TranslationConfig};
//!
//! let registry = ProviderRegistry::new();
//! registry.register("mock", MockProvider::factory(ProviderInfo::new("mock"), MockMode::Suffix))?;
//!
//! let provider = registry.create("mock", TranslationConfig::new("test-key"))?;
//! assert_eq!(provider.translate("hello", "en", "fr").translated_text(), "hello_fr");
//! # Ok::<(), mt_providers::TranslationError>(())
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod logging;
pub mod providers;
pub mod utils;

// Re-export key types for convenience
pub use core::{
    config::TranslationConfig,
    discovery::{discover_providers, EntryPoint, ENTRY_POINT_GROUP, PROVIDER_ENTRY_POINTS},
    errors::{Result, TranslationError},
    health::{check_provider_health, RetryPolicy},
    models::{Metadata, TranslationResponse, TranslationStatus},
    provider::{
        Provider, ProviderBase, ProviderFactory, ProviderInfo, ProviderType, TranslationProvider,
    },
    rate_limit::RateLimiter,
    registry::{get_provider, list_providers, register_provider, ProviderRegistry},
};

pub use utils::{normalize_language_code, validate_language_code};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
