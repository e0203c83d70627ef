//! Custom error types for provider registration and translation operations

use std::fmt;

use thiserror::Error;

/// One entry point that could not be loaded or registered during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    /// Entry point name as declared
    pub entry_point: String,
    /// Human-readable reason
    pub reason: String,
}

impl fmt::Display for DiscoveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entry_point, self.reason)
    }
}

fn join_failures(failures: &[DiscoveryFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by the provider framework.
///
/// Structural errors (configuration, lookup, registration, discovery, validation)
/// propagate to the caller. The operational variants describe what went wrong
/// inside a provider call and only ever reach callers as the error string of a
/// failed [`TranslationResponse`](crate::core::models::TranslationResponse).
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Invalid or incomplete provider configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Lookup of an unregistered provider name
    #[error("Provider '{name}' not found. Available providers: {available:?}")]
    ProviderNotFound {
        /// Requested name
        name: String,
        /// Registered names at the time of the lookup
        available: Vec<String>,
    },

    /// A provider is already registered under this name
    #[error("Provider '{name}' is already registered")]
    AlreadyRegistered {
        /// Conflicting name
        name: String,
    },

    /// Provider names must be non-empty
    #[error("Provider name must be a non-empty string (got {name:?})")]
    InvalidProviderName {
        /// Rejected name
        name: String,
    },

    /// Provider declares a newer framework version than this one
    #[error("Provider {name} requires mt-providers>={required} (running {current})")]
    IncompatibleVersion {
        /// Provider name
        name: String,
        /// Minimum framework version the provider declares
        required: String,
        /// Running framework version
        current: String,
    },

    /// Malformed input to a validation helper
    #[error("Validation error: {message}")]
    ValidationError {
        /// What failed validation
        message: String,
    },

    /// One or more entry points failed during discovery
    #[error("Failed to discover {} provider(s): {}", failures.len(), join_failures(failures))]
    DiscoveryError {
        /// Every entry point that failed, in discovery order
        failures: Vec<DiscoveryFailure>,
    },

    /// Entry points could not be enumerated at all
    #[error("Failed to get entry points: {message}")]
    EntryPointError {
        /// Underlying failure
        message: String,
    },

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error body or description
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport failure description
        message: String,
    },

    /// Request timeout
    #[error("Request timeout after {seconds}s")]
    TimeoutError {
        /// Configured timeout
        seconds: u64,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What could not be parsed
        message: String,
    },

    /// Wrapper for unexpected internal failures
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Layered configuration could not be loaded
    #[error("Configuration load error: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
}

impl TranslationError {
    /// Shorthand for a [`TranslationError::ConfigError`]
    pub fn config(message: impl Into<String>) -> Self {
        TranslationError::ConfigError {
            message: message.into(),
        }
    }

    /// Whether retrying the same operation can never change the outcome
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            TranslationError::ConfigError { .. }
                | TranslationError::ProviderNotFound { .. }
                | TranslationError::InvalidProviderName { .. }
                | TranslationError::IncompatibleVersion { .. }
                | TranslationError::ValidationError { .. }
                | TranslationError::ConfigLoadError(_)
        )
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for provider framework operations
pub type Result<T> = std::result::Result<T, TranslationError>;
