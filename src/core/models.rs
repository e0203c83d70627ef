//! Core data models for translation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form metadata attached to a response
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Outcome of a translation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// Translation completed
    Success,
    /// Translation failed; see the response error
    Failed,
    /// Reserved for queued/asynchronous jobs
    Pending,
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationStatus::Success => write!(f, "success"),
            TranslationStatus::Failed => write!(f, "failed"),
            TranslationStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Standardized translation response.
///
/// Produced by every provider call and never mutated afterwards. The status is
/// derived from the error at construction, so a failed response always carries
/// an error and empty text, and a successful one never carries an error.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResponse {
    translated_text: String,
    source_lang: String,
    target_lang: String,
    provider: String,
    char_count: usize,
    status: TranslationStatus,
    error: Option<String>,
    request_id: String,
    timestamp: DateTime<Utc>,
    metadata: Metadata,
}

impl TranslationResponse {
    /// Build a response stamped with a fresh request id and the current time
    pub fn new(
        provider: &str,
        translated_text: &str,
        source_lang: &str,
        target_lang: &str,
        char_count: usize,
        error: Option<String>,
        metadata: Option<Metadata>,
    ) -> Self {
        let (status, translated_text) = match error {
            Some(_) => (TranslationStatus::Failed, String::new()),
            None => (TranslationStatus::Success, translated_text.to_string()),
        };

        Self {
            translated_text,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            provider: provider.to_string(),
            char_count,
            status,
            error,
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: metadata.unwrap_or_default(),
        }
    }

    /// Translated text, empty on failure
    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    /// Source language code as requested
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    /// Target language code as requested
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Name of the provider that produced this response
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Number of characters in the input text
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Outcome of the call
    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    /// Error description, present exactly when the status is failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Unique id of this response
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Creation time (UTC)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Provider-specific extras
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the status is success
    pub fn is_success(&self) -> bool {
        self.status == TranslationStatus::Success
    }

    /// Compare everything except the per-call request id and timestamp
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.translated_text == other.translated_text
            && self.source_lang == other.source_lang
            && self.target_lang == other.target_lang
            && self.provider == other.provider
            && self.char_count == other.char_count
            && self.status == other.status
            && self.error == other.error
            && self.metadata == other.metadata
    }
}
