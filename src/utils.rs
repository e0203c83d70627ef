//! Language code helpers

use regex::Regex;
use std::sync::LazyLock;

use crate::core::errors::{Result, TranslationError};

// ISO 639 language, optional ISO 15924 script, optional ISO 3166 region.
static LANGUAGE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(-[A-Z][a-z]{3})?(-[A-Z]{2})?$").expect("valid language code pattern")
});

/// Check that `code` looks like `en`, `zh-Hans` or `en-US`
pub fn validate_language_code(code: &str) -> bool {
    LANGUAGE_CODE.is_match(code)
}

/// Lowercase a valid language code, e.g. `en-US` → `en-us`
pub fn normalize_language_code(code: &str) -> Result<String> {
    if !validate_language_code(code) {
        return Err(TranslationError::ValidationError {
            message: format!("Invalid language code: {}", code),
        });
    }
    Ok(code.to_lowercase())
}
