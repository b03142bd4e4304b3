//! Error taxonomy for language registration and session access.

use thiserror::Error;

/// Errors surfaced by the localization layer.
///
/// Per-request resolution never returns these to a visitor: a missing or
/// corrupted session language silently resolves to the default language.
/// Only registry misuse and bad startup configuration are reported.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// `LanguageRegistry::get` was asked for a code nobody registered.
    #[error("Language not registered: {code}")]
    NotRegistered { code: String },

    /// A culture code that cannot be parsed into a locale tag.
    #[error("Malformed culture code: '{culture_code}'")]
    MalformedCultureCode { culture_code: String },

    /// A session value could not be encoded as JSON.
    #[error("Failed to serialize session value: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = LocalizationError> = std::result::Result<T, E>;
