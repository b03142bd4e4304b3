//! Language item: one supported language and the culture it maps to.

use crate::error::Result;
use crate::i18n::Culture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A language the application provides localized resources for.
///
/// Items are built once at startup, registered with the
/// [`LanguageRegistry`](crate::i18n::LanguageRegistry), and cloned freely
/// afterwards. The JSON form (`{"Id","Name","Code","CultureCode"}`) is what
/// gets stored in the visitor session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageItem {
    /// Opaque identifier, carried but not interpreted
    #[serde(default)]
    pub id: String,

    /// Display name (e.g., "English", "Greek")
    pub name: String,

    /// Two-letter language code (e.g., "en", "el"); compared case-insensitively
    pub code: String,

    /// Locale identifier (e.g., "en-US", "el-GR")
    pub culture_code: String,
}

impl LanguageItem {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        culture_code: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            code: code.into(),
            culture_code: culture_code.into(),
        }
    }

    /// Set the opaque identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The synthetic English (en-US) item used when "en" was never registered.
    pub fn fallback() -> Self {
        Self::new("English", "en", "en-US")
    }

    /// Derive the culture this language maps to.
    ///
    /// # Returns
    /// * `Err(LocalizationError::MalformedCultureCode)` if `culture_code` is not a valid tag
    pub fn culture(&self) -> Result<Culture> {
        Culture::parse(&self.culture_code)
    }

    /// Registry lookup key for this item's code.
    pub(crate) fn key(&self) -> String {
        language_key(&self.code)
    }
}

impl fmt::Display for LanguageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.culture_code, self.name)
    }
}

/// Normalize a language code for lookup and comparison.
pub(crate) fn language_key(code: &str) -> String {
    code.trim().to_lowercase()
}
