//! Internationalization (i18n) module: supported languages and their cultures.
//!
//! # Architecture
//!
//! - `registry`: the set of supported languages, with default-language fallback
//! - `language`: `LanguageItem`, one supported language
//! - `culture`: parsed locale tags and the culture active for a request
//!
//! # Example
//!
//! ```rust
//! use session_locale::i18n::{LanguageItem, LanguageRegistry};
//!
//! let registry = LanguageRegistry::new();
//! registry.add(LanguageItem::new("English", "en", "en-US")).unwrap();
//! registry.add(LanguageItem::new("Greek", "el", "el-GR")).unwrap();
//!
//! assert!(registry.contains("EL"));
//! assert_eq!(registry.find_or_default("fr").code, "en");
//! ```

mod culture;
mod language;
mod registry;

pub use culture::{current_culture, scope, Culture, RequestCulture};
pub use language::LanguageItem;
pub use registry::{LanguageRegistry, DEFAULT_LANGUAGE_CODE};
