//! Language registry: the set of languages the application supports.
//!
//! Unlike a global singleton, the registry is built by the composition root and
//! shared as an `Arc<LanguageRegistry>` with whatever needs it. Registration
//! normally happens once at startup; every operation is nonetheless safe under
//! concurrent access, guarded by a single mutex over the ordered item list.

use crate::error::{LocalizationError, Result};
use crate::i18n::language::language_key;
use crate::i18n::LanguageItem;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Code of the language that serves as the default.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Ordered, de-duplicated collection of supported languages.
///
/// Insertion order is registration order. No two entries share a code,
/// compared case-insensitively. There is no removal.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    items: Mutex<Vec<LanguageItem>>,
}

impl LanguageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry and register `items` in order.
    ///
    /// # Returns
    /// * `Err(LocalizationError::MalformedCultureCode)` on the first item whose culture code is invalid
    pub fn with_languages<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = LanguageItem>,
    {
        let registry = Self::new();
        for item in items {
            registry.add(item)?;
        }
        Ok(registry)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LanguageItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a language.
    ///
    /// A code that is already registered (in any casing) is silently ignored.
    ///
    /// # Returns
    /// * `Ok(true)` if the item was added
    /// * `Ok(false)` if an item with the same code already exists
    /// * `Err(LocalizationError::MalformedCultureCode)` if the culture code does not parse
    pub fn add(&self, item: LanguageItem) -> Result<bool> {
        item.culture()?;

        let key = item.key();
        let mut items = self.lock();
        if find_in(&items, &key).is_some() {
            debug!("Language '{}' already registered, ignoring", item.code);
            return Ok(false);
        }

        info!("Registered language {}", item);
        items.push(item);
        Ok(true)
    }

    /// Check whether a language with this code is registered.
    pub fn contains(&self, code: &str) -> bool {
        find_in(&self.lock(), &language_key(code)).is_some()
    }

    /// Find a language by code.
    ///
    /// # Returns
    /// * `Some(LanguageItem)` if registered
    /// * `None` otherwise
    pub fn find(&self, code: &str) -> Option<LanguageItem> {
        find_in(&self.lock(), &language_key(code)).cloned()
    }

    /// Find a language by code, falling back to [`default_language`](Self::default_language).
    pub fn find_or_default(&self, code: &str) -> LanguageItem {
        let items = self.lock();
        find_in(&items, &language_key(code))
            .cloned()
            .unwrap_or_else(|| default_in(&items))
    }

    /// Get a language that must be registered.
    ///
    /// Absence here is a bug in the caller, not a visitor condition.
    ///
    /// # Returns
    /// * `Err(LocalizationError::NotRegistered)` if no language has this code
    pub fn get(&self, code: &str) -> Result<LanguageItem> {
        self.find(code).ok_or_else(|| LocalizationError::NotRegistered {
            code: code.to_string(),
        })
    }

    /// The registered "en" language, or a synthetic English/en-US item.
    pub fn default_language(&self) -> LanguageItem {
        default_in(&self.lock())
    }

    /// Snapshot of all registered languages in registration order.
    pub fn items(&self) -> Vec<LanguageItem> {
        self.lock().clone()
    }

    /// Number of registered languages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn find_in<'a>(items: &'a [LanguageItem], key: &str) -> Option<&'a LanguageItem> {
    items.iter().find(|item| item.key() == key)
}

fn default_in(items: &[LanguageItem]) -> LanguageItem {
    find_in(items, DEFAULT_LANGUAGE_CODE)
        .cloned()
        .unwrap_or_else(LanguageItem::fallback)
}
