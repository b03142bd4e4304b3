//! Typed JSON access to a visitor session, including the selected language.

use crate::error::Result;
use crate::i18n::{LanguageItem, LanguageRegistry};
use crate::session::SessionBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Session key holding the visitor's selected language.
pub const LANGUAGE_KEY: &str = "language";

/// Typed accessor over one visitor's session.
///
/// Values are stored as JSON text. Keys are lower-cased before they reach the
/// backend, so `"Language"` and `"language"` address the same entry.
///
/// A `SessionStore` is cheap to clone and is handed to request handlers
/// through request extensions by the session middleware.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    registry: Arc<LanguageRegistry>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn SessionBackend>, registry: Arc<LanguageRegistry>) -> Self {
        Self { backend, registry }
    }

    /// Read and decode the value under `key`.
    ///
    /// # Returns
    /// * `Ok(None)` if nothing is stored
    /// * `Err(LocalizationError::Serialization)` if the stored text is not a valid `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(&session_key(key)) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Read the value under `key`, or `default` when absent or undecodable.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Discarding unreadable session value '{}': {}", key, e);
                default
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(&session_key(key), json);
        Ok(())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_or(key, None)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value)
    }

    /// Drop every value in this session, the language included.
    pub fn clear(&self) {
        self.backend.clear();
    }

    pub fn remove(&self, key: &str) {
        self.backend.remove(&session_key(key));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.backend.contains(&session_key(key))
    }

    /// The visitor's current language.
    ///
    /// Falls back to the registry's default language when nothing is stored or
    /// the stored value cannot be decoded. Never fails.
    pub fn language(&self) -> LanguageItem {
        self.get_or::<Option<LanguageItem>>(LANGUAGE_KEY, None)
            .unwrap_or_else(|| self.registry.default_language())
    }

    /// Store the visitor's language. `None` leaves the stored value untouched.
    pub fn set_language(&self, language: Option<&LanguageItem>) -> Result<()> {
        match language {
            Some(language) => self.set(LANGUAGE_KEY, language),
            None => Ok(()),
        }
    }

    /// The registry this session resolves defaults against.
    pub fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }
}

fn session_key(key: &str) -> String {
    key.to_lowercase()
}
