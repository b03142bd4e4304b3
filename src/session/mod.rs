//! Per-visitor session storage.
//!
//! # Architecture
//!
//! - `backend`: the string-keyed store contract a session must satisfy
//! - `memory`: in-process implementation with idle expiry
//! - `store`: `SessionStore`, the typed JSON accessor handlers work with
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use session_locale::i18n::{LanguageItem, LanguageRegistry};
//! use session_locale::session::{MemorySessions, SessionStore};
//!
//! let registry = Arc::new(LanguageRegistry::new());
//! let sessions = MemorySessions::default();
//! let loaded = sessions.load_or_create(None);
//!
//! let session = SessionStore::new(loaded.session.clone(), registry);
//! assert_eq!(session.language().code, "en");
//!
//! session.set_language(Some(&LanguageItem::new("Greek", "el", "el-GR"))).unwrap();
//! assert_eq!(session.language().code, "el");
//!
//! // New sessions are only kept once committed
//! assert!(sessions.is_empty());
//! sessions.commit(&loaded);
//! assert_eq!(sessions.len(), 1);
//! ```

mod backend;
mod memory;
mod store;

pub use backend::SessionBackend;
pub use memory::{
    idle_timeout_from_minutes, LoadedSession, MemorySession, MemorySessions,
    DEFAULT_IDLE_TIMEOUT_MINUTES,
};
pub use store::{SessionStore, LANGUAGE_KEY};
