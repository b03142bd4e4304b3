//! The storage contract behind a visitor session.

/// A per-visitor, string-keyed value store.
///
/// This is the contract the session accessor consumes. Lifecycle and expiry
/// belong to the implementation. Keys arrive already normalized by
/// [`SessionStore`](crate::session::SessionStore).
pub trait SessionBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Drop every value in this session.
    fn clear(&self);

    fn contains(&self, key: &str) -> bool;
}
