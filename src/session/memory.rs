//! In-process session storage with idle expiry.

use crate::session::SessionBackend;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Idle time after which a session is discarded.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 20;

/// Convert a minute count into an idle timeout.
///
/// # Returns
/// * `None` if `minutes` is not positive or exceeds what `chrono::Duration` can hold
pub fn idle_timeout_from_minutes(minutes: i64) -> Option<Duration> {
    if minutes <= 0 {
        return None;
    }
    Duration::try_minutes(minutes)
}

/// One visitor's values, held in process memory.
#[derive(Debug)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
    last_access: Mutex<DateTime<Utc>>,
    modified: AtomicBool,
}

impl MemorySession {
    fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            last_access: Mutex::new(Utc::now()),
            modified: AtomicBool::new(false),
        }
    }

    /// True once any value has been written to this session.
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    fn touch(&self) {
        *self.last_access.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    fn last_access(&self) -> DateTime<Utc> {
        *self.last_access.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_access() > idle_timeout
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, by: Duration) {
        *self.last_access.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now() - by;
    }
}

impl SessionBackend for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        self.modified.store(true, Ordering::Release);
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn contains(&self, key: &str) -> bool {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

/// Result of resolving a session cookie.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub id: String,
    pub session: Arc<MemorySession>,
    /// True when no live session matched and a fresh one was created.
    /// A new session is not held by [`MemorySessions`] until committed.
    pub is_new: bool,
}

/// Thread-safe map of session id to session.
#[derive(Debug, Clone)]
pub struct MemorySessions {
    sessions: Arc<RwLock<HashMap<String, Arc<MemorySession>>>>,
    idle_timeout: Duration,
}

impl Default for MemorySessions {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }
}

impl MemorySessions {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// The idle time after which a session expires.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Resolve `id` to a live session, or create a new one.
    ///
    /// An unknown or expired id never gets reused; the new session always
    /// receives a freshly generated id. New sessions are detached: they are
    /// only stored once passed to [`commit`](Self::commit), so visitors who
    /// never write anything leave nothing behind.
    pub fn load_or_create(&self, id: Option<&str>) -> LoadedSession {
        let now = Utc::now();

        if let Some(id) = id {
            let existing = self
                .sessions
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(id)
                .cloned();

            match existing {
                Some(session) if !session.is_expired(self.idle_timeout, now) => {
                    session.touch();
                    return LoadedSession {
                        id: id.to_string(),
                        session,
                        is_new: false,
                    };
                }
                Some(_) => {
                    debug!("Session {} expired, starting a new one", id);
                    self.remove(id);
                }
                None => debug!("Unknown session id, starting a new one"),
            }
        }

        LoadedSession {
            id: Uuid::new_v4().to_string(),
            session: Arc::new(MemorySession::new()),
            is_new: true,
        }
    }

    /// Store a loaded session under its id.
    pub fn commit(&self, loaded: &LoadedSession) {
        loaded.session.touch();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(loaded.id.clone(), Arc::clone(&loaded.session));
    }

    /// Get a session by id without creating or refreshing it.
    pub fn get(&self, id: &str) -> Option<Arc<MemorySession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<MemorySession>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Drop every session idle longer than the timeout.
    ///
    /// # Returns
    /// The number of sessions removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.idle_timeout, now));
        before - sessions.len()
    }

    /// Number of sessions held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
