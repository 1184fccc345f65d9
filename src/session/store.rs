//! Session handles and the in-memory session store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::ClientSession;
use crate::error::CheckerError;

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Shared handle to one checker session.
///
/// Cloning is cheap; all clones refer to the same state.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Unique session identifier.
    id: String,
    /// Held for the whole of an exchange, so a second request sees it locked.
    state: Mutex<ClientSession>,
    /// Session creation time.
    created_at: DateTime<Utc>,
    /// Last activity time.
    last_activity: RwLock<DateTime<Utc>>,
}

impl SessionHandle {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                state: Mutex::new(ClientSession::new()),
                created_at: now,
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Lock the state without waiting.
    ///
    /// Fails with [`CheckerError::Busy`] while another request holds it.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, ClientSession>, CheckerError> {
        self.touch();
        self.inner.state.try_lock().map_err(|_busy| CheckerError::Busy)
    }

    /// Copy of the current state, waiting for any in-flight request.
    pub async fn snapshot(&self) -> ClientSession {
        self.inner.state.lock().await.clone()
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match (Utc::now() - last).to_std() {
            Ok(idle) => idle > timeout,
            // Negative duration means clock skew.
            Err(_) => false,
        }
    }

    /// Get the session age.
    #[must_use]
    pub fn age(&self) -> Duration {
        (Utc::now() - self.inner.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Thread-safe store for sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new empty session and return it.
    #[must_use]
    pub fn create(&self) -> SessionHandle {
        self.insert_fresh(Uuid::new_v4().to_string())
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.read().get(id).cloned()
    }

    /// Resolve a client-supplied ID.
    ///
    /// Missing or unknown IDs (for example after expiry) get a new session
    /// with a new ID.
    #[must_use]
    pub fn resolve(&self, id: Option<&str>) -> SessionHandle {
        match id.filter(|id| !id.is_empty()).and_then(|id| self.get(id)) {
            Some(session) => session,
            None => {
                let session = self.create();
                tracing::debug!(
                    requested = ?id,
                    session_id = %session.id(),
                    "Created new session"
                );
                session
            }
        }
    }

    /// Swap the session stored under `id` for an empty one.
    ///
    /// Requests still holding the old handle finish against the detached state.
    #[must_use]
    pub fn replace(&self, id: &str) -> SessionHandle {
        self.insert_fresh(id.to_string())
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    fn insert_fresh(&self, id: String) -> SessionHandle {
        let session = SessionHandle::new(id.clone());
        self.write().insert(id, session.clone());
        session
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, SessionHandle>> {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SessionHandle>> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
