use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use picker::NarrowingSession;
use shared::domain::SessionId;

/// Shared handle to one session. Holding its lock serialises every pick and
/// toggle aimed at that session.
pub type SessionHandle = Arc<Mutex<NarrowingSession>>;

/// Keyed storage for narrowing sessions.
///
/// Only the request boundary creates and evicts entries.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: SessionId) -> Option<SessionHandle>;
    /// Inserts or replaces the session stored under `id`.
    fn put(&self, id: SessionId, session: NarrowingSession) -> SessionHandle;
    fn delete(&self, id: SessionId) -> bool;
    fn len(&self) -> usize;
    /// Drops sessions not touched since `now - max_idle`, returning how many went.
    fn evict_idle_at(&self, now: DateTime<Utc>, max_idle: Duration) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        self.evict_idle_at(Utc::now(), max_idle)
    }
}

/// Locks a session, recovering the state if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, NarrowingSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

struct StoredSession {
    handle: SessionHandle,
    touched_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, StoredSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn touched_at(&self, id: SessionId) -> Option<DateTime<Utc>> {
        self.sessions().get(&id).map(|stored| stored.touched_at)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions();
        let stored = sessions.get_mut(&id)?;
        stored.touched_at = Utc::now();
        Some(Arc::clone(&stored.handle))
    }

    fn put(&self, id: SessionId, session: NarrowingSession) -> SessionHandle {
        let handle = Arc::new(Mutex::new(session));
        self.sessions().insert(
            id,
            StoredSession {
                handle: Arc::clone(&handle),
                touched_at: Utc::now(),
            },
        );
        handle
    }

    fn delete(&self, id: SessionId) -> bool {
        self.sessions().remove(&id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions().len()
    }

    fn evict_idle_at(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let cutoff = now - max_idle;
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, stored| stored.touched_at >= cutoff);
        before - sessions.len()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
