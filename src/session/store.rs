//! Session Store
//!
//! In-memory registry of live sessions:
//! - Lookup / creation keyed by the cookie session id
//! - Composite reset that also deletes the session's artifacts
//! - Idle-session expiry

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::types::{delete_all, SessionId, SessionState};
use crate::artifacts::ArtifactStore;

/// Registry of live sessions
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    sessions: RwLock<HashMap<SessionId, SessionState>>,
    idle_timeout_hours: i64,
}

impl SessionStore {
    pub fn new(idle_timeout_hours: i64) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
                idle_timeout_hours,
            }),
        }
    }

    // ========================================================================
    // Session Lifecycle
    // ========================================================================

    /// Resolve the cookie id to a live session
    ///
    /// Returns the resolved id and whether it is fresh. A fresh id is not
    /// registered until the first [`update`](Self::update) writes to it, so
    /// requests that never change state leave no session behind.
    pub async fn resolve(&self, candidate: Option<SessionId>) -> (SessionId, bool) {
        let now = Utc::now();

        if let Some(id) = candidate {
            let mut sessions = self.inner.sessions.write().await;
            if let Some(session) = sessions.get_mut(&id) {
                if !session.is_expired(self.inner.idle_timeout_hours, now) {
                    session.last_seen = now;
                    return (id, false);
                }
            }
        }

        (SessionId::new(), true)
    }

    /// Whether `id` is registered
    pub async fn contains(&self, id: SessionId) -> bool {
        self.inner.sessions.read().await.contains_key(&id)
    }

    /// Snapshot of a session
    pub async fn get(&self, id: SessionId) -> Option<SessionState> {
        self.inner.sessions.read().await.get(&id).cloned()
    }

    /// Mutate a session in place, registering it on first write
    pub async fn update<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.inner.sessions.write().await;
        let session = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(session_id = %id, "Created session");
            SessionState::new()
        });
        f(session)
    }

    /// Mutate a session only if it is registered
    pub async fn inspect<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        self.inner.sessions.write().await.get_mut(&id).map(f)
    }

    /// Reset a session: clear every field, then delete its artifacts
    ///
    /// The session stays registered throughout; artifact references are
    /// detached under the lock and deleted after it is released.
    pub async fn reset(&self, id: SessionId, artifacts: &ArtifactStore) {
        let detached = {
            let mut sessions = self.inner.sessions.write().await;
            let session = sessions.entry(id).or_default();
            session.last_seen = Utc::now();
            session.clear()
        };

        delete_all(artifacts, detached).await;
        tracing::info!(session_id = %id, "Session cleared");
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Remove idle sessions and delete their artifacts
    ///
    /// Returns the number of sessions cleaned up
    pub async fn cleanup_expired(&self, artifacts: &ArtifactStore) -> usize {
        let now = Utc::now();
        let expired: Vec<SessionState> = {
            let mut sessions = self.inner.sessions.write().await;
            let ids: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, s)| s.is_expired(self.inner.idle_timeout_hours, now))
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        let count = expired.len();
        for mut state in expired {
            state.reset(artifacts).await;
        }

        if count > 0 {
            tracing::info!(count = count, "Cleaned up expired sessions");
        }

        count
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
