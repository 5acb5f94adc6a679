//! In-memory session registry. Sessions live until deleted, evicted for
//! idleness, or the process exits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::Session;

/// Each session sits behind its own mutex, so a second request for the same
/// session waits for the in-flight turn while other sessions proceed.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, handle.clone());
        info!("Session {id} created");
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Whether `id` still maps to this exact handle. False once the session was
    /// deleted or evicted, even if the caller still holds the handle.
    pub async fn holds(&self, id: Uuid, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Ends a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for at least `ttl`. A session whose mutex is
    /// held (a turn or upload in flight) is never evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| match handle.try_lock() {
            Ok(session) if session.idle_for() >= ttl => {
                info!("Session {id} evicted after {}s idle", session.idle_for().as_secs());
                false
            }
            _ => true,
        });
        before - sessions.len()
    }
}

/// Runs `evict_idle` every `period` until the runtime shuts down.
pub fn spawn_eviction(store: SessionStore, ttl: Duration, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if evicted > 0 {
                debug!("Evicted {evicted} idle sessions");
            }
        }
    })
}
