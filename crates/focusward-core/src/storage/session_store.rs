//! In-memory session list backed by key-value persistence.
//!
//! The whole collection is serialized under one key and rewritten on every
//! append. Reads and writes never fail from the caller's point of view: a
//! broken read yields no history, a broken write is logged and the record
//! stays visible in memory for the rest of the run.

use std::sync::{Mutex, PoisonError};

use super::kv::KeyValueStore;
use crate::session::SessionRecord;

/// Storage key of the serialized session collection.
pub const SESSIONS_KEY: &str = "FOCUS_SESSIONS";

/// Read every stored session, most recent first.
///
/// Missing or unreadable data yields an empty list.
pub fn load_sessions(kv: &dyn KeyValueStore) -> Vec<SessionRecord> {
    match kv.get(SESSIONS_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<Vec<SessionRecord>>(&json) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "stored sessions are malformed; starting empty");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored sessions; starting empty");
            Vec::new()
        }
    }
}

struct Inner {
    kv: Box<dyn KeyValueStore>,
    sessions: Vec<SessionRecord>,
}

/// Completed sessions, most recent first.
pub struct SessionStore {
    inner: Mutex<Inner>,
}

impl SessionStore {
    /// Load the stored collection once and keep `kv` for later writes.
    pub fn load(kv: impl KeyValueStore + 'static) -> Self {
        let sessions = load_sessions(&kv);
        tracing::debug!(count = sessions.len(), "loaded focus sessions");
        Self {
            inner: Mutex::new(Inner {
                kv: Box::new(kv),
                sessions,
            }),
        }
    }

    /// Snapshot of the in-memory list.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.lock().sessions.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }

    /// Prepend `record` and rewrite the stored collection.
    ///
    /// A failed write is logged; the in-memory append is kept.
    pub fn append_and_persist(&self, record: SessionRecord) {
        let mut inner = self.lock();
        inner.sessions.insert(0, record);

        let json = match serde_json::to_string(&inner.sessions) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode focus sessions");
                return;
            }
        };
        if let Err(e) = inner.kv.set(SESSIONS_KEY, &json) {
            tracing::error!(error = %e, "failed to persist focus sessions");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
