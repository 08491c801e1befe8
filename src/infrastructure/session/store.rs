//! In-memory upload session store
//!
//! Keyed by session id. A background sweep (see `main.rs`) periodically
//! evicts sessions that have been idle past the configured timeout,
//! aborting their backing multipart upload if one was started.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::domain::entities::upload_session::{SessionStatus, UploadSession};
use crate::domain::errors::TransferError;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, UploadSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: UploadSession) {
        self.sessions.lock().unwrap().insert(session.id.clone(), session);
    }

    pub fn get(&self, id: &str) -> Option<UploadSession> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<UploadSession> {
        self.sessions.lock().unwrap().remove(id)
    }

    /// Applies `f` to the session under the store's lock, persisting the
    /// result. Returns the mutated session, or an error if unknown.
    pub fn update<F>(&self, id: &str, f: F) -> Result<UploadSession, TransferError>
    where
        F: FnOnce(&mut UploadSession) -> Result<(), TransferError>,
    {
        let mut guard = self.sessions.lock().unwrap();
        let session = guard
            .get_mut(id)
            .ok_or_else(|| TransferError::NotFound(format!("upload session {id}")))?;
        f(session)?;
        Ok(session.clone())
    }

    /// Removes and returns every session idle past `idle_timeout`,
    /// excluding sessions already in a terminal status.
    pub fn sweep_idle(&self, idle_timeout: chrono::Duration) -> Vec<UploadSession> {
        let now = Utc::now();
        let mut guard = self.sessions.lock().unwrap();
        let expired_ids: Vec<String> = guard
            .iter()
            .filter(|(_, s)| !s.status.is_terminal() && s.idle_for(now) > idle_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        expired_ids
            .into_iter()
            .filter_map(|id| {
                let session = guard.get_mut(&id)?;
                let _ = session.transition_to(SessionStatus::Failed);
                guard.remove(&id)
            })
            .collect()
    }
}
