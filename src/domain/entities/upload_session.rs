//! Upload session entity
//!
//! Tracks one in-flight upload from `InitiateUpload` through to
//! `CommitUpload`/`AbortUpload`. Session state lives in
//! `infrastructure::session::SessionStore`; this module only defines the
//! shape and the legal transitions.

use chrono::{DateTime, Utc};

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Single `PutObject` call once all chunks have arrived.
    Direct,
    /// Backed by the object store's multipart upload API.
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Committing,
    Committed,
    Failed,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Failed | Self::Aborted)
    }
}

#[derive(Debug, Clone)]
pub struct UploadSession {
    pub id: String,
    pub coordinate: ArtifactCoordinate,
    pub content_length: i64,
    pub content_type: String,
    pub declared_sha256: Option<String>,
    pub mode: UploadMode,
    pub status: SessionStatus,
    pub bytes_received: i64,
    pub chunk_count: i64,
    /// Opaque token handed back by the object store adapter for a
    /// multipart upload (its `upload_id`). `None` for direct-mode sessions.
    pub backend_token: Option<String>,
    /// Accumulated body for direct-mode sessions; flushed to the object
    /// store in one `put_stream` call at commit time.
    pub direct_buffer: Vec<u8>,
    /// Parts already uploaded for a multipart-mode session.
    pub completed_parts: Vec<crate::domain::repositories::object_store::PartHandle>,
    /// Digest of all bytes received so far, computed incrementally as
    /// chunks arrive; compared against `declared_sha256` at commit time.
    pub computed_sha256: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl UploadSession {
    pub fn new(
        id: String,
        coordinate: ArtifactCoordinate,
        content_length: i64,
        content_type: String,
        declared_sha256: Option<String>,
        mode: UploadMode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            coordinate,
            content_length,
            content_type,
            declared_sha256,
            mode,
            status: SessionStatus::Open,
            bytes_received: 0,
            chunk_count: 0,
            backend_token: None,
            direct_buffer: Vec::new(),
            completed_parts: Vec::new(),
            computed_sha256: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn record_chunk(&mut self, len: usize) {
        self.bytes_received += len as i64;
        self.chunk_count += 1;
        self.last_activity_at = Utc::now();
    }

    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_activity_at
    }

    /// Enforces the Open -> Committing -> {Committed, Failed} -> Aborted
    /// transition graph. `Open -> Aborted` is also legal (client-initiated
    /// abort before anything is committed).
    pub fn transition_to(&mut self, next: SessionStatus) -> Result<(), TransferError> {
        let allowed = matches!(
            (self.status, next),
            (SessionStatus::Open, SessionStatus::Committing)
                | (SessionStatus::Open, SessionStatus::Aborted)
                | (SessionStatus::Open, SessionStatus::Failed)
                | (SessionStatus::Committing, SessionStatus::Committed)
                | (SessionStatus::Committing, SessionStatus::Failed)
                | (SessionStatus::Committing, SessionStatus::Aborted)
        );
        if !allowed {
            return Err(TransferError::Conflict(format!(
                "cannot transition upload session {} from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.last_activity_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UploadSession {
        let coordinate =
            ArtifactCoordinate::new("app", "1.0.0", "linux", "app.bin").unwrap();
        UploadSession::new(
            "sess-1".to_string(),
            coordinate,
            1024,
            "application/octet-stream".to_string(),
            None,
            UploadMode::Direct,
        )
    }

    #[test]
    fn rejects_commit_after_abort() {
        let mut s = session();
        s.transition_to(SessionStatus::Aborted).unwrap();
        assert!(s.transition_to(SessionStatus::Committing).is_err());
    }

    #[test]
    fn allows_open_to_committing_to_committed() {
        let mut s = session();
        s.transition_to(SessionStatus::Committing).unwrap();
        s.transition_to(SessionStatus::Committed).unwrap();
        assert_eq!(s.status, SessionStatus::Committed);
    }

    #[test]
    fn record_chunk_accumulates() {
        let mut s = session();
        s.record_chunk(100);
        s.record_chunk(50);
        assert_eq!(s.bytes_received, 150);
        assert_eq!(s.chunk_count, 2);
    }
}
