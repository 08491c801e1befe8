//! Commit Upload Handler

use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use tracing::{info, warn};

use crate::application::commands::uploads::CommitUploadCommand;
use crate::domain::entities::progress::ProgressState;
use crate::domain::entities::upload_session::{SessionStatus, UploadMode, UploadSession};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::{ObjectStoreAdapter, PutResult};
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;
use crate::shared::get_trace_id;

/// Handler for CommitUploadCommand
pub struct CommitUploadHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
}

impl CommitUploadHandler {
    pub fn new(
        object_store: Arc<dyn ObjectStoreAdapter>,
        sessions: Arc<SessionStore>,
        progress: Arc<ProgressRegistry>,
    ) -> Self {
        Self {
            object_store,
            sessions,
            progress,
        }
    }

    /// Exposes the session snapshot so callers (the gRPC service) can read
    /// back the coordinate and computed digest after a commit completes.
    pub fn session_snapshot(&self, id: &str) -> Result<UploadSession, TransferError> {
        self.sessions
            .get(id)
            .ok_or_else(|| TransferError::not_found(format!("upload session {id}")))
    }

    pub async fn handle(&self, command: CommitUploadCommand) -> Result<PutResult, TransferError> {
        let trace_id = get_trace_id();
        let id = command.session_id();

        let session = self
            .sessions
            .update(id, |s| s.transition_to(SessionStatus::Committing))?;

        info!(trace_id = %trace_id, session_id = %id, "Committing upload");

        let result = self.finalize(&session).await;

        match &result {
            Ok(put) => {
                self.sessions
                    .update(id, |s| s.transition_to(SessionStatus::Committed))?;
                self.progress
                    .finish(id, ProgressState::Completed, format!("committed, etag {}", put.etag));
                info!(trace_id = %trace_id, session_id = %id, etag = %put.etag, "Upload committed");
            }
            Err(err) => {
                if session.mode == UploadMode::Multipart {
                    if let Some(upload_id) = &session.backend_token {
                        if let Err(e) = self
                            .object_store
                            .abort_multipart(&session.coordinate, upload_id)
                            .await
                        {
                            warn!(trace_id = %trace_id, session_id = %id, error = %e, "failed to abort multipart upload after commit failure");
                        }
                    }
                }
                let _ = self.sessions.update(id, |s| s.transition_to(SessionStatus::Failed));
                self.progress.finish(id, ProgressState::Failed, err.to_string());
            }
        }

        result
    }

    async fn finalize(&self, session: &UploadSession) -> Result<PutResult, TransferError> {
        if let (Some(declared), Some(computed)) =
            (&session.declared_sha256, &session.computed_sha256)
        {
            if declared != computed {
                return Err(TransferError::Integrity(format!(
                    "declared sha256 {declared} does not match computed sha256 {computed}"
                )));
            }
        }

        match session.mode {
            UploadMode::Direct => {
                let body = ByteStream::from(session.direct_buffer.clone());
                self.object_store
                    .put_stream(
                        &session.coordinate,
                        &session.content_type,
                        session.bytes_received,
                        body,
                    )
                    .await
            }
            UploadMode::Multipart => {
                let upload_id = session.backend_token.clone().ok_or_else(|| {
                    TransferError::Internal(format!(
                        "multipart session {} is missing a backend upload id",
                        session.id
                    ))
                })?;
                self.object_store
                    .complete_multipart(&session.coordinate, &upload_id, session.completed_parts.clone())
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use std::time::Duration;

    fn open_session(sessions: &SessionStore, id: &str, declared_sha256: Option<String>) {
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        let mut session = UploadSession::new(
            id.to_string(),
            coordinate,
            3,
            "application/octet-stream".to_string(),
            declared_sha256,
            UploadMode::Direct,
        );
        session.direct_buffer = b"abc".to_vec();
        session.bytes_received = 3;
        session.chunk_count = 1;
        session.computed_sha256 =
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string());
        sessions.insert(session);
    }

    fn handler(sessions: Arc<SessionStore>) -> CommitUploadHandler {
        CommitUploadHandler::new(
            Arc::new(FakeObjectStoreAdapter::new()),
            sessions,
            Arc::new(ProgressRegistry::new(16, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn commits_when_digest_matches() {
        let sessions = Arc::new(SessionStore::new());
        open_session(
            &sessions,
            "s1",
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string()),
        );
        let handler = handler(sessions.clone());

        handler
            .handle(CommitUploadCommand::new("s1".to_string()).unwrap())
            .await
            .unwrap();

        let session = sessions.get("s1").unwrap();
        assert_eq!(session.status, SessionStatus::Committed);
    }

    #[tokio::test]
    async fn fails_on_digest_mismatch_and_leaves_session_failed() {
        let sessions = Arc::new(SessionStore::new());
        open_session(&sessions, "s2", Some("0".repeat(64)));
        let handler = handler(sessions.clone());

        let err = handler
            .handle(CommitUploadCommand::new("s2".to_string()).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Integrity(_)));
        let session = sessions.get("s2").unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn multipart_commit_failure_aborts_the_backend_upload_and_leaves_session_failed() {
        let sessions = Arc::new(SessionStore::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        let mut session = UploadSession::new(
            "s3".to_string(),
            coordinate,
            0,
            "application/octet-stream".to_string(),
            None,
            UploadMode::Multipart,
        );
        // No matching create_multipart call was made against the fake
        // adapter, so complete_multipart fails and the handler must fall
        // back to a best-effort abort rather than propagating a panic.
        session.backend_token = Some("never-created-upload".to_string());
        sessions.insert(session);
        let handler = handler(sessions.clone());

        let err = handler
            .handle(CommitUploadCommand::new("s3".to_string()).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::NotFound(_)));
        let session = sessions.get("s3").unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
    }

    #[test]
    fn session_snapshot_returns_not_found_for_unknown_session() {
        let handler = handler(Arc::new(SessionStore::new()));
        let err = handler.session_snapshot("missing").unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
