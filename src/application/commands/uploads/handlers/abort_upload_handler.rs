//! Abort Upload Handler

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::commands::uploads::AbortUploadCommand;
use crate::domain::entities::progress::ProgressState;
use crate::domain::entities::upload_session::{SessionStatus, UploadMode};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;
use crate::shared::get_trace_id;

/// Handler for AbortUploadCommand
pub struct AbortUploadHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
}

impl AbortUploadHandler {
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

    pub async fn handle(&self, command: AbortUploadCommand) -> Result<(), TransferError> {
        let trace_id = get_trace_id();
        let id = command.session_id();

        let session = self
            .sessions
            .update(id, |s| s.transition_to(SessionStatus::Aborted))?;

        if session.mode == UploadMode::Multipart {
            if let Some(upload_id) = &session.backend_token {
                if let Err(e) = self
                    .object_store
                    .abort_multipart(&session.coordinate, upload_id)
                    .await
                {
                    warn!(trace_id = %trace_id, session_id = %id, error = %e, "failed to abort backend multipart upload");
                }
            }
        }

        self.progress
            .finish(id, ProgressState::Cancelled, command.reason().to_string());

        info!(trace_id = %trace_id, session_id = %id, reason = %command.reason(), "Upload aborted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::domain::entities::upload_session::UploadSession;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use std::time::Duration;

    fn open_session(sessions: &SessionStore, id: &str, mode: UploadMode) {
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        let mut session = UploadSession::new(
            id.to_string(),
            coordinate,
            10,
            "application/octet-stream".to_string(),
            None,
            mode,
        );
        if mode == UploadMode::Multipart {
            session.backend_token = Some("upload-1".to_string());
        }
        sessions.insert(session);
    }

    fn handler(sessions: Arc<SessionStore>) -> AbortUploadHandler {
        AbortUploadHandler::new(
            Arc::new(FakeObjectStoreAdapter::new()),
            sessions,
            Arc::new(ProgressRegistry::new(16, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn aborts_open_direct_session() {
        let sessions = Arc::new(SessionStore::new());
        open_session(&sessions, "s1", UploadMode::Direct);
        let handler = handler(sessions.clone());

        handler
            .handle(AbortUploadCommand::new("s1".to_string(), "client cancelled".to_string()).unwrap())
            .await
            .unwrap();

        assert_eq!(sessions.get("s1").unwrap().status, SessionStatus::Aborted);
    }

    #[tokio::test]
    async fn aborts_multipart_session_reaching_aborted_even_without_a_backend_upload() {
        let sessions = Arc::new(SessionStore::new());
        open_session(&sessions, "s2", UploadMode::Multipart);
        let handler = handler(sessions.clone());

        handler
            .handle(AbortUploadCommand::new("s2".to_string(), "client cancelled".to_string()).unwrap())
            .await
            .unwrap();

        assert_eq!(sessions.get("s2").unwrap().status, SessionStatus::Aborted);
    }

    #[tokio::test]
    async fn aborting_unknown_session_fails() {
        let handler = handler(Arc::new(SessionStore::new()));
        let err = handler
            .handle(AbortUploadCommand::new("missing".to_string(), "x".to_string()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
