//! Initiate Upload Handler

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::commands::uploads::InitiateUploadCommand;
use crate::domain::entities::upload_session::{UploadMode, UploadSession};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::infrastructure::config::TransferConfig;
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;
use crate::shared::get_trace_id;

/// Outcome of `InitiateUpload`: the session id the client threads through
/// `UploadChunks`/`CommitUpload`/`AbortUpload`, and the chunk size it
/// should use.
#[derive(Debug, Clone)]
pub struct InitiateUploadResult {
    pub session_id: String,
    pub mode: UploadMode,
    pub recommended_chunk_bytes: usize,
}

/// Handler for InitiateUploadCommand
pub struct InitiateUploadHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    config: TransferConfig,
}

impl InitiateUploadHandler {
    pub fn new(
        object_store: Arc<dyn ObjectStoreAdapter>,
        sessions: Arc<SessionStore>,
        progress: Arc<ProgressRegistry>,
        config: TransferConfig,
    ) -> Self {
        Self {
            object_store,
            sessions,
            progress,
            config,
        }
    }

    pub async fn handle(
        &self,
        command: InitiateUploadCommand,
    ) -> Result<InitiateUploadResult, TransferError> {
        let trace_id = get_trace_id();
        let mode = if command.content_length() >= self.config.multipart_threshold_bytes {
            UploadMode::Multipart
        } else {
            UploadMode::Direct
        };

        info!(
            trace_id = %trace_id,
            coordinate = %command.coordinate(),
            mode = ?mode,
            content_length = command.content_length(),
            "Initiating upload"
        );

        let session_id = Uuid::new_v4().to_string();
        let mut session = UploadSession::new(
            session_id.clone(),
            command.coordinate().clone(),
            command.content_length(),
            command.content_type().to_string(),
            command.declared_sha256().map(str::to_string),
            mode,
        );

        if mode == UploadMode::Multipart {
            let upload_id = self
                .object_store
                .create_multipart(command.coordinate(), command.content_type())
                .await?;
            session.backend_token = Some(upload_id);
        }

        self.sessions.insert(session);
        self.progress.register(session_id.clone(), command.content_length());

        info!(trace_id = %trace_id, session_id = %session_id, "Upload session opened");

        Ok(InitiateUploadResult {
            session_id,
            mode,
            recommended_chunk_bytes: self.config.recommended_chunk_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;

    fn handler(config: TransferConfig) -> InitiateUploadHandler {
        InitiateUploadHandler::new(
            Arc::new(FakeObjectStoreAdapter::new()),
            Arc::new(SessionStore::new()),
            Arc::new(ProgressRegistry::new(16, std::time::Duration::from_secs(60))),
            config,
        )
    }

    fn coordinate() -> ArtifactCoordinate {
        ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap()
    }

    #[tokio::test]
    async fn small_upload_selects_direct_mode() {
        let handler = handler(TransferConfig::default());
        let command =
            InitiateUploadCommand::new(coordinate(), 1024, "application/octet-stream".into(), None)
                .unwrap();

        let result = handler.handle(command).await.unwrap();

        assert_eq!(result.mode, UploadMode::Direct);
        assert!(!result.session_id.is_empty());
    }

    #[tokio::test]
    async fn large_upload_selects_multipart_mode_and_opens_backend_upload() {
        let mut config = TransferConfig::default();
        config.multipart_threshold_bytes = 1024;
        let handler = handler(config);
        let command =
            InitiateUploadCommand::new(coordinate(), 2048, "application/octet-stream".into(), None)
                .unwrap();

        let result = handler.handle(command).await.unwrap();

        assert_eq!(result.mode, UploadMode::Multipart);
    }
}
