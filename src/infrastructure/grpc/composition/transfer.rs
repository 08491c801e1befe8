//! Transfer service composition
//!
//! Wires the object store adapter, session store, and progress registry
//! into every application handler the `TransferGrpcService` depends on.

use std::sync::Arc;

use crate::application::commands::object::handlers::DeleteObjectHandler;
use crate::application::commands::uploads::handlers::{
    AbortUploadHandler, CommitUploadHandler, IngestChunksHandler, InitiateUploadHandler,
};
use crate::application::queries::download::handlers::{PresignedDownloadHandler, StreamDownloadHandler};
use crate::application::queries::object::handlers::{HeadObjectHandler, ListObjectsHandler};
use crate::application::queries::progress::handlers::SubscribeProgressHandler;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::infrastructure::config::TransferConfig;
use crate::infrastructure::grpc::services::transfer_service::TransferGrpcService;
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;

pub struct TransferServiceBuilder {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    config: TransferConfig,
}

impl TransferServiceBuilder {
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

    pub fn build(self) -> TransferGrpcService {
        let initiate_upload = Arc::new(InitiateUploadHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
            self.config.clone(),
        ));
        let ingest_chunks = Arc::new(IngestChunksHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
            self.config.clone(),
        ));
        let commit_upload = Arc::new(CommitUploadHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
        ));
        let abort_upload = Arc::new(AbortUploadHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
        ));
        let stream_download = Arc::new(StreamDownloadHandler::new(
            self.object_store.clone(),
            self.progress.clone(),
        ));
        let presigned_download = Arc::new(PresignedDownloadHandler::new(self.object_store.clone()));
        let head_object = Arc::new(HeadObjectHandler::new(self.object_store.clone()));
        let list_objects = Arc::new(ListObjectsHandler::new(self.object_store.clone()));
        let delete_object = Arc::new(DeleteObjectHandler::new(self.object_store.clone()));
        let subscribe_progress = Arc::new(SubscribeProgressHandler::new(self.progress.clone()));

        TransferGrpcService::new(
            initiate_upload,
            ingest_chunks,
            commit_upload,
            abort_upload,
            stream_download,
            presigned_download,
            head_object,
            list_objects,
            delete_object,
            subscribe_progress,
            self.progress,
            self.config.download_read_chunk_bytes,
        )
    }
}
