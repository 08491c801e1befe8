//! Stream Download Handler

use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::application::queries::download::StreamDownloadQuery;
use crate::domain::entities::object::ObjectMetadata;
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::infrastructure::progress::ProgressRegistry;
use crate::shared::get_trace_id;

/// A download in progress. The operation id is registered with the
/// progress registry before this is returned; the caller (the gRPC
/// service, which owns the response stream) is responsible for advancing
/// and finishing that progress as it forwards `body` to the client.
pub struct OpenedDownload {
    pub operation_id: String,
    pub metadata: ObjectMetadata,
    pub body: ByteStream,
}

/// Handler for StreamDownloadQuery
pub struct StreamDownloadHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
    progress: Arc<ProgressRegistry>,
}

impl StreamDownloadHandler {
    pub fn new(object_store: Arc<dyn ObjectStoreAdapter>, progress: Arc<ProgressRegistry>) -> Self {
        Self {
            object_store,
            progress,
        }
    }

    pub async fn handle(&self, query: StreamDownloadQuery) -> Result<OpenedDownload, TransferError> {
        let trace_id = get_trace_id();

        info!(
            trace_id = %trace_id,
            coordinate = %query.coordinate(),
            range = ?query.range(),
            "Opening download"
        );

        let result = self
            .object_store
            .get_stream(query.coordinate(), query.range())
            .await?;

        let operation_id = Uuid::new_v4().to_string();
        self.progress.register(operation_id.clone(), result.metadata.content_length);

        info!(trace_id = %trace_id, operation_id = %operation_id, "Download opened");

        Ok(OpenedDownload {
            operation_id,
            metadata: result.metadata,
            body: result.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use std::time::Duration;

    #[tokio::test]
    async fn opens_download_and_registers_progress() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        store
            .put_stream(
                &coordinate,
                "application/octet-stream",
                3,
                ByteStream::from(b"abc".to_vec()),
            )
            .await
            .unwrap();

        let progress = Arc::new(ProgressRegistry::new(16, Duration::from_secs(60)));
        let handler = StreamDownloadHandler::new(store, progress.clone());
        let query = StreamDownloadQuery::new(coordinate, None).unwrap();

        let opened = handler.handle(query).await.unwrap();

        assert_eq!(opened.metadata.content_length, 3);
        let mut rx = progress.subscribe(&opened.operation_id);
        assert_eq!(rx.recv().await.unwrap().id, opened.operation_id);
    }

    #[tokio::test]
    async fn missing_object_returns_not_found() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let progress = Arc::new(ProgressRegistry::new(16, Duration::from_secs(60)));
        let handler = StreamDownloadHandler::new(store, progress);
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "missing.bin").unwrap();
        let query = StreamDownloadQuery::new(coordinate, None).unwrap();

        let err = handler.handle(query).await.unwrap_err();

        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
