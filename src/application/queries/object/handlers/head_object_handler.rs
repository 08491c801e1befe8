//! Head Object Handler

use std::sync::Arc;
use tracing::info;

use crate::application::queries::object::HeadObjectQuery;
use crate::domain::entities::object::ObjectMetadata;
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::shared::get_trace_id;

/// Handler for HeadObjectQuery
pub struct HeadObjectHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
}

impl HeadObjectHandler {
    pub fn new(object_store: Arc<dyn ObjectStoreAdapter>) -> Self {
        Self { object_store }
    }

    pub async fn handle(&self, query: HeadObjectQuery) -> Result<ObjectMetadata, TransferError> {
        let trace_id = get_trace_id();

        info!(trace_id = %trace_id, coordinate = %query.coordinate(), "Looking up artifact metadata");

        let metadata = self.object_store.head(query.coordinate()).await?;

        info!(
            trace_id = %trace_id,
            coordinate = %query.coordinate(),
            content_length = metadata.content_length,
            "Artifact metadata resolved"
        );

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use aws_sdk_s3::primitives::ByteStream;

    #[tokio::test]
    async fn returns_metadata_for_existing_artifact() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        store
            .put_stream(&coordinate, "application/octet-stream", 3, ByteStream::from(b"abc".to_vec()))
            .await
            .unwrap();

        let handler = HeadObjectHandler::new(store);
        let metadata = handler
            .handle(HeadObjectQuery::new(coordinate).unwrap())
            .await
            .unwrap();

        assert_eq!(metadata.content_length, 3);
    }

    #[tokio::test]
    async fn head_is_idempotent() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        store
            .put_stream(&coordinate, "application/octet-stream", 3, ByteStream::from(b"abc".to_vec()))
            .await
            .unwrap();

        let handler = HeadObjectHandler::new(store);
        let query = || HeadObjectQuery::new(coordinate.clone()).unwrap();
        let first = handler.handle(query()).await.unwrap();
        let second = handler.handle(query()).await.unwrap();

        assert_eq!(first.etag, second.etag);
        assert_eq!(first.content_length, second.content_length);
    }

    #[tokio::test]
    async fn missing_artifact_is_not_found() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let handler = HeadObjectHandler::new(store);
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "missing.bin").unwrap();

        let err = handler
            .handle(HeadObjectQuery::new(coordinate).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
