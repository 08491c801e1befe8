//! Presigned Download Handler

use std::sync::Arc;
use tracing::info;

use crate::application::queries::download::PresignedDownloadQuery;
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::shared::get_trace_id;

pub struct SignedUrlResult {
    pub url: String,
    pub expires_in_seconds: u64,
}

/// Handler for PresignedDownloadQuery
pub struct PresignedDownloadHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
}

impl PresignedDownloadHandler {
    pub fn new(object_store: Arc<dyn ObjectStoreAdapter>) -> Self {
        Self { object_store }
    }

    pub async fn handle(&self, query: PresignedDownloadQuery) -> Result<SignedUrlResult, TransferError> {
        let trace_id = get_trace_id();

        // A presigned URL is worthless if the artifact doesn't exist; fail
        // fast instead of handing the caller a link that 404s later.
        self.object_store.head(query.coordinate()).await?;

        let url = self
            .object_store
            .signed_url(query.coordinate(), query.expires_in_seconds())
            .await?;

        info!(trace_id = %trace_id, coordinate = %query.coordinate(), "Issued presigned download URL");

        Ok(SignedUrlResult {
            url,
            expires_in_seconds: query.expires_in_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use aws_sdk_s3::primitives::ByteStream;

    #[tokio::test]
    async fn signs_url_for_existing_object() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        store
            .put_stream(&coordinate, "application/octet-stream", 3, ByteStream::from(b"abc".to_vec()))
            .await
            .unwrap();

        let handler = PresignedDownloadHandler::new(store);
        let query = PresignedDownloadQuery::new(coordinate, 3600).unwrap();

        let result = handler.handle(query).await.unwrap();

        assert_eq!(result.expires_in_seconds, 3600);
        assert!(!result.url.is_empty());
    }

    #[tokio::test]
    async fn refuses_to_sign_url_for_missing_object() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let handler = PresignedDownloadHandler::new(store);
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "missing.bin").unwrap();
        let query = PresignedDownloadQuery::new(coordinate, 3600).unwrap();

        let err = handler.handle(query).await.unwrap_err();

        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
