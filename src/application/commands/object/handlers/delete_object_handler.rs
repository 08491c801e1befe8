//! Delete Object Handler

use std::sync::Arc;
use tracing::info;

use crate::application::commands::object::DeleteObjectCommand;
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::shared::get_trace_id;

/// Handler for DeleteObjectCommand
pub struct DeleteObjectHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
}

impl DeleteObjectHandler {
    pub fn new(object_store: Arc<dyn ObjectStoreAdapter>) -> Self {
        Self { object_store }
    }

    /// Returns whether an artifact was actually present and removed.
    pub async fn handle(&self, command: DeleteObjectCommand) -> Result<bool, TransferError> {
        let trace_id = get_trace_id();

        info!(
            trace_id = %trace_id,
            coordinate = %command.coordinate(),
            "Deleting artifact"
        );

        let deleted = self.object_store.delete(command.coordinate()).await?;

        info!(
            trace_id = %trace_id,
            coordinate = %command.coordinate(),
            deleted,
            "Delete request completed"
        );

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::object::DeleteObjectCommand;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;
    use aws_sdk_s3::primitives::ByteStream;

    #[tokio::test]
    async fn deletes_existing_artifact() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap();
        store
            .put_stream(&coordinate, "application/octet-stream", 3, ByteStream::from(b"abc".to_vec()))
            .await
            .unwrap();

        let handler = DeleteObjectHandler::new(store);
        let deleted = handler
            .handle(DeleteObjectCommand::new(coordinate).unwrap())
            .await
            .unwrap();

        assert!(deleted);
    }

    #[tokio::test]
    async fn deleting_missing_artifact_returns_false() {
        let store = Arc::new(FakeObjectStoreAdapter::new());
        let handler = DeleteObjectHandler::new(store);
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "missing.bin").unwrap();

        let deleted = handler
            .handle(DeleteObjectCommand::new(coordinate).unwrap())
            .await
            .unwrap();

        assert!(!deleted);
    }
}
