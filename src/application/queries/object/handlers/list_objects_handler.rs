//! List Objects Handler

use std::sync::Arc;
use tracing::info;

use crate::application::queries::object::ListObjectsQuery;
use crate::domain::entities::object::ListResult;
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::shared::get_trace_id;

/// Handler for ListObjectsQuery
pub struct ListObjectsHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
}

impl ListObjectsHandler {
    pub fn new(object_store: Arc<dyn ObjectStoreAdapter>) -> Self {
        Self { object_store }
    }

    pub async fn handle(&self, query: ListObjectsQuery) -> Result<ListResult, TransferError> {
        let trace_id = get_trace_id();

        info!(
            trace_id = %trace_id,
            app = %query.app(),
            version = %query.version(),
            continuation_token = ?query.continuation_token(),
            max_keys = ?query.max_keys(),
            "Listing artifacts"
        );

        let result = self
            .object_store
            .list(
                query.app(),
                query.version(),
                query.continuation_token(),
                query.max_keys(),
            )
            .await?;

        info!(
            trace_id = %trace_id,
            app = %query.app(),
            version = %query.version(),
            entry_count = result.entries.len(),
            is_truncated = result.is_truncated,
            "Listed artifacts"
        );

        Ok(result)
    }
}
