//! Subscribe Progress Handler

use std::sync::Arc;
use tracing::info;

use crate::application::queries::progress::SubscribeProgressQuery;
use crate::domain::errors::TransferError;
use crate::infrastructure::progress::{CoalescingReceiver, ProgressRegistry};
use crate::domain::entities::progress::ProgressSnapshot;
use crate::shared::get_trace_id;

/// Handler for SubscribeProgressQuery
pub struct SubscribeProgressHandler {
    progress: Arc<ProgressRegistry>,
}

impl SubscribeProgressHandler {
    pub fn new(progress: Arc<ProgressRegistry>) -> Self {
        Self { progress }
    }

    /// Always succeeds: an id with no registry entry yields a receiver
    /// pre-loaded with a synthetic `NotFound` terminal snapshot rather
    /// than an error, matching the Progress Registry's subscribe contract.
    pub async fn handle(
        &self,
        query: SubscribeProgressQuery,
    ) -> Result<CoalescingReceiver<ProgressSnapshot>, TransferError> {
        let trace_id = get_trace_id();
        info!(trace_id = %trace_id, id = %query.id(), "Subscribing to progress");

        Ok(self.progress.subscribe(query.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn subscribes_to_registered_operation() {
        let progress = Arc::new(ProgressRegistry::new(16, Duration::from_secs(60)));
        progress.register("op-1".to_string(), 100);
        let handler = SubscribeProgressHandler::new(progress);

        let receiver = handler
            .handle(SubscribeProgressQuery::new("op-1".to_string()).unwrap())
            .await;

        assert!(receiver.is_ok());
    }

    #[tokio::test]
    async fn subscribing_to_unknown_operation_yields_a_not_found_terminal_snapshot() {
        let progress = Arc::new(ProgressRegistry::new(16, Duration::from_secs(60)));
        let handler = SubscribeProgressHandler::new(progress);

        let mut receiver = handler
            .handle(SubscribeProgressQuery::new("missing".to_string()).unwrap())
            .await
            .unwrap();

        let snapshot = receiver.recv().await.unwrap();
        assert_eq!(snapshot.state, crate::domain::entities::progress::ProgressState::NotFound);
        assert!(receiver.recv().await.is_none());
    }
}
