//! Subscribe Progress Query

use crate::domain::errors::TransferError;

/// Query to subscribe to progress updates for an upload session or
/// download operation id.
#[derive(Debug, Clone)]
pub struct SubscribeProgressQuery {
    id: String,
}

impl SubscribeProgressQuery {
    pub fn new(id: String) -> Result<Self, TransferError> {
        if id.is_empty() {
            return Err(TransferError::validation("id is required"));
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
