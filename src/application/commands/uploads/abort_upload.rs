//! Abort Upload Command

use crate::domain::errors::TransferError;

#[derive(Debug, Clone)]
pub struct AbortUploadCommand {
    session_id: String,
    reason: String,
}

impl AbortUploadCommand {
    pub fn new(session_id: String, reason: String) -> Result<Self, TransferError> {
        if session_id.is_empty() {
            return Err(TransferError::validation("session_id is required"));
        }
        Ok(Self { session_id, reason })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
