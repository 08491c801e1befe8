//! Commit Upload Command

use crate::domain::errors::TransferError;

#[derive(Debug, Clone)]
pub struct CommitUploadCommand {
    session_id: String,
}

impl CommitUploadCommand {
    pub fn new(session_id: String) -> Result<Self, TransferError> {
        if session_id.is_empty() {
            return Err(TransferError::validation("session_id is required"));
        }
        Ok(Self { session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
