//! Initiate Upload Command

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

#[derive(Debug, Clone)]
pub struct InitiateUploadCommand {
    coordinate: ArtifactCoordinate,
    content_length: i64,
    content_type: String,
    declared_sha256: Option<String>,
}

impl InitiateUploadCommand {
    pub fn new(
        coordinate: ArtifactCoordinate,
        content_length: i64,
        content_type: String,
        declared_sha256: Option<String>,
    ) -> Result<Self, TransferError> {
        let command = Self {
            coordinate,
            content_length,
            content_type,
            declared_sha256,
        };
        command.validate()?;
        Ok(command)
    }

    fn validate(&self) -> Result<(), TransferError> {
        if self.content_length < 0 {
            return Err(TransferError::validation("content_length must not be negative"));
        }
        if self.content_type.is_empty() {
            return Err(TransferError::validation("content_type is required"));
        }
        if let Some(digest) = &self.declared_sha256 {
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(TransferError::validation("sha256 must be 64 hex characters"));
            }
        }
        Ok(())
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn declared_sha256(&self) -> Option<&str> {
        self.declared_sha256.as_deref()
    }
}
