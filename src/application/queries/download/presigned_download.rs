//! Presigned Download Query

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

/// Query for a time-limited, out-of-band GET URL for an artifact.
#[derive(Debug, Clone)]
pub struct PresignedDownloadQuery {
    coordinate: ArtifactCoordinate,
    expires_in_seconds: u64,
}

impl PresignedDownloadQuery {
    pub fn new(coordinate: ArtifactCoordinate, expires_in_seconds: u64) -> Result<Self, TransferError> {
        if expires_in_seconds == 0 || expires_in_seconds > 7 * 24 * 3600 {
            return Err(TransferError::validation(
                "expires_in_seconds must be between 1 and 604800 (7 days)",
            ));
        }
        Ok(Self {
            coordinate,
            expires_in_seconds,
        })
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    pub fn expires_in_seconds(&self) -> u64 {
        self.expires_in_seconds
    }
}
