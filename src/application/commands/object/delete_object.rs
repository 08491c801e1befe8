//! Delete Object Command

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

/// Command to delete a single artifact from the object store
#[derive(Debug, Clone)]
pub struct DeleteObjectCommand {
    coordinate: ArtifactCoordinate,
}

impl DeleteObjectCommand {
    pub fn new(coordinate: ArtifactCoordinate) -> Result<Self, TransferError> {
        Ok(Self { coordinate })
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }
}
