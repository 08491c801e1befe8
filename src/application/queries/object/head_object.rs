//! Head Object Query

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

/// Query for metadata about a single artifact, without downloading its body.
#[derive(Debug, Clone)]
pub struct HeadObjectQuery {
    coordinate: ArtifactCoordinate,
}

impl HeadObjectQuery {
    pub fn new(coordinate: ArtifactCoordinate) -> Result<Self, TransferError> {
        Ok(Self { coordinate })
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }
}
