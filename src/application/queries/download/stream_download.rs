//! Stream Download Query

use crate::domain::byte_range::ByteRange;
use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

/// Query to open a streaming download of an artifact, optionally
/// restricted to a half-open byte range `[start, end)`.
#[derive(Debug, Clone)]
pub struct StreamDownloadQuery {
    coordinate: ArtifactCoordinate,
    range: Option<ByteRange>,
}

impl StreamDownloadQuery {
    pub fn new(coordinate: ArtifactCoordinate, range: Option<ByteRange>) -> Result<Self, TransferError> {
        Ok(Self { coordinate, range })
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    pub fn range(&self) -> Option<ByteRange> {
        self.range
    }
}
