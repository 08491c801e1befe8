//! Coordinate <-> object key mapping
//!
//! Artifacts are stored under a flat hierarchical key derived from their
//! coordinate: `{app}/{version}/{platform}/{filename}`. This is the only
//! place that knows the mapping; everything above this layer deals in
//! coordinates.

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

pub fn coordinate_to_key(coordinate: &ArtifactCoordinate) -> String {
    format!(
        "{}/{}/{}/{}",
        coordinate.app(),
        coordinate.version(),
        coordinate.platform(),
        coordinate.filename()
    )
}

pub fn list_prefix(app: &str, version: &str) -> String {
    if version.is_empty() {
        format!("{app}/")
    } else {
        format!("{app}/{version}/")
    }
}

/// Inverse of `coordinate_to_key`. Used when turning S3 listing results
/// back into coordinates.
pub fn key_to_coordinate(key: &str) -> Result<ArtifactCoordinate, TransferError> {
    let mut parts = key.splitn(4, '/');
    let app = parts.next().unwrap_or_default();
    let version = parts.next().unwrap_or_default();
    let platform = parts.next().unwrap_or_default();
    let filename = parts.next().unwrap_or_default();
    ArtifactCoordinate::new(app, version, platform, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_key() {
        let c = ArtifactCoordinate::new("app", "1.0.0", "linux-x86_64", "app.tar.gz").unwrap();
        let key = coordinate_to_key(&c);
        assert_eq!(key, "app/1.0.0/linux-x86_64/app.tar.gz");
        let back = key_to_coordinate(&key).unwrap();
        assert_eq!(back, c);
    }
}
