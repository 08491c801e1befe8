//! Catalog entities
//!
//! Shapes returned by the read-side operations (`Head`, `List`) over
//! artifacts already committed to the object store.

use crate::domain::coordinate::ArtifactCoordinate;

/// Metadata from a HEAD-style lookup.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub content_length: i64,
    pub content_type: String,
    pub etag: String,
    pub last_modified: String,
    pub sha256: Option<String>,
}

/// One entry returned by a `List` call.
#[derive(Debug, Clone)]
pub struct ArtifactEntry {
    pub coordinate: ArtifactCoordinate,
    pub size: i64,
    pub etag: String,
    pub last_modified: String,
}

/// Page of entries with cursor-based pagination.
#[derive(Debug, Clone)]
pub struct ListResult {
    pub entries: Vec<ArtifactEntry>,
    pub next_continuation_token: Option<String>,
    pub is_truncated: bool,
}
