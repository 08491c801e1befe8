//! Object store adapter interface
//!
//! Abstracts the backing S3-compatible object store. Domain and
//! application code depend only on this trait; `infrastructure::s3`
//! provides the real implementation and `infrastructure::s3::fake`
//! provides an in-memory one for tests.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::domain::byte_range::ByteRange;
use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::entities::object::{ListResult, ObjectMetadata};
use crate::domain::errors::TransferError;

/// Result of a direct put or a completed multipart upload.
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: String,
    pub size: i64,
}

/// A single uploaded part, as required to complete a multipart upload.
#[derive(Debug, Clone)]
pub struct PartHandle {
    pub part_number: i32,
    pub etag: String,
}

/// Body plus metadata returned by a download.
pub struct GetResult {
    pub metadata: ObjectMetadata,
    pub body: ByteStream,
}

#[async_trait]
pub trait ObjectStoreAdapter: Send + Sync {
    /// Creates the backing bucket/container if it does not already exist.
    /// Idempotent.
    async fn ensure_container(&self) -> Result<(), TransferError>;

    /// Cheap connectivity check used by readiness probes.
    async fn health(&self) -> Result<(), TransferError>;

    /// Uploads the full body in one call. Used for small artifacts below
    /// the multipart threshold.
    async fn put_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        content_type: &str,
        content_length: i64,
        body: ByteStream,
    ) -> Result<PutResult, TransferError>;

    /// Starts a multipart upload, returning the backend's opaque upload id.
    async fn create_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        content_type: &str,
    ) -> Result<String, TransferError>;

    /// Uploads a single part of an in-progress multipart upload.
    async fn upload_part(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
        part_number: i32,
        body: bytes::Bytes,
    ) -> Result<PartHandle, TransferError>;

    async fn complete_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
        parts: Vec<PartHandle>,
    ) -> Result<PutResult, TransferError>;

    async fn abort_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
    ) -> Result<(), TransferError>;

    /// Streams an artifact's body, optionally restricted to `range`.
    async fn get_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        range: Option<ByteRange>,
    ) -> Result<GetResult, TransferError>;

    async fn head(&self, coordinate: &ArtifactCoordinate) -> Result<ObjectMetadata, TransferError>;

    /// Generates a time-limited, out-of-band GET URL.
    async fn signed_url(
        &self,
        coordinate: &ArtifactCoordinate,
        expires_in_seconds: u64,
    ) -> Result<String, TransferError>;

    async fn list(
        &self,
        app: &str,
        version: &str,
        continuation_token: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ListResult, TransferError>;

    /// Returns whether an object was actually present and removed.
    async fn delete(&self, coordinate: &ArtifactCoordinate) -> Result<bool, TransferError>;
}
