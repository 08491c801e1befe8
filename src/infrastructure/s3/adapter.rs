//! S3-compatible `ObjectStoreAdapter` implementation
//!
//! Backs every artifact operation with a single configured bucket. Built
//! on the AWS SDK for Rust, generalized from a Garage S3 client into a
//! coordinate-addressed adapter.

use async_trait::async_trait;
use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::Builder as S3ConfigBuilder,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
    Client as S3Client,
};
use std::time::Duration;
use tracing::{error, info};

use crate::domain::byte_range::ByteRange;
use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::entities::object::{ArtifactEntry, ListResult, ObjectMetadata};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::{
    GetResult, ObjectStoreAdapter, PartHandle, PutResult,
};
use crate::infrastructure::config::S3Config;
use crate::infrastructure::s3::key_mapping::{coordinate_to_key, key_to_coordinate, list_prefix};
use crate::shared::get_trace_id;

#[derive(Clone)]
pub struct S3ObjectStoreAdapter {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStoreAdapter {
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "artifact-transfer-core",
        );

        let s3_config = S3ConfigBuilder::new()
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStoreAdapter for S3ObjectStoreAdapter {
    async fn ensure_container(&self) -> Result<(), TransferError> {
        let trace_id = get_trace_id();
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(_) => {
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| {
                        error!(trace_id = %trace_id, bucket = %self.bucket, error = %e, "failed to create bucket");
                        TransferError::TransientUnavailable(e.to_string())
                    })?;
                Ok(())
            }
        }
    }

    async fn health(&self) -> Result<(), TransferError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| TransferError::TransientUnavailable(e.to_string()))
    }

    async fn put_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        content_type: &str,
        content_length: i64,
        body: ByteStream,
    ) -> Result<PutResult, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let response = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .content_length(content_length)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to put object");
                TransferError::Internal(e.to_string())
            })?;

        info!(trace_id = %trace_id, key = %key, "object uploaded directly");

        Ok(PutResult {
            etag: response.e_tag().unwrap_or_default().trim_matches('"').to_string(),
            size: content_length,
        })
    }

    async fn create_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        content_type: &str,
    ) -> Result<String, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to create multipart upload");
                TransferError::Internal(e.to_string())
            })?;

        output
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| TransferError::Internal("no upload id returned".to_string()))
    }

    async fn upload_part(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
        part_number: i32,
        body: bytes::Bytes,
    ) -> Result<PartHandle, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(&key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, part_number, error = %e, "failed to upload part");
                TransferError::Internal(e.to_string())
            })?;

        Ok(PartHandle {
            part_number,
            etag: output.e_tag().unwrap_or_default().to_string(),
        })
    }

    async fn complete_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
        parts: Vec<PartHandle>,
    ) -> Result<PutResult, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        let completed_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&key)
            .upload_id(upload_id)
            .multipart_upload(completed_upload)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to complete multipart upload");
                TransferError::Internal(e.to_string())
            })?;

        info!(trace_id = %trace_id, key = %key, parts = parts.len(), "multipart upload completed");

        Ok(PutResult {
            etag: output.e_tag().unwrap_or_default().trim_matches('"').to_string(),
            size: 0,
        })
    }

    async fn abort_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
    ) -> Result<(), TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(&key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to abort multipart upload");
                TransferError::Internal(e.to_string())
            })?;

        info!(trace_id = %trace_id, key = %key, upload_id, "multipart upload aborted");
        Ok(())
    }

    async fn get_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        range: Option<ByteRange>,
    ) -> Result<GetResult, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let mut request = self.client.get_object().bucket(&self.bucket).key(&key);
        if let Some(r) = range {
            request = request.range(r.to_http_range_header());
        }

        let response = request.send().await.map_err(|e| {
            error!(trace_id = %trace_id, key = %key, error = %e, "failed to get object");
            TransferError::NotFound(coordinate.to_string())
        })?;

        let metadata = ObjectMetadata {
            content_length: response.content_length().unwrap_or(0),
            content_type: response
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
            etag: response.e_tag().unwrap_or_default().trim_matches('"').to_string(),
            last_modified: response
                .last_modified()
                .map(|dt| dt.to_string())
                .unwrap_or_default(),
            sha256: None,
        };

        Ok(GetResult {
            metadata,
            body: response.body,
        })
    }

    async fn head(&self, coordinate: &ArtifactCoordinate) -> Result<ObjectMetadata, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to head object");
                TransferError::NotFound(coordinate.to_string())
            })?;

        Ok(ObjectMetadata {
            content_length: response.content_length().unwrap_or(0),
            content_type: response.content_type().unwrap_or_default().to_string(),
            etag: response.e_tag().unwrap_or_default().trim_matches('"').to_string(),
            last_modified: response
                .last_modified()
                .map(|dt| dt.to_string())
                .unwrap_or_default(),
            sha256: response
                .metadata()
                .and_then(|m| m.get("sha256"))
                .cloned(),
        })
    }

    async fn signed_url(
        &self,
        coordinate: &ArtifactCoordinate,
        expires_in_seconds: u64,
    ) -> Result<String, TransferError> {
        let key = coordinate_to_key(coordinate);

        let presigning_config = PresigningConfig::builder()
            .expires_in(Duration::from_secs(expires_in_seconds))
            .build()
            .map_err(|e| TransferError::Internal(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning_config)
            .await
            .map_err(|e| TransferError::Internal(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn list(
        &self,
        app: &str,
        version: &str,
        continuation_token: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ListResult, TransferError> {
        let trace_id = get_trace_id();
        let prefix = list_prefix(app, version);

        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&prefix);

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }
        if let Some(max) = max_keys {
            request = request.max_keys(max);
        }

        let response = request.send().await.map_err(|e| {
            error!(trace_id = %trace_id, prefix = %prefix, error = %e, "failed to list objects");
            TransferError::Internal(e.to_string())
        })?;

        let mut entries = Vec::new();
        for obj in response.contents() {
            let key = obj.key().unwrap_or_default();
            let coordinate = match key_to_coordinate(key) {
                Ok(c) => c,
                Err(_) => continue,
            };
            entries.push(ArtifactEntry {
                coordinate,
                size: obj.size().unwrap_or(0),
                etag: obj.e_tag().unwrap_or_default().trim_matches('"').to_string(),
                last_modified: obj
                    .last_modified()
                    .map(|dt| dt.to_string())
                    .unwrap_or_default(),
            });
        }

        Ok(ListResult {
            entries,
            next_continuation_token: response.next_continuation_token().map(str::to_string),
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn delete(&self, coordinate: &ArtifactCoordinate) -> Result<bool, TransferError> {
        let trace_id = get_trace_id();
        let key = coordinate_to_key(coordinate);

        if self.head(coordinate).await.is_err() {
            return Ok(false);
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                error!(trace_id = %trace_id, key = %key, error = %e, "failed to delete object");
                TransferError::Internal(e.to_string())
            })?;

        info!(trace_id = %trace_id, key = %key, "object deleted");
        Ok(true)
    }
}
