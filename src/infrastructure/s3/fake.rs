//! In-memory `ObjectStoreAdapter` for tests
//!
//! Exercised by the unit and integration tests; never wired into
//! `main.rs`. Gated behind `#[cfg(any(test, feature = "test-utils"))]` so
//! `tests/` can depend on it without pulling it into release builds.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::domain::byte_range::ByteRange;
use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::entities::object::{ArtifactEntry, ListResult, ObjectMetadata};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::{
    GetResult, ObjectStoreAdapter, PartHandle, PutResult,
};
use crate::infrastructure::s3::key_mapping::coordinate_to_key;

struct StoredObject {
    body: Vec<u8>,
    content_type: String,
    etag: String,
}

#[derive(Default)]
pub struct FakeObjectStoreAdapter {
    objects: Mutex<HashMap<String, StoredObject>>,
    multiparts: Mutex<HashMap<String, Vec<(i32, Vec<u8>)>>>,
}

impl FakeObjectStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_etag(len: usize) -> String {
        format!("fake-etag-{len}")
    }
}

#[async_trait]
impl ObjectStoreAdapter for FakeObjectStoreAdapter {
    async fn ensure_container(&self) -> Result<(), TransferError> {
        Ok(())
    }

    async fn health(&self) -> Result<(), TransferError> {
        Ok(())
    }

    async fn put_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        content_type: &str,
        _content_length: i64,
        body: ByteStream,
    ) -> Result<PutResult, TransferError> {
        let bytes = body
            .collect()
            .await
            .map_err(|e| TransferError::Internal(e.to_string()))?
            .into_bytes();
        let key = coordinate_to_key(coordinate);
        let etag = Self::next_etag(bytes.len());
        let size = bytes.len() as i64;
        self.objects.lock().unwrap().insert(
            key,
            StoredObject {
                body: bytes.to_vec(),
                content_type: content_type.to_string(),
                etag: etag.clone(),
            },
        );
        Ok(PutResult { etag, size })
    }

    async fn create_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        _content_type: &str,
    ) -> Result<String, TransferError> {
        let upload_id = format!("fake-upload-{}", coordinate_to_key(coordinate));
        self.multiparts.lock().unwrap().insert(upload_id.clone(), Vec::new());
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _coordinate: &ArtifactCoordinate,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<PartHandle, TransferError> {
        let mut guard = self.multiparts.lock().unwrap();
        let parts = guard
            .get_mut(upload_id)
            .ok_or_else(|| TransferError::NotFound(format!("unknown upload {upload_id}")))?;
        parts.push((part_number, body.to_vec()));
        Ok(PartHandle {
            part_number,
            etag: format!("fake-part-etag-{part_number}"),
        })
    }

    async fn complete_multipart(
        &self,
        coordinate: &ArtifactCoordinate,
        upload_id: &str,
        mut parts: Vec<PartHandle>,
    ) -> Result<PutResult, TransferError> {
        parts.sort_by_key(|p| p.part_number);
        let mut guard = self.multiparts.lock().unwrap();
        let stored_parts = guard
            .remove(upload_id)
            .ok_or_else(|| TransferError::NotFound(format!("unknown upload {upload_id}")))?;
        let mut ordered: Vec<(i32, Vec<u8>)> = stored_parts;
        ordered.sort_by_key(|(n, _)| *n);

        let mut body = Vec::new();
        for (_, chunk) in ordered {
            body.extend_from_slice(&chunk);
        }

        let etag = Self::next_etag(body.len());
        let size = body.len() as i64;
        let key = coordinate_to_key(coordinate);
        self.objects.lock().unwrap().insert(
            key,
            StoredObject {
                body,
                content_type: "application/octet-stream".to_string(),
                etag: etag.clone(),
            },
        );
        Ok(PutResult { etag, size })
    }

    async fn abort_multipart(
        &self,
        _coordinate: &ArtifactCoordinate,
        upload_id: &str,
    ) -> Result<(), TransferError> {
        self.multiparts.lock().unwrap().remove(upload_id);
        Ok(())
    }

    async fn get_stream(
        &self,
        coordinate: &ArtifactCoordinate,
        range: Option<ByteRange>,
    ) -> Result<GetResult, TransferError> {
        let key = coordinate_to_key(coordinate);
        let guard = self.objects.lock().unwrap();
        let stored = guard
            .get(&key)
            .ok_or_else(|| TransferError::NotFound(coordinate.to_string()))?;

        let body = match range {
            Some(r) => {
                let start = (r.start as usize).min(stored.body.len());
                let end = (r.end as usize).min(stored.body.len());
                stored.body[start..end.max(start)].to_vec()
            }
            None => stored.body.clone(),
        };

        Ok(GetResult {
            metadata: ObjectMetadata {
                content_length: stored.body.len() as i64,
                content_type: stored.content_type.clone(),
                etag: stored.etag.clone(),
                last_modified: String::new(),
                sha256: None,
            },
            body: ByteStream::from(body),
        })
    }

    async fn head(&self, coordinate: &ArtifactCoordinate) -> Result<ObjectMetadata, TransferError> {
        let key = coordinate_to_key(coordinate);
        let guard = self.objects.lock().unwrap();
        let stored = guard
            .get(&key)
            .ok_or_else(|| TransferError::NotFound(coordinate.to_string()))?;
        Ok(ObjectMetadata {
            content_length: stored.body.len() as i64,
            content_type: stored.content_type.clone(),
            etag: stored.etag.clone(),
            last_modified: String::new(),
            sha256: None,
        })
    }

    async fn signed_url(
        &self,
        coordinate: &ArtifactCoordinate,
        expires_in_seconds: u64,
    ) -> Result<String, TransferError> {
        Ok(format!(
            "https://fake.local/{}?expires_in={}",
            coordinate_to_key(coordinate),
            expires_in_seconds
        ))
    }

    async fn list(
        &self,
        app: &str,
        version: &str,
        continuation_token: Option<&str>,
        max_keys: Option<i32>,
    ) -> Result<ListResult, TransferError> {
        let prefix = crate::infrastructure::s3::key_mapping::list_prefix(app, version);
        let guard = self.objects.lock().unwrap();
        let mut entries: Vec<ArtifactEntry> = guard
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, obj)| {
                crate::infrastructure::s3::key_mapping::key_to_coordinate(key)
                    .ok()
                    .map(|coordinate| ArtifactEntry {
                        coordinate,
                        size: obj.body.len() as i64,
                        etag: obj.etag.clone(),
                        last_modified: String::new(),
                    })
            })
            .collect();
        entries.sort_by(|a, b| a.coordinate.to_string().cmp(&b.coordinate.to_string()));

        // The continuation token is the key of the last entry returned by
        // the previous page; resume just past it in the sorted order.
        if let Some(token) = continuation_token {
            entries.retain(|e| e.coordinate.to_string().as_str() > token);
        }

        let max = max_keys.unwrap_or(1000) as usize;
        let is_truncated = entries.len() > max;
        entries.truncate(max);

        let next_continuation_token = if is_truncated {
            entries.last().map(|e| e.coordinate.to_string())
        } else {
            None
        };

        Ok(ListResult {
            entries,
            next_continuation_token,
            is_truncated,
        })
    }

    async fn delete(&self, coordinate: &ArtifactCoordinate) -> Result<bool, TransferError> {
        let key = coordinate_to_key(coordinate);
        Ok(self.objects.lock().unwrap().remove(&key).is_some())
    }
}
