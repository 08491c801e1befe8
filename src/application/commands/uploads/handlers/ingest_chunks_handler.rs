//! Ingest Chunks Handler
//!
//! Drives the body of the `UploadChunks` client-streaming RPC. Sequence
//! numbers are 1-based and must strictly increase with no gaps; an
//! out-of-order chunk is rejected without mutating session state. Digest
//! computation and, for multipart sessions, part buffering are kept as
//! local state for the lifetime of this call rather than persisted
//! per-chunk in the session store — the session is only written back
//! once, when the stream ends.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::entities::upload_session::{SessionStatus, UploadMode};
use crate::domain::errors::TransferError;
use crate::domain::repositories::object_store::{ObjectStoreAdapter, PartHandle};
use crate::infrastructure::config::TransferConfig;
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;
use crate::shared::get_trace_id;

/// S3's minimum part size, except for the final part of an upload.
const MIN_MULTIPART_PART_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct IngestChunksOutcome {
    pub bytes_received: i64,
    pub chunk_count: i64,
}

pub struct IngestChunksHandler {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    config: TransferConfig,
}

impl IngestChunksHandler {
    pub fn new(
        object_store: Arc<dyn ObjectStoreAdapter>,
        sessions: Arc<SessionStore>,
        progress: Arc<ProgressRegistry>,
        config: TransferConfig,
    ) -> Self {
        Self {
            object_store,
            sessions,
            progress,
            config,
        }
    }

    pub async fn handle(
        &self,
        session_id: &str,
        mut chunks: impl Stream<Item = Result<(i64, Bytes), TransferError>> + Unpin,
    ) -> Result<IngestChunksOutcome, TransferError> {
        let trace_id = get_trace_id();
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| TransferError::not_found(format!("upload session {session_id}")))?;

        if session.status != SessionStatus::Open {
            return Err(TransferError::Conflict(format!(
                "upload session {session_id} is not open (status: {:?})",
                session.status
            )));
        }

        let upload_id = session.backend_token.clone();
        let mut hasher = Sha256::new();
        let mut direct_buffer = Vec::new();
        let mut part_buffer = BytesMut::new();
        let mut completed_parts: Vec<PartHandle> = Vec::new();
        let mut next_part_number: i32 = 1;
        let mut bytes_received: i64 = 0;
        let mut chunk_count: i64 = 0;
        let mut expected_sequence: i64 = session.chunk_count + 1;

        while let Some(item) = chunks.next().await {
            let (sequence, chunk) = item?;
            if sequence != expected_sequence {
                return Err(TransferError::validation(format!(
                    "expected chunk sequence {expected_sequence}, got {sequence}"
                )));
            }
            if chunk.len() > self.config.max_chunk_bytes {
                return Err(TransferError::validation(format!(
                    "chunk of {} bytes exceeds the {} byte limit",
                    chunk.len(),
                    self.config.max_chunk_bytes
                )));
            }

            hasher.update(&chunk);
            bytes_received += chunk.len() as i64;
            chunk_count += 1;
            expected_sequence += 1;

            match session.mode {
                UploadMode::Direct => {
                    let limit = if session.content_length > 0 {
                        session.content_length + session.content_length / 10
                    } else {
                        self.config.max_direct_upload_bytes
                    };
                    if bytes_received > limit {
                        return Err(TransferError::resource_exhausted(format!(
                            "direct upload for session {session_id} exceeded the {limit} byte limit"
                        )));
                    }
                    direct_buffer.extend_from_slice(&chunk)
                }
                UploadMode::Multipart => {
                    part_buffer.extend_from_slice(&chunk);
                    if part_buffer.len() >= MIN_MULTIPART_PART_BYTES {
                        let part = self
                            .flush_part(
                                &session.coordinate,
                                upload_id.as_deref(),
                                next_part_number,
                                part_buffer.split().freeze(),
                            )
                            .await?;
                        completed_parts.push(part);
                        next_part_number += 1;
                    }
                }
            }

            self.sessions.update(session_id, |s| {
                s.record_chunk(chunk.len());
                Ok(())
            })?;
            self.progress.publish(
                session_id,
                bytes_received,
                format!("received chunk {chunk_count} ({bytes_received} bytes total)"),
            );
        }

        if session.mode == UploadMode::Multipart && !part_buffer.is_empty() {
            let part = self
                .flush_part(
                    &session.coordinate,
                    upload_id.as_deref(),
                    next_part_number,
                    part_buffer.split().freeze(),
                )
                .await?;
            completed_parts.push(part);
        }

        let computed_sha256 = format!("{:x}", hasher.finalize());

        self.sessions.update(session_id, |s| {
            s.direct_buffer = direct_buffer;
            s.completed_parts = completed_parts;
            s.computed_sha256 = Some(computed_sha256.clone());
            Ok(())
        })?;

        info!(
            trace_id = %trace_id,
            session_id = %session_id,
            bytes_received,
            chunk_count,
            "Finished ingesting upload chunks"
        );

        self.progress
            .publish(session_id, bytes_received, "all chunks received, awaiting commit");

        Ok(IngestChunksOutcome {
            bytes_received,
            chunk_count,
        })
    }

    async fn flush_part(
        &self,
        coordinate: &crate::domain::coordinate::ArtifactCoordinate,
        upload_id: Option<&str>,
        part_number: i32,
        body: Bytes,
    ) -> Result<PartHandle, TransferError> {
        let upload_id = upload_id.ok_or_else(|| {
            TransferError::Internal("multipart session is missing a backend upload id".to_string())
        })?;
        self.object_store
            .upload_part(coordinate, upload_id, part_number, body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::coordinate::ArtifactCoordinate;
    use crate::domain::entities::upload_session::UploadSession;
    use crate::infrastructure::s3::fake::FakeObjectStoreAdapter;

    fn handler() -> (IngestChunksHandler, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new());
        let handler = IngestChunksHandler::new(
            Arc::new(FakeObjectStoreAdapter::new()),
            sessions.clone(),
            Arc::new(ProgressRegistry::new(16, Duration::from_secs(60))),
            TransferConfig::default(),
        );
        (handler, sessions)
    }

    fn open_session(sessions: &SessionStore, id: &str, mode: UploadMode) {
        let coordinate = ArtifactCoordinate::new("app", "1.0.0", "linux", "app.bin").unwrap();
        sessions.insert(UploadSession::new(
            id.to_string(),
            coordinate,
            1024,
            "application/octet-stream".to_string(),
            None,
            mode,
        ));
    }

    #[tokio::test]
    async fn accepts_strictly_increasing_sequence() {
        let (handler, sessions) = handler();
        open_session(&sessions, "s1", UploadMode::Direct);
        let chunks = futures::stream::iter(vec![
            Ok((1, Bytes::from_static(b"hello"))),
            Ok((2, Bytes::from_static(b"world"))),
        ]);
        let outcome = handler.handle("s1", chunks).await.unwrap();
        assert_eq!(outcome.bytes_received, 10);
        assert_eq!(outcome.chunk_count, 2);
    }

    #[tokio::test]
    async fn rejects_out_of_order_sequence() {
        let (handler, sessions) = handler();
        open_session(&sessions, "s2", UploadMode::Direct);
        let chunks = futures::stream::iter(vec![
            Ok((1, Bytes::from_static(b"a"))),
            Ok((3, Bytes::from_static(b"b"))),
        ]);
        let err = handler.handle("s2", chunks).await.unwrap_err();
        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[tokio::test]
    async fn direct_upload_exceeding_declared_size_is_rejected_with_resource_exhausted() {
        let (handler, sessions) = handler();
        let coordinate = ArtifactCoordinate::new("app", "1.0.0", "linux", "app.bin").unwrap();
        sessions.insert(UploadSession::new(
            "s4".to_string(),
            coordinate,
            4,
            "application/octet-stream".to_string(),
            None,
            UploadMode::Direct,
        ));
        let chunks = futures::stream::iter(vec![Ok((1, Bytes::from_static(b"way too much data")))]);
        let err = handler.handle("s4", chunks).await.unwrap_err();
        assert!(matches!(err, TransferError::ResourceExhausted(_)));
    }

    #[tokio::test]
    async fn computes_sha256_over_all_bytes() {
        let (handler, sessions) = handler();
        open_session(&sessions, "s3", UploadMode::Direct);
        let chunks = futures::stream::iter(vec![Ok((1, Bytes::from_static(b"abc")))]);
        handler.handle("s3", chunks).await.unwrap();
        let session = sessions.get("s3").unwrap();
        assert_eq!(
            session.computed_sha256.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
