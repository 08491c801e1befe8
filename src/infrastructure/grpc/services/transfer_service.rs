//! Transfer gRPC service
//!
//! Implements the generated `TransferService` trait, translating wire
//! requests into application commands/queries and streaming bodies to and
//! from the object store adapter.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::error;

use crate::application::commands::object::DeleteObjectCommand;
use crate::application::commands::object::handlers::DeleteObjectHandler;
use crate::application::commands::uploads::handlers::{
    AbortUploadHandler, CommitUploadHandler, IngestChunksHandler, InitiateUploadHandler,
};
use crate::application::commands::uploads::{AbortUploadCommand, CommitUploadCommand, InitiateUploadCommand};
use crate::application::queries::download::handlers::{PresignedDownloadHandler, StreamDownloadHandler};
use crate::application::queries::download::{PresignedDownloadQuery, StreamDownloadQuery};
use crate::application::queries::object::handlers::{HeadObjectHandler, ListObjectsHandler};
use crate::application::queries::object::{HeadObjectQuery, ListObjectsQuery};
use crate::application::queries::progress::handlers::SubscribeProgressHandler;
use crate::application::queries::progress::SubscribeProgressQuery;
use crate::domain::byte_range::ByteRange;
use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::entities::download_operation::{DownloadOperation, DownloadStatus};
use crate::domain::entities::upload_session::UploadMode as DomainUploadMode;
use crate::domain::errors::TransferError;
use crate::infrastructure::progress::ProgressRegistry;
use crate::shared::get_trace_id;

use super::super::conversions::TransferErrorExt;
use super::super::generated::transfer::{
    self as proto,
    transfer_service_server::TransferService,
};

pub struct TransferGrpcService {
    initiate_upload: Arc<InitiateUploadHandler>,
    ingest_chunks: Arc<IngestChunksHandler>,
    commit_upload: Arc<CommitUploadHandler>,
    abort_upload: Arc<AbortUploadHandler>,
    stream_download: Arc<StreamDownloadHandler>,
    presigned_download: Arc<PresignedDownloadHandler>,
    head_object: Arc<HeadObjectHandler>,
    list_objects: Arc<ListObjectsHandler>,
    delete_object: Arc<DeleteObjectHandler>,
    subscribe_progress: Arc<SubscribeProgressHandler>,
    progress: Arc<ProgressRegistry>,
    download_read_chunk_bytes: usize,
}

impl TransferGrpcService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiate_upload: Arc<InitiateUploadHandler>,
        ingest_chunks: Arc<IngestChunksHandler>,
        commit_upload: Arc<CommitUploadHandler>,
        abort_upload: Arc<AbortUploadHandler>,
        stream_download: Arc<StreamDownloadHandler>,
        presigned_download: Arc<PresignedDownloadHandler>,
        head_object: Arc<HeadObjectHandler>,
        list_objects: Arc<ListObjectsHandler>,
        delete_object: Arc<DeleteObjectHandler>,
        subscribe_progress: Arc<SubscribeProgressHandler>,
        progress: Arc<ProgressRegistry>,
        download_read_chunk_bytes: usize,
    ) -> Self {
        Self {
            initiate_upload,
            ingest_chunks,
            commit_upload,
            abort_upload,
            stream_download,
            presigned_download,
            head_object,
            list_objects,
            delete_object,
            subscribe_progress,
            progress,
            download_read_chunk_bytes,
        }
    }
}

fn coordinate_from_proto(c: Option<proto::ArtifactCoordinate>) -> Result<ArtifactCoordinate, Status> {
    let c = c.ok_or_else(|| Status::invalid_argument("coordinate is required"))?;
    ArtifactCoordinate::new(c.app, c.version, c.platform, c.filename).into_grpc_result()
}

fn coordinate_to_proto(c: &ArtifactCoordinate) -> proto::ArtifactCoordinate {
    proto::ArtifactCoordinate {
        app: c.app().to_string(),
        version: c.version().to_string(),
        platform: c.platform().to_string(),
        filename: c.filename().to_string(),
    }
}

impl From<DomainUploadMode> for proto::UploadMode {
    fn from(mode: DomainUploadMode) -> Self {
        match mode {
            DomainUploadMode::Direct => proto::UploadMode::Direct,
            DomainUploadMode::Multipart => proto::UploadMode::Multipart,
        }
    }
}

pub type DownloadResponseStream =
    Pin<Box<dyn Stream<Item = Result<proto::DownloadChunkResponse, Status>> + Send>>;
pub type ProgressResponseStream = Pin<Box<dyn Stream<Item = Result<proto::ProgressUpdate, Status>> + Send>>;

#[async_trait]
impl TransferService for TransferGrpcService {
    async fn initiate_upload(
        &self,
        request: Request<proto::InitiateUploadRequest>,
    ) -> Result<Response<proto::InitiateUploadResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let logger = crate::grpc_log!("TransferService", "InitiateUpload", &req);
        let coordinate = coordinate_from_proto(req.coordinate)?;

        let command = InitiateUploadCommand::new(
            coordinate,
            req.content_length,
            req.content_type,
            req.sha256,
        )
        .into_grpc_result()?;

        let result = match self.initiate_upload.handle(command).await {
            Ok(result) => result,
            Err(e) => {
                logger.err(&e.to_string());
                return Err(crate::infrastructure::grpc::conversions::transfer_error_to_status(e));
            }
        };

        let response = proto::InitiateUploadResponse {
            trace_id,
            session_id: result.session_id,
            mode: proto::UploadMode::from(result.mode) as i32,
            chunk_size_hint: result.recommended_chunk_bytes as i64,
        };
        logger.ok(&response);
        Ok(Response::new(response))
    }

    async fn upload_chunks(
        &self,
        request: Request<Streaming<proto::UploadChunkRequest>>,
    ) -> Result<Response<proto::UploadChunksSummary>, Status> {
        let trace_id = get_trace_id();
        let mut inbound = request.into_inner();

        let first = inbound
            .message()
            .await
            .map_err(|e| Status::invalid_argument(e.to_string()))?
            .ok_or_else(|| Status::invalid_argument("upload chunk stream was empty"))?;
        let session_id = first.session_id.clone();

        let first_sequence = first.sequence;
        let first_item = futures::stream::once(async move {
            Ok::<(i64, Bytes), TransferError>((first_sequence, Bytes::from(first.data)))
        });
        let rest = inbound.map(|res| {
            res.map(|chunk| (chunk.sequence, Bytes::from(chunk.data)))
                .map_err(|e| TransferError::Internal(e.to_string()))
        });
        let body = first_item.chain(rest);
        tokio::pin!(body);

        let outcome = self
            .ingest_chunks
            .handle(&session_id, body)
            .await
            .into_grpc_result()?;

        Ok(Response::new(proto::UploadChunksSummary {
            trace_id,
            session_id,
            bytes_received: outcome.bytes_received,
            chunk_count: outcome.chunk_count,
        }))
    }

    async fn commit_upload(
        &self,
        request: Request<proto::CommitUploadRequest>,
    ) -> Result<Response<proto::CommitUploadResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let logger = crate::grpc_log!("TransferService", "CommitUpload", &req);
        let session_id = req.session_id.clone();

        let command = CommitUploadCommand::new(req.session_id).into_grpc_result()?;
        let put = match self.commit_upload.handle(command).await {
            Ok(put) => put,
            Err(e) => {
                logger.err(&e.to_string());
                return Err(crate::infrastructure::grpc::conversions::transfer_error_to_status(e));
            }
        };
        let session = self
            .commit_upload
            .session_snapshot(&session_id)
            .into_grpc_result()?;

        let response = proto::CommitUploadResponse {
            trace_id,
            session_id,
            coordinate: Some(coordinate_to_proto(&session.coordinate)),
            size: put.size,
            etag: put.etag,
            sha256: session.computed_sha256.unwrap_or_default(),
        };
        logger.ok(&response);
        Ok(Response::new(response))
    }

    async fn abort_upload(
        &self,
        request: Request<proto::AbortUploadRequest>,
    ) -> Result<Response<proto::AbortUploadResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let session_id = req.session_id.clone();

        let command = AbortUploadCommand::new(req.session_id, req.reason).into_grpc_result()?;
        self.abort_upload.handle(command).await.into_grpc_result()?;

        Ok(Response::new(proto::AbortUploadResponse {
            trace_id,
            session_id,
            aborted: true,
        }))
    }

    type DownloadStream = DownloadResponseStream;

    async fn download(
        &self,
        request: Request<proto::DownloadRequest>,
    ) -> Result<Response<Self::DownloadStream>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let coordinate = coordinate_from_proto(req.coordinate)?;
        let coordinate_for_operation = coordinate.clone();
        let range = if req.range_start == 0 && req.range_end == 0 {
            None
        } else {
            Some(ByteRange::new(req.range_start, req.range_end).into_grpc_result()?)
        };

        let query = StreamDownloadQuery::new(coordinate, range).into_grpc_result()?;
        let opened = self.stream_download.handle(query).await.into_grpc_result()?;

        let (tx, rx) = mpsc::channel::<Result<proto::DownloadChunkResponse, Status>>(16);
        let progress = self.progress.clone();
        let chunk_size = self.download_read_chunk_bytes;
        let operation_id = opened.operation_id;
        let metadata = opened.metadata;
        let mut body = opened.body;
        let trace_id_for_task = trace_id.clone();

        let metadata_msg = proto::DownloadChunkResponse {
            trace_id: trace_id_for_task.clone(),
            data: Some(proto::download_chunk_response::Data::Metadata(proto::DownloadMetadata {
                content_length: metadata.content_length,
                content_type: metadata.content_type,
                etag: metadata.etag,
                last_modified: metadata.last_modified,
                operation_id: operation_id.clone(),
            })),
        };

        let mut operation = DownloadOperation::new(
            operation_id.clone(),
            coordinate_for_operation,
            metadata.content_length,
        );

        tokio::spawn(async move {
            if tx.send(Ok(metadata_msg)).await.is_err() {
                return;
            }
            let _ = operation.transition_to(DownloadStatus::Streaming);
            let mut sequence: u64 = 0;

            loop {
                match body.next().await {
                    Some(Ok(bytes)) => {
                        for piece in bytes.chunks(chunk_size.max(1)) {
                            operation.record_sent(piece.len());
                            progress.publish(&operation_id, operation.bytes_sent, "streaming download");
                            sequence += 1;
                            let msg = proto::DownloadChunkResponse {
                                trace_id: trace_id_for_task.clone(),
                                data: Some(proto::download_chunk_response::Data::Chunk(proto::DownloadChunk {
                                    data: Bytes::copy_from_slice(piece).to_vec(),
                                    sequence,
                                    is_final: false,
                                })),
                            };
                            if tx.send(Ok(msg)).await.is_err() {
                                let _ = operation.transition_to(DownloadStatus::Cancelled);
                                progress.finish(
                                    &operation_id,
                                    crate::domain::entities::progress::ProgressState::Cancelled,
                                    "subscriber disconnected",
                                );
                                return;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!(operation_id = %operation_id, error = %e, "download body stream failed");
                        let _ = operation.transition_to(DownloadStatus::Failed);
                        progress.finish(
                            &operation_id,
                            crate::domain::entities::progress::ProgressState::Failed,
                            e.to_string(),
                        );
                        let _ = tx.send(Err(Status::internal(e.to_string()))).await;
                        return;
                    }
                    None => break,
                }
            }

            sequence += 1;
            let final_msg = proto::DownloadChunkResponse {
                trace_id: trace_id_for_task.clone(),
                data: Some(proto::download_chunk_response::Data::Chunk(proto::DownloadChunk {
                    data: Vec::new(),
                    sequence,
                    is_final: true,
                })),
            };
            if tx.send(Ok(final_msg)).await.is_err() {
                let _ = operation.transition_to(DownloadStatus::Cancelled);
                progress.finish(
                    &operation_id,
                    crate::domain::entities::progress::ProgressState::Cancelled,
                    "subscriber disconnected",
                );
                return;
            }

            let _ = operation.transition_to(DownloadStatus::Completed);
            progress.finish(
                &operation_id,
                crate::domain::entities::progress::ProgressState::Completed,
                "download complete",
            );
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    async fn get_signed_url(
        &self,
        request: Request<proto::GetSignedUrlRequest>,
    ) -> Result<Response<proto::GetSignedUrlResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let coordinate = coordinate_from_proto(req.coordinate)?;

        let query = PresignedDownloadQuery::new(coordinate, req.expires_in_seconds as u64)
            .into_grpc_result()?;
        let result = self.presigned_download.handle(query).await.into_grpc_result()?;

        let expires_at = (chrono::Utc::now() + chrono::Duration::seconds(result.expires_in_seconds as i64))
            .to_rfc3339();

        Ok(Response::new(proto::GetSignedUrlResponse {
            trace_id,
            url: result.url,
            expires_at,
        }))
    }

    async fn head(
        &self,
        request: Request<proto::HeadRequest>,
    ) -> Result<Response<proto::HeadResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let coordinate = coordinate_from_proto(req.coordinate)?;

        let query = HeadObjectQuery::new(coordinate).into_grpc_result()?;
        let metadata = self.head_object.handle(query).await.into_grpc_result()?;

        Ok(Response::new(proto::HeadResponse {
            trace_id,
            metadata: Some(proto::ObjectMetadata {
                content_length: metadata.content_length,
                content_type: metadata.content_type,
                etag: metadata.etag,
                last_modified: metadata.last_modified,
                sha256: metadata.sha256.unwrap_or_default(),
            }),
        }))
    }

    async fn list(
        &self,
        request: Request<proto::ListRequest>,
    ) -> Result<Response<proto::ListResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();

        let continuation_token = (!req.continuation_token.is_empty()).then_some(req.continuation_token);
        let max_keys = (req.max_keys > 0).then_some(req.max_keys);

        let query = ListObjectsQuery::new(req.app, req.version, continuation_token, max_keys)
            .into_grpc_result()?;
        let result = self.list_objects.handle(query).await.into_grpc_result()?;

        Ok(Response::new(proto::ListResponse {
            trace_id,
            entries: result
                .entries
                .into_iter()
                .map(|e| proto::ArtifactEntry {
                    coordinate: Some(coordinate_to_proto(&e.coordinate)),
                    size: e.size,
                    etag: e.etag,
                    last_modified: e.last_modified,
                })
                .collect(),
            next_continuation_token: result.next_continuation_token.unwrap_or_default(),
            is_truncated: result.is_truncated,
        }))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteRequest>,
    ) -> Result<Response<proto::DeleteResponse>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();
        let coordinate = coordinate_from_proto(req.coordinate)?;

        let command = DeleteObjectCommand::new(coordinate).into_grpc_result()?;
        let deleted = self.delete_object.handle(command).await.into_grpc_result()?;

        Ok(Response::new(proto::DeleteResponse { trace_id, deleted }))
    }

    type SubscribeProgressStream = ProgressResponseStream;

    async fn subscribe_progress(
        &self,
        request: Request<proto::SubscribeProgressRequest>,
    ) -> Result<Response<Self::SubscribeProgressStream>, Status> {
        let trace_id = get_trace_id();
        let req = request.into_inner();

        let query = SubscribeProgressQuery::new(req.id).into_grpc_result()?;
        let mut receiver = self.subscribe_progress.handle(query).await.into_grpc_result()?;

        let (tx, rx) = mpsc::channel::<Result<proto::ProgressUpdate, Status>>(16);
        tokio::spawn(async move {
            while let Some(snapshot) = receiver.recv().await {
                let msg = proto::ProgressUpdate {
                    trace_id: trace_id.clone(),
                    id: snapshot.id,
                    status: format!("{:?}", snapshot.state),
                    bytes_transferred: snapshot.bytes_transferred,
                    total_bytes: snapshot.total_bytes,
                    message: snapshot.message,
                    speed_bps: snapshot.speed_bps,
                    eta_seconds: snapshot.eta_seconds,
                };
                if tx.send(Ok(msg)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}
