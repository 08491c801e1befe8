//! End-to-end tests driving the application handlers together against the
//! in-memory fake object store, the way the gRPC service layer composes
//! them in `infrastructure::grpc::composition::TransferServiceBuilder`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;

use artifact_transfer_core::application::commands::object::handlers::delete_object_handler::DeleteObjectHandler;
use artifact_transfer_core::application::commands::object::DeleteObjectCommand;
use artifact_transfer_core::application::commands::uploads::handlers::abort_upload_handler::AbortUploadHandler;
use artifact_transfer_core::application::commands::uploads::handlers::commit_upload_handler::CommitUploadHandler;
use artifact_transfer_core::application::commands::uploads::handlers::ingest_chunks_handler::IngestChunksHandler;
use artifact_transfer_core::application::commands::uploads::handlers::initiate_upload_handler::InitiateUploadHandler;
use artifact_transfer_core::application::commands::uploads::{AbortUploadCommand, CommitUploadCommand, InitiateUploadCommand};
use artifact_transfer_core::application::queries::download::handlers::presigned_download_handler::PresignedDownloadHandler;
use artifact_transfer_core::application::queries::download::handlers::stream_download_handler::StreamDownloadHandler;
use artifact_transfer_core::application::queries::download::{PresignedDownloadQuery, StreamDownloadQuery};
use artifact_transfer_core::application::queries::object::handlers::head_object_handler::HeadObjectHandler;
use artifact_transfer_core::application::queries::object::handlers::list_objects_handler::ListObjectsHandler;
use artifact_transfer_core::application::queries::object::{HeadObjectQuery, ListObjectsQuery};
use artifact_transfer_core::domain::byte_range::ByteRange;
use artifact_transfer_core::domain::coordinate::ArtifactCoordinate;
use artifact_transfer_core::domain::entities::progress::ProgressState;
use artifact_transfer_core::domain::entities::upload_session::{SessionStatus, UploadMode};
use artifact_transfer_core::domain::errors::TransferError;
use artifact_transfer_core::domain::repositories::object_store::ObjectStoreAdapter;
use artifact_transfer_core::infrastructure::config::TransferConfig;
use artifact_transfer_core::infrastructure::progress::ProgressRegistry;
use artifact_transfer_core::infrastructure::s3::FakeObjectStoreAdapter;
use artifact_transfer_core::infrastructure::session::SessionStore;

struct Harness {
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    config: TransferConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            object_store: Arc::new(FakeObjectStoreAdapter::new()),
            sessions: Arc::new(SessionStore::new()),
            progress: Arc::new(ProgressRegistry::new(16, Duration::from_secs(60))),
            config: TransferConfig::default(),
        }
    }

    fn initiate(&self) -> InitiateUploadHandler {
        InitiateUploadHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
            self.config.clone(),
        )
    }

    fn ingest(&self) -> IngestChunksHandler {
        IngestChunksHandler::new(
            self.object_store.clone(),
            self.sessions.clone(),
            self.progress.clone(),
            self.config.clone(),
        )
    }

    fn commit(&self) -> CommitUploadHandler {
        CommitUploadHandler::new(self.object_store.clone(), self.sessions.clone(), self.progress.clone())
    }

    fn abort(&self) -> AbortUploadHandler {
        AbortUploadHandler::new(self.object_store.clone(), self.sessions.clone(), self.progress.clone())
    }

    fn stream_download(&self) -> StreamDownloadHandler {
        StreamDownloadHandler::new(self.object_store.clone(), self.progress.clone())
    }

    fn presigned_download(&self) -> PresignedDownloadHandler {
        PresignedDownloadHandler::new(self.object_store.clone())
    }

    fn head(&self) -> HeadObjectHandler {
        HeadObjectHandler::new(self.object_store.clone())
    }

    fn list(&self) -> ListObjectsHandler {
        ListObjectsHandler::new(self.object_store.clone())
    }

    fn delete(&self) -> DeleteObjectHandler {
        DeleteObjectHandler::new(self.object_store.clone())
    }
}

fn demo_coordinate() -> ArtifactCoordinate {
    ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", "demo.bin").unwrap()
}

async fn upload_payload(
    harness: &Harness,
    coordinate: ArtifactCoordinate,
    payload: &'static [u8],
) -> String {
    let initiate = InitiateUploadCommand::new(
        coordinate,
        payload.len() as i64,
        "application/octet-stream".to_string(),
        None,
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();

    let chunks = futures::stream::iter(vec![Ok::<(i64, Bytes), TransferError>((
        1,
        Bytes::from_static(payload),
    ))]);
    harness.ingest().handle(&opened.session_id, chunks).await.unwrap();

    harness
        .commit()
        .handle(CommitUploadCommand::new(opened.session_id.clone()).unwrap())
        .await
        .unwrap();

    opened.session_id
}

#[tokio::test]
async fn full_upload_then_download_round_trip() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();

    let session_id = upload_payload(&harness, coordinate.clone(), b"hello world").await;
    let session = harness.sessions.get(&session_id).unwrap();
    assert_eq!(session.status, SessionStatus::Committed);
    assert_eq!(session.bytes_received, 11);

    let metadata = harness
        .head()
        .handle(HeadObjectQuery::new(coordinate.clone()).unwrap())
        .await
        .unwrap();
    assert_eq!(metadata.content_length, 11);

    let opened = harness
        .stream_download()
        .handle(StreamDownloadQuery::new(coordinate.clone(), None).unwrap())
        .await
        .unwrap();
    let mut body = opened.body;
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected, b"hello world");
}

#[tokio::test]
async fn commit_rejects_payload_not_matching_declared_digest() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();

    let initiate = InitiateUploadCommand::new(
        coordinate,
        3,
        "application/octet-stream".to_string(),
        Some("0".repeat(64)),
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();

    let chunks = futures::stream::iter(vec![Ok::<(i64, Bytes), TransferError>((
        1,
        Bytes::from_static(b"abc"),
    ))]);
    harness.ingest().handle(&opened.session_id, chunks).await.unwrap();

    let err = harness
        .commit()
        .handle(CommitUploadCommand::new(opened.session_id.clone()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Integrity(_)));

    let session = harness.sessions.get(&opened.session_id).unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[tokio::test]
async fn out_of_order_chunk_leaves_session_state_unchanged() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();

    let initiate = InitiateUploadCommand::new(
        coordinate,
        10,
        "application/octet-stream".to_string(),
        None,
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();

    let before = harness.sessions.get(&opened.session_id).unwrap();

    let chunks = futures::stream::iter(vec![Ok::<(i64, Bytes), TransferError>((
        2,
        Bytes::from_static(b"oops"),
    ))]);
    let err = harness.ingest().handle(&opened.session_id, chunks).await.unwrap_err();
    assert!(matches!(err, TransferError::Validation(_)));

    let after = harness.sessions.get(&opened.session_id).unwrap();
    assert_eq!(before.bytes_received, after.bytes_received);
    assert_eq!(before.chunk_count, after.chunk_count);
}

#[tokio::test]
async fn abort_before_commit_prevents_later_commit() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();

    let initiate = InitiateUploadCommand::new(
        coordinate,
        5,
        "application/octet-stream".to_string(),
        None,
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();

    harness
        .abort()
        .handle(AbortUploadCommand::new(opened.session_id.clone(), "client changed its mind".to_string()).unwrap())
        .await
        .unwrap();

    let err = harness
        .commit()
        .handle(CommitUploadCommand::new(opened.session_id.clone()).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Conflict(_)));
}

#[tokio::test]
async fn multipart_mode_selected_above_threshold_and_completes() {
    let mut harness = Harness::new();
    harness.config.multipart_threshold_bytes = 4;
    let coordinate = demo_coordinate();

    let initiate = InitiateUploadCommand::new(
        coordinate,
        8,
        "application/octet-stream".to_string(),
        None,
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();
    assert_eq!(opened.mode, UploadMode::Multipart);

    let chunks = futures::stream::iter(vec![
        Ok::<(i64, Bytes), TransferError>((1, Bytes::from_static(b"abcd"))),
        Ok::<(i64, Bytes), TransferError>((2, Bytes::from_static(b"efgh"))),
    ]);
    harness.ingest().handle(&opened.session_id, chunks).await.unwrap();

    harness
        .commit()
        .handle(CommitUploadCommand::new(opened.session_id.clone()).unwrap())
        .await
        .unwrap();

    let session = harness.sessions.get(&opened.session_id).unwrap();
    assert_eq!(session.status, SessionStatus::Committed);
}

#[tokio::test]
async fn list_then_delete_removes_artifact() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();
    upload_payload(&harness, coordinate.clone(), b"payload").await;

    let listed = harness
        .list()
        .handle(ListObjectsQuery::new("demo".to_string(), "1.0.0".to_string(), None, None).unwrap())
        .await
        .unwrap();
    assert_eq!(listed.entries.len(), 1);

    let deleted = harness
        .delete()
        .handle(DeleteObjectCommand::new(coordinate.clone()).unwrap())
        .await
        .unwrap();
    assert!(deleted);

    let err = harness
        .head()
        .handle(HeadObjectQuery::new(coordinate).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NotFound(_)));
}

#[tokio::test]
async fn list_pagination_visits_each_entry_exactly_once() {
    let harness = Harness::new();
    for filename in ["a.bin", "b.bin", "c.bin", "d.bin", "e.bin"] {
        let coordinate = ArtifactCoordinate::new("demo", "1.0.0", "linux-x64", filename).unwrap();
        upload_payload(&harness, coordinate, b"payload").await;
    }

    let mut seen = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = harness
            .list()
            .handle(ListObjectsQuery::new("demo".to_string(), "1.0.0".to_string(), token.clone(), Some(2)).unwrap())
            .await
            .unwrap();
        assert!(page.entries.len() <= 2);
        seen.extend(page.entries.into_iter().map(|e| e.coordinate.to_string()));
        match page.next_continuation_token {
            Some(next) if page.is_truncated => token = Some(next),
            _ => break,
        }
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn ranged_download_returns_only_the_requested_bytes() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();
    upload_payload(&harness, coordinate.clone(), b"hello world").await;

    let range = ByteRange::new(6, 11).unwrap();
    let opened = harness
        .stream_download()
        .handle(StreamDownloadQuery::new(coordinate, Some(range)).unwrap())
        .await
        .unwrap();
    let mut body = opened.body;
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected, b"world");
}

#[tokio::test]
async fn presigned_url_available_after_commit() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();
    upload_payload(&harness, coordinate.clone(), b"payload").await;

    let signed = harness
        .presigned_download()
        .handle(PresignedDownloadQuery::new(coordinate, 3600).unwrap())
        .await
        .unwrap();
    assert!(!signed.url.is_empty());
}

#[tokio::test]
async fn progress_reaches_a_terminal_state_on_commit() {
    let harness = Harness::new();
    let coordinate = demo_coordinate();

    let initiate = InitiateUploadCommand::new(
        coordinate,
        5,
        "application/octet-stream".to_string(),
        None,
    )
    .unwrap();
    let opened = harness.initiate().handle(initiate).await.unwrap();
    let mut subscriber = harness.progress.subscribe(&opened.session_id);

    let chunks = futures::stream::iter(vec![Ok::<(i64, Bytes), TransferError>((
        1,
        Bytes::from_static(b"hello"),
    ))]);
    harness.ingest().handle(&opened.session_id, chunks).await.unwrap();
    harness
        .commit()
        .handle(CommitUploadCommand::new(opened.session_id.clone()).unwrap())
        .await
        .unwrap();

    let mut saw_terminal = false;
    while let Some(snapshot) = subscriber.recv().await {
        if snapshot.state.is_terminal() {
            saw_terminal = true;
            assert_eq!(snapshot.state, ProgressState::Completed);
            break;
        }
    }
    assert!(saw_terminal);
}
