//! artifact-transfer-core - Main entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use artifact_transfer_core::domain::entities::upload_session::UploadMode;
use artifact_transfer_core::domain::repositories::object_store::ObjectStoreAdapter;
use artifact_transfer_core::infrastructure::config::AppConfig;
use artifact_transfer_core::infrastructure::gateway::SubscriptionGateway;
use artifact_transfer_core::infrastructure::grpc::GrpcServer;
use artifact_transfer_core::infrastructure::logging::init_logging;
use artifact_transfer_core::infrastructure::progress::ProgressRegistry;
use artifact_transfer_core::infrastructure::s3::S3ObjectStoreAdapter;
use artifact_transfer_core::infrastructure::session::SessionStore;

/// Periodically evicts upload sessions that have been idle past the
/// configured timeout, aborting their backing multipart upload (if any)
/// and retiring their progress entry.
async fn run_eviction_sweep(
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    idle_timeout: chrono::Duration,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    loop {
        ticker.tick().await;
        let evicted = sessions.sweep_idle(idle_timeout);
        for session in evicted {
            warn!(session_id = %session.id, "evicting idle upload session");
            if session.mode == UploadMode::Multipart {
                if let Some(upload_id) = &session.backend_token {
                    if let Err(e) = object_store.abort_multipart(&session.coordinate, upload_id).await {
                        warn!(session_id = %session.id, error = %e, "failed to abort multipart upload for evicted session");
                    }
                }
            }
            progress.finish(
                &session.id,
                artifact_transfer_core::domain::entities::progress::ProgressState::Failed,
                "session evicted after idle timeout",
            );
        }
        progress.sweep_expired(chrono::Utc::now());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let _guard = init_logging(&config.log_dir);

    info!(
        "Starting artifact-transfer-core |\n grpc_server_addr: {} |\n gateway_server_addr: {} |\n log_dir: {} |\n s3_endpoint: {} |\n bucket: {}",
        config.grpc_server_addr,
        config.gateway_server_addr,
        config.log_dir,
        config.s3_config.endpoint_url,
        config.s3_config.bucket,
    );

    let object_store: Arc<dyn ObjectStoreAdapter> = Arc::new(S3ObjectStoreAdapter::new(&config.s3_config).await);
    object_store.ensure_container().await?;

    let sessions = Arc::new(SessionStore::new());
    let progress = Arc::new(ProgressRegistry::new(
        config.transfer.subscriber_buffer_capacity,
        config.transfer.progress_retention_after_terminal,
    ));

    let idle_timeout = chrono::Duration::from_std(config.transfer.session_idle_timeout)
        .unwrap_or_else(|_| chrono::Duration::minutes(15));
    tokio::spawn(run_eviction_sweep(
        object_store.clone(),
        sessions.clone(),
        progress.clone(),
        idle_timeout,
    ));

    let grpc_addr: SocketAddr = config.grpc_server_addr.parse()?;
    let gateway_addr: SocketAddr = config.gateway_server_addr.parse()?;

    let grpc_server = GrpcServer::new(
        grpc_addr,
        object_store,
        sessions,
        progress.clone(),
        config.transfer,
    );
    let gateway = SubscriptionGateway::new(gateway_addr, progress);

    tokio::try_join!(
        async { grpc_server.run().await.map_err(|e| e.to_string()) },
        async { gateway.run().await.map_err(|e| e.to_string()) },
    )
    .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    Ok(())
}
