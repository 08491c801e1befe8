//! gRPC server

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

use crate::domain::repositories::object_store::ObjectStoreAdapter;
use crate::infrastructure::config::TransferConfig;
use crate::infrastructure::progress::ProgressRegistry;
use crate::infrastructure::session::SessionStore;

use super::composition::TransferServiceBuilder;
use super::generated::transfer::transfer_service_server::TransferServiceServer;
use super::middleware::LoggingLayer;

pub struct GrpcServer {
    addr: SocketAddr,
    object_store: Arc<dyn ObjectStoreAdapter>,
    sessions: Arc<SessionStore>,
    progress: Arc<ProgressRegistry>,
    config: TransferConfig,
}

impl GrpcServer {
    pub fn new(
        addr: SocketAddr,
        object_store: Arc<dyn ObjectStoreAdapter>,
        sessions: Arc<SessionStore>,
        progress: Arc<ProgressRegistry>,
        config: TransferConfig,
    ) -> Self {
        Self {
            addr,
            object_store,
            sessions,
            progress,
            config,
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let transfer_service =
            TransferServiceBuilder::new(self.object_store, self.sessions, self.progress, self.config).build();

        info!("Starting gRPC server |\n addr: {}", self.addr);

        Server::builder()
            .layer(LoggingLayer)
            .add_service(TransferServiceServer::new(transfer_service))
            .serve(self.addr)
            .await?;

        Ok(())
    }
}
