//! Application configuration

use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub grpc_server_addr: String,
    pub gateway_server_addr: String,
    pub log_dir: String,
    pub s3_config: S3Config,
    pub transfer: TransferConfig,
}

/// S3-compatible object store configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 endpoint URL (e.g., http://localhost:3900)
    pub endpoint_url: String,
    /// S3 region
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Bucket all artifacts are stored under
    pub bucket: String,
}

/// Tunables governing chunking, session lifetime, and progress delivery
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Content length at or above which an upload uses multipart mode.
    pub multipart_threshold_bytes: i64,
    /// Hard cap on a single chunk's size.
    pub max_chunk_bytes: usize,
    /// Hint returned to clients in `InitiateUploadResponse`.
    pub recommended_chunk_bytes: usize,
    /// An open session with no activity for this long is evicted.
    pub session_idle_timeout: Duration,
    /// Read buffer size used when streaming a download to the client.
    pub download_read_chunk_bytes: usize,
    /// Minimum spacing between two progress snapshots delivered to the
    /// same subscriber for a non-terminal update.
    pub progress_coalesce_interval: Duration,
    /// How long a terminal progress snapshot stays queryable/retryable
    /// after completion.
    pub progress_retention_after_terminal: Duration,
    /// Per-subscriber bounded buffer capacity for progress fan-out.
    pub subscriber_buffer_capacity: usize,
    /// Absolute cap on a direct-mode session's accumulated bytes when it
    /// declared no size at initiation. Exceeding it fails the chunk with
    /// `ResourceExhausted`.
    pub max_direct_upload_bytes: i64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold_bytes: 16 * 1024 * 1024,
            max_chunk_bytes: 8 * 1024 * 1024,
            recommended_chunk_bytes: 4 * 1024 * 1024,
            session_idle_timeout: Duration::from_secs(15 * 60),
            download_read_chunk_bytes: 256 * 1024,
            progress_coalesce_interval: Duration::from_millis(200),
            progress_retention_after_terminal: Duration::from_secs(60),
            subscriber_buffer_capacity: 16,
            max_direct_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let grpc_server_addr =
            env::var("GRPC_SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:50051".to_string());
        let gateway_server_addr =
            env::var("GATEWAY_SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        let s3_config = S3Config {
            endpoint_url: env::var("S3_ENDPOINT_URL")
                .map_err(|_| ConfigError::MissingEnvVar("S3_ENDPOINT_URL".to_string()))?,
            region: env::var("S3_REGION").unwrap_or_else(|_| "garage".to_string()),
            access_key_id: env::var("S3_ACCESS_KEY_ID")
                .map_err(|_| ConfigError::MissingEnvVar("S3_ACCESS_KEY_ID".to_string()))?,
            secret_access_key: env::var("S3_SECRET_ACCESS_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("S3_SECRET_ACCESS_KEY".to_string()))?,
            bucket: env::var("S3_BUCKET")
                .map_err(|_| ConfigError::MissingEnvVar("S3_BUCKET".to_string()))?,
        };

        let mut transfer = TransferConfig::default();
        if let Ok(v) = env::var("MULTIPART_THRESHOLD_BYTES") {
            transfer.multipart_threshold_bytes = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MULTIPART_THRESHOLD_BYTES".to_string()))?;
        }
        if let Ok(v) = env::var("MAX_CHUNK_BYTES") {
            transfer.max_chunk_bytes = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_CHUNK_BYTES".to_string()))?;
        }
        if let Ok(v) = env::var("SESSION_IDLE_TIMEOUT_SECS") {
            let secs: u64 = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_IDLE_TIMEOUT_SECS".to_string()))?;
            transfer.session_idle_timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = env::var("MAX_DIRECT_UPLOAD_BYTES") {
            transfer.max_direct_upload_bytes = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_DIRECT_UPLOAD_BYTES".to_string()))?;
        }

        Ok(Self {
            grpc_server_addr,
            gateway_server_addr,
            log_dir,
            s3_config,
            transfer,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
