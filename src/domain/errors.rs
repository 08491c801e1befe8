//! Domain errors
//!
//! `TransferError` is the single error type threaded through the domain
//! and application layers. Infrastructure adapters map their own error
//! types into it at the boundary; `infrastructure::grpc::conversions`
//! maps it onward into a `tonic::Status`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("transient unavailable: {0}")]
    TransientUnavailable(String),

    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TransferError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }
}
