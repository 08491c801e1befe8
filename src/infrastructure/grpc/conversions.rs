//! gRPC type conversions
//!
//! Maps `TransferError` onto `tonic::Status` so every service method can
//! propagate application errors with `?` via `into_grpc_result()`.

use tonic::Status;

use crate::domain::errors::TransferError;

pub fn transfer_error_to_status(err: TransferError) -> Status {
    match err {
        TransferError::Validation(msg) => Status::invalid_argument(msg),
        TransferError::NotFound(msg) => Status::not_found(msg),
        TransferError::Conflict(msg) => Status::failed_precondition(msg),
        TransferError::PermissionDenied(msg) => Status::permission_denied(msg),
        TransferError::ResourceExhausted(msg) => Status::resource_exhausted(msg),
        TransferError::TransientUnavailable(msg) => Status::unavailable(msg),
        TransferError::Integrity(msg) => Status::failed_precondition(msg),
        TransferError::Cancelled(msg) => Status::cancelled(msg),
        TransferError::Internal(msg) => Status::internal(msg),
    }
}

/// Extension trait for `Result<T, TransferError>`, letting it convert
/// directly into `Result<T, Status>`.
pub trait TransferErrorExt<T> {
    fn into_grpc_result(self) -> Result<T, Status>;
}

impl<T> TransferErrorExt<T> for Result<T, TransferError> {
    fn into_grpc_result(self) -> Result<T, Status> {
        self.map_err(transfer_error_to_status)
    }
}
