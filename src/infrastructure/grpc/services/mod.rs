//! gRPC service implementations
//!
//! Connects the protobuf-generated service trait to the application
//! layer handlers.

pub mod transfer_service;

pub use transfer_service::TransferGrpcService;
