//! Infrastructure layer - External services and implementations
//!
//! This module contains:
//! - gRPC server and gateway implementation
//! - S3-compatible object store adapter
//! - Upload session tracking
//! - Progress fan-out
//! - Configuration
//! - Logging
//!
//! Note: `trace_id` and `context` live in `crate::shared`

pub mod config;
pub mod gateway;
pub mod grpc;
pub mod logging;
pub mod progress;
pub mod s3;
pub mod session;
