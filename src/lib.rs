//! artifact-transfer-core - chunked artifact upload/download service
//!
//! Architecture: DDD (Domain-Driven Design) + CQRS
//! Protocol: gRPC, plus a WebSocket gateway for progress subscriptions

pub mod shared;
pub mod domain;
pub mod application;
pub mod infrastructure;
