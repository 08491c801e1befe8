//! Service Composition
//!
//! Wires the application handlers into the gRPC service, keeping
//! dependency injection out of `server.rs` so it can focus on startup and
//! routing.

mod transfer;

pub use transfer::TransferServiceBuilder;
