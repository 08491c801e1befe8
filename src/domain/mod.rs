//! Domain layer - Core business logic and entities
//!
//! This module contains:
//! - Coordinate: the stable artifact identity used across every operation
//! - Entities: Core domain objects with identity (sessions, operations, progress)
//! - Repositories: Interfaces for data access (implemented in infrastructure)
//! - Errors: the shared `TransferError` taxonomy

pub mod byte_range;
pub mod coordinate;
pub mod entities;
pub mod errors;
pub mod repositories;
