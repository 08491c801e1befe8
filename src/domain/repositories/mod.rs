//! Repository interfaces
//!
//! Abstract interfaces for data access, implemented in the infrastructure
//! layer.

pub mod object_store;

pub use object_store::*;
