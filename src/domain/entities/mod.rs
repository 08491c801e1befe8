//! Domain entities
//!
//! Core domain objects with identity and lifecycle.

pub mod download_operation;
pub mod object;
pub mod progress;
pub mod upload_session;

pub use download_operation::*;
pub use object::*;
pub use progress::*;
pub use upload_session::*;
