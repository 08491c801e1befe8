//! Progress Queries - Read access to upload/download progress

pub mod subscribe_progress;

pub mod handlers;

pub use subscribe_progress::*;
