//! Upload command handlers

pub mod abort_upload_handler;
pub mod commit_upload_handler;
pub mod ingest_chunks_handler;
pub mod initiate_upload_handler;

pub use abort_upload_handler::AbortUploadHandler;
pub use commit_upload_handler::CommitUploadHandler;
pub use ingest_chunks_handler::{IngestChunksHandler, IngestChunksOutcome};
pub use initiate_upload_handler::{InitiateUploadHandler, InitiateUploadResult};
