//! Command handlers - Write operations
//!
//! Each command has its own module with handler and command struct

// Upload lifecycle commands (InitiateUpload / UploadChunks / CommitUpload / AbortUpload)
pub mod uploads;

// Commands against artifacts already committed to the object store (Delete)
pub mod object;
