//! Download Queries - Read operations that move artifact bytes back to the caller

pub mod presigned_download;
pub mod stream_download;

pub mod handlers;

pub use presigned_download::*;
pub use stream_download::*;
