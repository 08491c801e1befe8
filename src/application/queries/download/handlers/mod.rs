//! Download Query Handlers

pub mod presigned_download_handler;
pub mod stream_download_handler;

pub use presigned_download_handler::{PresignedDownloadHandler, SignedUrlResult};
pub use stream_download_handler::{OpenedDownload, StreamDownloadHandler};
