//! Download operation entity
//!
//! Mirrors `UploadSession` on the read side: tracked from the moment a
//! `Download` RPC opens the backing object until the stream finishes,
//! fails, or the client disconnects.

use chrono::{DateTime, Utc};

use crate::domain::coordinate::ArtifactCoordinate;
use crate::domain::errors::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Opening,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone)]
pub struct DownloadOperation {
    pub id: String,
    pub coordinate: ArtifactCoordinate,
    pub total_bytes: i64,
    pub bytes_sent: i64,
    pub status: DownloadStatus,
    pub created_at: DateTime<Utc>,
}

impl DownloadOperation {
    pub fn new(id: String, coordinate: ArtifactCoordinate, total_bytes: i64) -> Self {
        Self {
            id,
            coordinate,
            total_bytes,
            bytes_sent: 0,
            status: DownloadStatus::Opening,
            created_at: Utc::now(),
        }
    }

    pub fn record_sent(&mut self, len: usize) {
        self.bytes_sent += len as i64;
        if self.status == DownloadStatus::Opening {
            self.status = DownloadStatus::Streaming;
        }
    }

    pub fn transition_to(&mut self, next: DownloadStatus) -> Result<(), TransferError> {
        let allowed = matches!(
            (self.status, next),
            (DownloadStatus::Opening, DownloadStatus::Streaming)
                | (DownloadStatus::Opening, DownloadStatus::Failed)
                | (DownloadStatus::Opening, DownloadStatus::Cancelled)
                | (DownloadStatus::Streaming, DownloadStatus::Completed)
                | (DownloadStatus::Streaming, DownloadStatus::Failed)
                | (DownloadStatus::Streaming, DownloadStatus::Cancelled)
        );
        if !allowed {
            return Err(TransferError::Conflict(format!(
                "cannot transition download operation {} from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}
