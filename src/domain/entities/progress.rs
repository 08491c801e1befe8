//! Progress snapshot entity
//!
//! The unit of data the Progress Registry fans out to subscribers. One
//! snapshot describes the current state of a single upload session or
//! download operation at a point in time.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    /// Synthetic terminal state handed to subscribers of an id that
    /// never existed (or has already been reaped). Never set by
    /// `advance`/`finish` on a real registry entry.
    NotFound,
}

impl ProgressState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::NotFound
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub id: String,
    pub state: ProgressState,
    pub bytes_transferred: i64,
    pub total_bytes: i64,
    pub message: String,
    pub observed_at: DateTime<Utc>,
    started_at: DateTime<Utc>,
    /// Average bytes/second since the snapshot was created, derived on
    /// every update from `bytes_transferred / (observed_at - started_at)`.
    pub speed_bps: f64,
    /// `None` until `speed_bps` and `total_bytes` are both known-positive.
    pub eta_seconds: Option<f64>,
}

impl ProgressSnapshot {
    pub fn new(id: impl Into<String>, total_bytes: i64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: ProgressState::Pending,
            bytes_transferred: 0,
            total_bytes,
            message: String::new(),
            observed_at: now,
            started_at: now,
            speed_bps: 0.0,
            eta_seconds: None,
        }
    }

    /// A terminal snapshot for an id that has no registry entry, delivered
    /// to subscribers in place of an RPC-level "not found" error.
    pub fn not_found(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: ProgressState::NotFound,
            bytes_transferred: 0,
            total_bytes: 0,
            message: "no such upload/download id".to_string(),
            observed_at: now,
            started_at: now,
            speed_bps: 0.0,
            eta_seconds: None,
        }
    }

    pub fn advance(&mut self, bytes_transferred: i64, message: impl Into<String>) {
        self.state = ProgressState::InProgress;
        self.bytes_transferred = bytes_transferred;
        self.message = message.into();
        self.observed_at = Utc::now();
        self.recompute_rate();
    }

    pub fn finish(&mut self, state: ProgressState, message: impl Into<String>) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.message = message.into();
        self.observed_at = Utc::now();
        self.recompute_rate();
    }

    fn recompute_rate(&mut self) {
        let elapsed_secs = (self.observed_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        self.speed_bps = if elapsed_secs > 0.0 {
            self.bytes_transferred as f64 / elapsed_secs
        } else {
            0.0
        };
        self.eta_seconds = if self.speed_bps > 0.0 && self.total_bytes > 0 {
            let remaining = (self.total_bytes - self.bytes_transferred).max(0) as f64;
            Some((remaining / self.speed_bps).max(0.0))
        } else {
            None
        };
    }
}
