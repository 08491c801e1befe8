//! Byte range value object for partial downloads

use crate::domain::errors::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    /// Half-open `[start, end)`: `start` is inclusive, `end` is exclusive.
    pub fn new(start: i64, end: i64) -> Result<Self, TransferError> {
        if start < 0 || end <= start {
            return Err(TransferError::validation(format!(
                "invalid byte range {start}-{end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len(self) -> i64 {
        self.end - self.start
    }

    /// HTTP Range headers are inclusive on both ends, so `end` is
    /// translated down by one when forwarded to the adapter.
    pub fn to_http_range_header(self) -> String {
        format!("bytes={}-{}", self.start, self.end - 1)
    }
}
