//! List Objects Query

use crate::domain::errors::TransferError;

/// Query to list artifacts published for an app/version.
#[derive(Debug, Clone)]
pub struct ListObjectsQuery {
    app: String,
    version: String,
    continuation_token: Option<String>,
    max_keys: Option<i32>,
}

impl ListObjectsQuery {
    pub fn new(
        app: String,
        version: String,
        continuation_token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<Self, TransferError> {
        let query = Self {
            app,
            version,
            continuation_token,
            max_keys,
        };
        query.validate()?;
        Ok(query)
    }

    fn validate(&self) -> Result<(), TransferError> {
        if self.app.is_empty() {
            return Err(TransferError::validation("app is required"));
        }
        if self.version.is_empty() {
            return Err(TransferError::validation("version is required"));
        }
        if let Some(max) = self.max_keys {
            if max <= 0 || max > 1000 {
                return Err(TransferError::validation("max_keys must be between 1 and 1000"));
            }
        }
        Ok(())
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    pub fn max_keys(&self) -> Option<i32> {
        self.max_keys
    }
}
