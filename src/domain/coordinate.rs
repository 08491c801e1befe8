//! Artifact coordinate value object
//!
//! An `ArtifactCoordinate` is the stable identity callers use to refer to
//! an artifact. It never leaks the backing object store's key format;
//! that mapping lives in `infrastructure::s3::key_mapping`.

use crate::domain::errors::TransferError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    app: String,
    version: String,
    platform: String,
    filename: String,
}

impl ArtifactCoordinate {
    pub fn new(
        app: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, TransferError> {
        let coordinate = Self {
            app: app.into(),
            version: version.into(),
            platform: platform.into(),
            filename: filename.into(),
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    fn validate(&self) -> Result<(), TransferError> {
        for (field, value) in [
            ("app", &self.app),
            ("version", &self.version),
            ("platform", &self.platform),
            ("filename", &self.filename),
        ] {
            if value.is_empty() {
                return Err(TransferError::validation(format!(
                    "coordinate field '{field}' is required"
                )));
            }
            if value.contains("..") || value.contains('/') || value.contains('\\') {
                return Err(TransferError::validation(format!(
                    "coordinate field '{field}' contains an invalid path segment: {value}"
                )));
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

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl std::fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.app, self.version, self.platform, self.filename
        )
    }
}
