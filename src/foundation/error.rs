/// Convenience result type used across isoframe.
pub type IsoResult<T> = Result<T, IsoError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Frame rendering itself degrades instead of failing; these errors surface from surface
/// allocation, configuration loading and asset preparation.
#[derive(thiserror::Error, Debug)]
pub enum IsoError {
    /// Invalid host-provided configuration or parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A render surface or cache buffer could not be (re)allocated.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Asset preparation failed (decoding, frame grid mismatch).
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IsoError {
    /// Build an [`IsoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`IsoError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build an [`IsoError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build an [`IsoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
