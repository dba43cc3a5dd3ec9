/// Convenience result type used across the crate.
pub type RevealResult<T> = Result<T, RevealError>;

/// Top-level error taxonomy used by director, lifecycle and control APIs.
///
/// Numeric edge cases inside the per-point kernel never produce errors; they fall back to the
/// "effect inactive" branch instead.
#[derive(thiserror::Error, Debug)]
pub enum RevealError {
    /// A dataset id that the catalog does not know about.
    #[error("dataset error: dataset '{id}' not found")]
    DatasetNotFound {
        /// Requested dataset id.
        id: String,
    },

    /// The loader reported a failure for a dataset.
    #[error("dataset error: failed to load '{id}' from '{uri}': {cause}")]
    DatasetLoadFailed {
        /// Dataset id.
        id: String,
        /// Uri that was attempted.
        uri: String,
        /// Loader-provided cause.
        cause: String,
    },

    /// The render host refused to create an instance for a ready dataset.
    #[error("entity error: failed to create instance for '{id}': {cause}")]
    EntityCreationFailed {
        /// Dataset id.
        id: String,
        /// Host-provided cause.
        cause: String,
    },

    /// Unknown parameter key, wrong value type or non-finite value.
    #[error("parameter error: {0}")]
    InvalidParameter(String),

    /// Invalid configuration or user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RevealError {
    /// Build a [`RevealError::DatasetNotFound`] value.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::DatasetNotFound { id: id.into() }
    }

    /// Build a [`RevealError::DatasetLoadFailed`] value.
    pub fn load_failed(
        id: impl Into<String>,
        uri: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self::DatasetLoadFailed {
            id: id.into(),
            uri: uri.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`RevealError::EntityCreationFailed`] value.
    pub fn entity(id: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::EntityCreationFailed {
            id: id.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`RevealError::InvalidParameter`] value.
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`RevealError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RevealError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Dataset id carried by dataset and entity errors.
    pub fn dataset_id(&self) -> Option<&str> {
        match self {
            Self::DatasetNotFound { id }
            | Self::DatasetLoadFailed { id, .. }
            | Self::EntityCreationFailed { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
