//! Error types for storage provider operations.

use data_model::{ParseRecordIdError, RecordId, StorageTarget};

/// Result type for storage provider operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by providers and the facade built on top of them.
///
/// Each kind is kept distinct so transports can map them to their own
/// status codes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The target label does not name any known backend.
    #[error("storage target `{target}` is not supported")]
    UnsupportedTarget { target: String },

    /// No record is stored under the identifier.
    #[error("record {id} not found")]
    NotFound { id: RecordId },

    /// The backend is misconfigured or could not be reached.
    #[error("{backend} backend unavailable: {source}")]
    BackendUnavailable {
        backend: StorageTarget,
        source: anyhow::Error,
    },

    /// Caller supplied a malformed identifier or argument.
    #[error("validation failed: {reason}")]
    Validation { reason: String },
}

impl StorageError {
    pub fn unavailable(backend: StorageTarget, source: impl Into<anyhow::Error>) -> Self {
        Self::BackendUnavailable {
            backend,
            source: source.into(),
        }
    }

    pub fn unconfigured(backend: StorageTarget, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            source: anyhow::anyhow!(reason.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Errors caused by the request itself rather than by a backend.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::UnsupportedTarget { .. } | Self::Validation { .. })
    }

    /// Short label for the error kind, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedTarget { .. } => "unsupported_target",
            Self::NotFound { .. } => "not_found",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::Validation { .. } => "validation",
        }
    }
}

impl From<ParseRecordIdError> for StorageError {
    fn from(err: ParseRecordIdError) -> Self {
        Self::Validation {
            reason: err.to_string(),
        }
    }
}
