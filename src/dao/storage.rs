use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached, read or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered but its content could not be decoded.
    #[error("storage content is corrupt: {message}")]
    Corrupt {
        /// What was being decoded.
        message: String,
        /// Underlying decoding failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Construct a corrupt-content error from any decoding failure.
    pub fn corrupt(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Corrupt {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
