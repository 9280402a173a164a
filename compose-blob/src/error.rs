use compose_core::ComposeError;
use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {id}")]
    NotFound { id: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Blob exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<BlobError> for ComposeError {
    fn from(err: BlobError) -> Self {
        match &err {
            BlobError::NotFound { .. } => ComposeError::not_found(err.to_string()),
            BlobError::Invalid { .. } => ComposeError::bad_request(err.to_string()),
            BlobError::TooLarge { .. } => ComposeError::payload_too_large(err.to_string()),
            BlobError::Backend { .. } | BlobError::Io { .. } | BlobError::Serialization { .. } => {
                let message = err.to_string();
                ComposeError::general_error(message).with_source(err.into())
            }
        }
    }
}
