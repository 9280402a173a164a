use compose_blob::BlobError;
use compose_core::ComposeError;
use thiserror::Error;

pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Post not found: {key}")]
    NotFound { key: String },

    #[error("Invalid post: {message}")]
    Invalid { message: String },

    #[error("Post store I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Post store decode error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Attachment error: {source}")]
    Blob {
        #[from]
        source: BlobError,
    },
}

impl ContentError {
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ContentError> for ComposeError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. } => ComposeError::not_found(err.to_string()),
            ContentError::Invalid { .. } => ComposeError::bad_request(err.to_string()),
            ContentError::Blob { source } => source.into(),
            ContentError::Io { .. } | ContentError::Serialization { .. } => {
                let message = err.to_string();
                ComposeError::general_error(message).with_source(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compose_core::ErrorKind;

    #[test]
    fn maps_onto_http_taxonomy() {
        let e: ComposeError = ContentError::not_found("hello-world").into();
        assert_eq!(e.kind, ErrorKind::NotFound);

        let e: ComposeError = ContentError::from(std::io::Error::other("disk")).into();
        assert_eq!(e.kind, ErrorKind::GeneralError);
        assert!(e.source.is_some());

        let e: ComposeError = ContentError::from(BlobError::not_found("abc")).into();
        assert_eq!(e.kind, ErrorKind::NotFound);
    }
}
