use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use uuid::Uuid;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Unique identifier for a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(pub String);

impl BlobId {
    /// Generate a new random blob ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id can name a file on disk: ASCII alphanumerics and
    /// `-` only, at least three characters.
    pub fn is_path_safe(&self) -> bool {
        self.0.len() >= 3 && self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Metadata recorded for a stored blob. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    #[serde(rename = "_id")]
    pub id: BlobId,
    #[serde(rename = "filename")]
    pub name: String,
    pub size: u64,
    #[serde(rename = "uploadDate")]
    pub upload_date: DateTime<Utc>,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Request to store a blob
#[derive(Debug, Clone, Default)]
pub struct BlobPut {
    pub filename: String,
    pub content_type: Option<String>,
    pub size_hint: Option<u64>,
}

impl BlobPut {
    pub fn new<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }
}

/// Blob metadata plus an open content stream.
///
/// The stream is owned: dropping the `OpenedBlob` on any path releases the
/// underlying handle.
pub struct OpenedBlob {
    pub meta: BlobMeta,
    pub stream: ByteStream,
}

impl std::fmt::Debug for OpenedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedBlob")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Build a [`ByteStream`] over an in-memory buffer.
pub fn bytes_stream(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_path_safe() {
        assert!(BlobId::new().is_path_safe());
        assert!(!BlobId::from("../etc/passwd").is_path_safe());
        assert!(!BlobId::from("ab").is_path_safe());
    }

    #[test]
    fn meta_uses_wire_names() {
        let meta = BlobMeta {
            id: BlobId::from("abc-123"),
            name: "diagram.png".to_string(),
            size: 4,
            upload_date: Utc::now(),
            content_type: None,
        };
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["_id"], "abc-123");
        assert_eq!(v["filename"], "diagram.png");
        assert_eq!(v["size"], 4);
        assert!(v.get("uploadDate").is_some());
        assert!(v.get("contentType").is_none());
    }
}
