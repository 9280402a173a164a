/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single blob (safety guard)
    pub max_blob_bytes: u64,

    /// Content type used when neither the client nor the extension names one
    pub fallback_content_type: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 100 * 1024 * 1024, // 100MB
            fallback_content_type: "application/octet-stream".to_string(),
        }
    }
}

impl BlobConfig {
    /// Set max blob size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }
}
