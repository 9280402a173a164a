use async_trait::async_trait;

use crate::{BlobId, BlobMeta, BlobPut, BlobResult, ByteStream, OpenedBlob};

/// Core blob storage operations - must be implemented by all storage backends.
///
/// Every method is a single atomic operation against one blob. A `put` that
/// fails part way leaves nothing behind; a blob becomes visible to `head`
/// only once its content is fully written.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream. The store assigns the id.
    async fn put(&self, put: &BlobPut, stream: ByteStream) -> BlobResult<BlobMeta>;

    /// Open a blob's content as a stream.
    async fn get(&self, id: &BlobId) -> BlobResult<OpenedBlob>;

    /// Get blob metadata without content
    async fn head(&self, id: &BlobId) -> BlobResult<BlobMeta>;

    /// Delete a blob. Deleting a missing blob is `NotFound`.
    async fn delete(&self, id: &BlobId) -> BlobResult<()>;

    /// Short backend name for logs.
    fn kind(&self) -> &'static str;
}
