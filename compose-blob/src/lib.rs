//! # compose-blob: attachment storage for Compose
//!
//! Streaming blob stores and the [`AttachmentManager`] that posts use to
//! reference their files. Content never needs to be buffered by callers:
//! uploads arrive as a [`ByteStream`] and downloads leave as one.
//!
//! ```text
//! ┌────────────────────┐
//! │ PostRepository/API │  ← posts reference blobs by BlobId
//! ├────────────────────┤
//! │ AttachmentManager  │  ← resolve, match, size limits, content types
//! ├────────────────────┤
//! │ BlobStore          │  ← storage primitives (memory, filesystem)
//! └────────────────────┘
//! ```
//!
//! ```rust
//! use compose_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let attachments = AttachmentManager::new(MemoryBlobStore::new(), BlobConfig::default());
//! let meta = attachments
//!     .store(BlobPut::new("hello.txt"), compose_blob::bytes_stream("Hello, world!"))
//!     .await?;
//! let opened = attachments.open(&meta.id).await?;
//! assert_eq!(opened.meta.size, 13);
//! # Ok(())
//! # }
//! ```

mod attachments;
mod config;
mod error;
mod fs;
mod memory;
pub mod mime;
pub mod store;
mod types;

pub use attachments::{AttachmentManager, ResolvedSet};
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use store::BlobStore;
pub use types::{bytes_stream, BlobId, BlobMeta, BlobPut, ByteStream, OpenedBlob};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AttachmentManager, BlobConfig, BlobError, BlobId, BlobMeta, BlobPut, BlobResult,
        BlobStore, ByteStream, MemoryBlobStore, OpenedBlob,
    };
}
