//! compose-content: posts and their lifecycle.
//!
//! [`PostRepository`] is the one place that reads and writes post records.
//! It owns the cascade from a post to its attachments; nothing else deletes
//! a blob that a post references.

mod error;
mod fs;
mod pagination;
mod post;
mod repository;
mod store;

pub use error::{ContentError, ContentResult};
pub use fs::FsPostStore;
pub use pagination::Pagination;
pub use post::{Post, PostHeader, PostId};
pub use repository::{CascadeReport, PostRepository};
pub use store::{MemoryPostStore, PostStore};
