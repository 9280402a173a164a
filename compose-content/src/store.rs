use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{ContentResult, Post, PostId};

/// Persistence for post records. Each call is atomic on its own; nothing
/// spans calls.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn get(&self, id: &PostId) -> ContentResult<Option<Post>>;

    /// Every record, in storage order.
    async fn all(&self) -> ContentResult<Vec<Post>>;

    /// Full replace by id, inserting when absent.
    async fn put(&self, post: &Post) -> ContentResult<()>;

    /// Returns false when there was nothing to remove.
    async fn remove(&self, id: &PostId) -> ContentResult<bool>;

    /// First record in storage order whose slug is exactly `slug`.
    async fn find_by_slug(&self, slug: &str) -> ContentResult<Option<Post>> {
        Ok(self.all().await?.into_iter().find(|p| p.slug == slug))
    }

    fn kind(&self) -> &'static str;
}

/// Posts in memory, kept in insertion order.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn get(&self, id: &PostId) -> ContentResult<Option<Post>> {
        Ok(self.posts.read().await.iter().find(|p| &p.id == id).cloned())
    }

    async fn all(&self) -> ContentResult<Vec<Post>> {
        Ok(self.posts.read().await.clone())
    }

    async fn put(&self, post: &Post) -> ContentResult<()> {
        let mut posts = self.posts.write().await;
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post.clone(),
            None => posts.push(post.clone()),
        }
        Ok(())
    }

    async fn remove(&self, id: &PostId) -> ContentResult<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| &p.id != id);
        Ok(posts.len() != before)
    }

    async fn find_by_slug(&self, slug: &str) -> ContentResult<Option<Post>> {
        Ok(self.posts.read().await.iter().find(|p| p.slug == slug).cloned())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
