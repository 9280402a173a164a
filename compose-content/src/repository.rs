use std::sync::Arc;

use chrono::Utc;
use compose_blob::{AttachmentManager, BlobId};
use serde::Serialize;

use crate::{ContentError, ContentResult, Post, PostHeader, PostId, PostStore};

/// Outcome of a cascade delete. `failed` lists attachments whose removal
/// errored; they may remain as orphans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub removed: Vec<BlobId>,
    pub missing: Vec<BlobId>,
    pub failed: Vec<BlobId>,
}

impl CascadeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Authoritative access to posts and, through them, their attachments.
#[derive(Clone)]
pub struct PostRepository {
    store: Arc<dyn PostStore>,
    attachments: AttachmentManager,
}

impl PostRepository {
    pub fn new(store: Arc<dyn PostStore>, attachments: AttachmentManager) -> Self {
        Self { store, attachments }
    }

    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    pub async fn find_by_slug(&self, slug: &str) -> ContentResult<Post> {
        self.store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ContentError::not_found(slug))
    }

    pub async fn find_by_id(&self, id: &PostId) -> ContentResult<Post> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ContentError::not_found(id.as_str()))
    }

    /// Posts by `date`, newest first. `limit == 0` means no limit.
    pub async fn list(
        &self,
        offset: usize,
        limit: usize,
        include_drafts: bool,
    ) -> ContentResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .store
            .all()
            .await?
            .into_iter()
            .filter(|p| include_drafts || !p.draft)
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        let limit = if limit == 0 { usize::MAX } else { limit };
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    pub async fn list_headers(
        &self,
        offset: usize,
        limit: usize,
        include_drafts: bool,
    ) -> ContentResult<Vec<PostHeader>> {
        Ok(self
            .list(offset, limit, include_drafts)
            .await?
            .iter()
            .map(Post::header)
            .collect())
    }

    pub async fn count(&self, include_drafts: bool) -> ContentResult<usize> {
        Ok(self
            .store
            .all()
            .await?
            .iter()
            .filter(|p| include_drafts || !p.draft)
            .count())
    }

    /// A fresh unsaved draft.
    pub fn create(&self) -> Post {
        Post::default()
    }

    /// Persist `post` by full replace. `last_modified` never moves backwards.
    pub async fn save(&self, mut post: Post) -> ContentResult<Post> {
        let now = Utc::now();
        post.last_modified = match self.store.get(&post.id).await? {
            Some(prev) if prev.last_modified > now => prev.last_modified,
            _ => now,
        };
        self.store.put(&post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, draft = post.draft, "post saved");
        Ok(post)
    }

    /// Remove every attachment of `post`, then the record itself. Attachment
    /// failures do not stop the cascade.
    pub async fn delete(&self, post: &Post) -> ContentResult<CascadeReport> {
        let mut report = CascadeReport::default();
        for id in &post.files {
            match self.attachments.delete(id).await {
                Ok(()) => report.removed.push(id.clone()),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(post_id = %post.id, blob_id = %id, "attachment already gone");
                    report.missing.push(id.clone());
                }
                Err(e) => {
                    tracing::warn!(post_id = %post.id, blob_id = %id, error = %e, "attachment delete failed");
                    report.failed.push(id.clone());
                }
            }
        }

        if !self.store.remove(&post.id).await? {
            return Err(ContentError::not_found(post.id.as_str()));
        }
        tracing::info!(
            post_id = %post.id,
            removed = report.removed.len(),
            failed = report.failed.len(),
            "post deleted"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryPostStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use compose_blob::{
        bytes_stream, BlobConfig, BlobError, BlobMeta, BlobPut, BlobResult, BlobStore, ByteStream,
        MemoryBlobStore, OpenedBlob,
    };

    fn repo() -> PostRepository {
        PostRepository::new(
            Arc::new(MemoryPostStore::new()),
            AttachmentManager::new(MemoryBlobStore::new(), BlobConfig::default()),
        )
    }

    #[tokio::test]
    async fn publishing_a_draft_makes_it_listed() {
        let repo = repo();
        let mut post = repo.create();
        assert!(repo.list(0, 10, false).await.unwrap().is_empty());

        post.slug = "hello-world".into();
        post.draft = false;
        let saved = repo.save(post).await.unwrap();

        let listed = repo.list(0, 10, false).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(repo.count(false).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn drafts_only_show_when_asked() {
        let repo = repo();
        let draft = repo.save(repo.create()).await.unwrap();
        assert_eq!(repo.count(false).await.unwrap(), 0);
        assert_eq!(repo.count(true).await.unwrap(), 1);
        let headers = repo.list_headers(0, 0, true).await.unwrap();
        assert_eq!(headers[0].id, draft.id);

        // direct fetch ignores draft status
        assert_eq!(repo.find_by_id(&draft.id).await.unwrap().id, draft.id);
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_pages() {
        let repo = repo();
        let base = Utc::now();
        for (i, slug) in ["old", "mid", "new"].iter().enumerate() {
            let mut post = repo.create();
            post.slug = slug.to_string();
            post.draft = false;
            post.date = base + Duration::seconds(i as i64);
            repo.save(post).await.unwrap();
        }

        let slugs: Vec<_> = repo
            .list(0, 0, false)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);

        let page2 = repo.list(2, 2, false).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].slug, "old");
    }

    #[tokio::test]
    async fn lookups_do_not_mutate() {
        let repo = repo();
        let mut post = repo.create();
        post.slug = "stable".into();
        let saved = repo.save(post).await.unwrap();

        let a = repo.find_by_slug("stable").await.unwrap();
        let b = repo.find_by_id(&saved.id).await.unwrap();
        assert_eq!(a, saved);
        assert_eq!(b, saved);
        assert!(repo.find_by_slug("Stable").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn duplicate_slugs_resolve_to_first_stored() {
        let repo = repo();
        let mut first = repo.create();
        first.slug = "dup".into();
        let first = repo.save(first).await.unwrap();
        let mut second = repo.create();
        second.slug = "dup".into();
        repo.save(second).await.unwrap();

        assert_eq!(repo.find_by_slug("dup").await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn save_never_moves_last_modified_backwards() {
        let repo = repo();
        let mut post = repo.save(repo.create()).await.unwrap();
        let first = post.last_modified;

        post.title = "again".into();
        let post = repo.save(post).await.unwrap();
        assert!(post.last_modified >= first);

        let mut future = post.clone();
        future.last_modified = Utc::now() + Duration::hours(1);
        repo.store.put(&future).await.unwrap();
        let resaved = repo.save(post).await.unwrap();
        assert_eq!(resaved.last_modified, future.last_modified);
    }

    #[tokio::test]
    async fn delete_cascades_and_tolerates_missing_blobs() {
        let repo = repo();
        let a = repo
            .attachments()
            .store(BlobPut::new("a.png"), bytes_stream("a"))
            .await
            .unwrap();
        let b = repo
            .attachments()
            .store(BlobPut::new("b.png"), bytes_stream("b"))
            .await
            .unwrap();

        let mut post = repo.create();
        post.files = vec![a.id.clone(), BlobId::from("gone-already"), b.id.clone()];
        let post = repo.save(post).await.unwrap();

        let report = repo.delete(&post).await.unwrap();
        assert_eq!(report.removed, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(report.missing, vec![BlobId::from("gone-already")]);
        assert!(report.is_clean());

        let resolved = repo.attachments().resolve_many(&post.files).await;
        assert_eq!(resolved.missing().len(), 3);
        assert!(repo.find_by_id(&post.id).await.unwrap_err().is_not_found());
    }

    /// Fails to delete one specific blob.
    struct FlakyStore {
        inner: MemoryBlobStore,
        stuck: std::sync::Mutex<Option<BlobId>>,
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        async fn put(&self, put: &BlobPut, stream: ByteStream) -> BlobResult<BlobMeta> {
            self.inner.put(put, stream).await
        }
        async fn get(&self, id: &BlobId) -> BlobResult<OpenedBlob> {
            self.inner.get(id).await
        }
        async fn head(&self, id: &BlobId) -> BlobResult<BlobMeta> {
            self.inner.head(id).await
        }
        async fn delete(&self, id: &BlobId) -> BlobResult<()> {
            let stuck = self.stuck.lock().unwrap().clone();
            if stuck.as_ref() == Some(id) {
                return Err(BlobError::backend(std::io::Error::other("device busy")));
            }
            self.inner.delete(id).await
        }
        fn kind(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn delete_continues_past_a_failing_blob() {
        let blobs = Arc::new(FlakyStore {
            inner: MemoryBlobStore::new(),
            stuck: std::sync::Mutex::new(None),
        });
        let repo = PostRepository::new(
            Arc::new(MemoryPostStore::new()),
            AttachmentManager::from_arc(blobs.clone(), BlobConfig::default()),
        );

        let a = repo
            .attachments()
            .store(BlobPut::new("a.txt"), bytes_stream("a"))
            .await
            .unwrap();
        let b = repo
            .attachments()
            .store(BlobPut::new("b.txt"), bytes_stream("b"))
            .await
            .unwrap();
        *blobs.stuck.lock().unwrap() = Some(a.id.clone());

        let mut post = repo.create();
        post.files = vec![a.id.clone(), b.id.clone()];
        let post = repo.save(post).await.unwrap();

        let report = repo.delete(&post).await.unwrap();
        assert_eq!(report.failed, vec![a.id.clone()]);
        assert_eq!(report.removed, vec![b.id.clone()]);
        assert!(repo.find_by_id(&post.id).await.unwrap_err().is_not_found());
        assert!(repo.attachments().resolve(&b.id).await.unwrap_err().is_not_found());
    }
}
