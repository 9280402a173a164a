use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{ContentResult, Post, PostId, PostStore};

/// One JSON document per post under `{root}/{id}.json`. Storage order is
/// id order.
#[derive(Debug, Clone)]
pub struct FsPostStore {
    root: PathBuf,
}

impl FsPostStore {
    pub async fn open(root: impl Into<PathBuf>) -> ContentResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &PostId) -> Option<PathBuf> {
        id.is_path_safe()
            .then(|| self.root.join(format!("{}.json", id.as_str())))
    }

    async fn read(&self, path: &Path) -> ContentResult<Option<Post>> {
        match fs::read(path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PostStore for FsPostStore {
    async fn get(&self, id: &PostId) -> ContentResult<Option<Post>> {
        match self.path_for(id) {
            Some(path) => self.read(&path).await,
            None => Ok(None),
        }
    }

    async fn all(&self) -> ContentResult<Vec<Post>> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut posts = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(post) = self.read(&path).await? {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    async fn put(&self, post: &Post) -> ContentResult<()> {
        let Some(path) = self.path_for(&post.id) else {
            return Err(crate::ContentError::invalid(format!(
                "post id {:?} is not storable",
                post.id.as_str()
            )));
        };
        // One staging file per write.
        let tmp = self.root.join(format!(
            "{}.{}.json.tmp",
            post.id.as_str(),
            uuid::Uuid::new_v4().simple()
        ));
        fs::write(&tmp, serde_json::to_vec_pretty(post)?).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, id: &PostId) -> ContentResult<bool> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn kind(&self) -> &'static str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPostStore::open(dir.path()).await.unwrap();
        let post = Post {
            slug: "hello-world".into(),
            body: "# Hello".into(),
            ..Post::default()
        };
        store.put(&post).await.unwrap();

        let reopened = FsPostStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get(&post.id).await.unwrap(), Some(post.clone()));
        assert_eq!(
            reopened.find_by_slug("hello-world").await.unwrap().map(|p| p.id),
            Some(post.id)
        );
    }

    #[tokio::test]
    async fn listing_is_sorted_by_id_and_skips_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPostStore::open(dir.path()).await.unwrap();
        for id in ["bbb", "aaa", "ccc"] {
            store
                .put(&Post {
                    id: PostId::from(id),
                    ..Post::default()
                })
                .await
                .unwrap();
        }
        fs::write(dir.path().join("zzz.json.tmp"), b"{").await.unwrap();

        let ids: Vec<_> = store.all().await.unwrap().into_iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec!["aaa", "bbb", "ccc"]);
    }

    #[tokio::test]
    async fn concurrent_saves_of_one_post_all_commit_whole_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPostStore::open(dir.path()).await.unwrap();
        let id = PostId::from("contended");

        for _ in 0..20 {
            let mut handles = Vec::new();
            for i in 0..8 {
                let store = store.clone();
                let post = Post {
                    id: id.clone(),
                    body: if i % 2 == 0 { "x".repeat(20_000) } else { "short".into() },
                    ..Post::default()
                };
                handles.push(tokio::spawn(async move { store.put(&post).await }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let stored = store.get(&id).await.unwrap().unwrap();
            assert!(stored.body == "short" || stored.body.len() == 20_000);
        }

        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["contended.json".to_string()]);
    }

    #[tokio::test]
    async fn corrupt_record_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPostStore::open(dir.path()).await.unwrap();
        fs::write(dir.path().join("broken.json"), b"not json").await.unwrap();
        assert!(matches!(
            store.get(&PostId::from("broken")).await,
            Err(crate::ContentError::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn traversal_ids_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPostStore::open(dir.path()).await.unwrap();
        assert_eq!(store.get(&PostId::from("../secret")).await.unwrap(), None);
        assert!(!store.remove(&PostId::from("../secret")).await.unwrap());
    }
}
