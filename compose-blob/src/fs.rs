//! Filesystem blob store with directory sharding.
//!
//! Layout:
//! ```text
//! {root}/
//! ├── objects/
//! │   └── 3f/
//! │       └── 3fa2c1d0-...        # content
//! ├── meta/
//! │   └── 3f/
//! │       └── 3fa2c1d0-....json   # BlobMeta
//! └── staging/
//!     └── 3fa2c1d0-...            # in-flight upload
//! ```
//!
//! Content is written to `staging/` and renamed into `objects/` once the
//! stream completes. The metadata file is written last, so a blob without
//! a metadata file is never visible.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::{BlobError, BlobId, BlobMeta, BlobPut, BlobResult, BlobStore, ByteStream, OpenedBlob};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let store = Self { root: root.into() };
        fs::create_dir_all(store.root.join("objects")).await?;
        fs::create_dir_all(store.root.join("meta")).await?;
        fs::create_dir_all(store.root.join("staging")).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prefix(id: &BlobId) -> &str {
        &id.as_str()[..2]
    }

    fn object_path(&self, id: &BlobId) -> PathBuf {
        self.root
            .join("objects")
            .join(Self::prefix(id))
            .join(id.as_str())
    }

    fn meta_path(&self, id: &BlobId) -> PathBuf {
        self.root
            .join("meta")
            .join(Self::prefix(id))
            .join(format!("{}.json", id.as_str()))
    }

    fn staging_path(&self, id: &BlobId) -> PathBuf {
        self.root.join("staging").join(id.as_str())
    }

    /// Ids that cannot name a file are treated as absent.
    fn checked<'a>(&self, id: &'a BlobId) -> BlobResult<&'a BlobId> {
        if id.is_path_safe() {
            Ok(id)
        } else {
            Err(BlobError::not_found(id.as_str()))
        }
    }

    async fn write_staged(&self, staging: &Path, mut stream: ByteStream) -> BlobResult<u64> {
        let mut file = fs::File::create(staging).await?;
        let mut size = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            size += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(size)
    }

    async fn commit(&self, meta: &BlobMeta, staging: &Path) -> BlobResult<()> {
        let object = self.object_path(&meta.id);
        let meta_path = self.meta_path(&meta.id);
        if let Some(dir) = object.parent() {
            fs::create_dir_all(dir).await?;
        }
        if let Some(dir) = meta_path.parent() {
            fs::create_dir_all(dir).await?;
        }

        fs::rename(staging, &object).await?;

        let tmp = meta_path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(meta)?;
        if let Err(e) = write_then_rename(&tmp, &meta_path, &body).await {
            let _ = fs::remove_file(&object).await;
            return Err(e);
        }
        Ok(())
    }
}

async fn write_then_rename(tmp: &Path, dest: &Path, body: &[u8]) -> BlobResult<()> {
    fs::write(tmp, body).await?;
    if let Err(e) = fs::rename(tmp, dest).await {
        let _ = fs::remove_file(tmp).await;
        return Err(e.into());
    }
    Ok(())
}

fn not_found_or(id: &BlobId, err: std::io::Error) -> BlobError {
    if err.kind() == std::io::ErrorKind::NotFound {
        BlobError::not_found(id.as_str())
    } else {
        err.into()
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, put: &BlobPut, stream: ByteStream) -> BlobResult<BlobMeta> {
        let id = BlobId::new();
        let staging = self.staging_path(&id);

        let size = match self.write_staged(&staging, stream).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                return Err(e);
            }
        };

        let meta = BlobMeta {
            id,
            name: put.filename.clone(),
            size,
            upload_date: Utc::now(),
            content_type: put.content_type.clone(),
        };

        if let Err(e) = self.commit(&meta, &staging).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }

        tracing::debug!(blob_id = %meta.id, size = meta.size, "blob committed to disk");
        Ok(meta)
    }

    async fn get(&self, id: &BlobId) -> BlobResult<OpenedBlob> {
        let meta = self.head(id).await?;
        let file = fs::File::open(self.object_path(id))
            .await
            .map_err(|e| not_found_or(id, e))?;
        Ok(OpenedBlob {
            meta,
            stream: Box::pin(ReaderStream::new(file)),
        })
    }

    async fn head(&self, id: &BlobId) -> BlobResult<BlobMeta> {
        let id = self.checked(id)?;
        let raw = fs::read(self.meta_path(id))
            .await
            .map_err(|e| not_found_or(id, e))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn delete(&self, id: &BlobId) -> BlobResult<()> {
        let id = self.checked(id)?;
        fs::remove_file(self.meta_path(id))
            .await
            .map_err(|e| not_found_or(id, e))?;
        match fs::remove_file(self.object_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
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
    use crate::types::bytes_stream;
    use bytes::{Bytes, BytesMut};

    async fn collect(mut stream: ByteStream) -> Bytes {
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk.unwrap());
        }
        buf.freeze()
    }

    #[tokio::test]
    async fn put_then_get_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        let put = BlobPut::new("diagram.png").with_content_type("image/png");
        let meta = store.put(&put, bytes_stream(&b"\x89PNG"[..])).await.unwrap();
        assert_eq!(meta.size, 4);
        assert!(store.object_path(&meta.id).exists());

        let opened = store.get(&meta.id).await.unwrap();
        assert_eq!(opened.meta, meta);
        assert_eq!(&collect(opened.stream).await[..], b"\x89PNG");

        let reopened = FsBlobStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.head(&meta.id).await.unwrap(), meta);
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"half")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "cut")),
        ]));
        assert!(store.put(&BlobPut::new("x.bin"), stream).await.is_err());

        let mut staged = fs::read_dir(dir.path().join("staging")).await.unwrap();
        assert!(staged.next_entry().await.unwrap().is_none());
        let mut objects = fs::read_dir(dir.path().join("objects")).await.unwrap();
        assert!(objects.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unsafe_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        let err = store.head(&BlobId::from("../../etc/passwd")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.delete(&BlobId::from("x")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        let meta = store.put(&BlobPut::new("a.txt"), bytes_stream("a")).await.unwrap();

        store.delete(&meta.id).await.unwrap();
        assert!(!store.object_path(&meta.id).exists());
        assert!(!store.meta_path(&meta.id).exists());
        assert!(store.get(&meta.id).await.unwrap_err().is_not_found());
    }
}
