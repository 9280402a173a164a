use std::collections::HashMap;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::RwLock;

use crate::types::bytes_stream;
use crate::{BlobError, BlobId, BlobMeta, BlobPut, BlobResult, BlobStore, ByteStream, OpenedBlob};

/// In-process blob store. Content lives in memory for the life of the
/// process; used by tests and by servers started without a storage dir.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, (BlobMeta, Bytes)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, put: &BlobPut, mut stream: ByteStream) -> BlobResult<BlobMeta> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }

        let meta = BlobMeta {
            id: BlobId::new(),
            name: put.filename.clone(),
            size: buf.len() as u64,
            upload_date: Utc::now(),
            content_type: put.content_type.clone(),
        };

        self.blobs
            .write()
            .await
            .insert(meta.id.clone(), (meta.clone(), buf.freeze()));
        Ok(meta)
    }

    async fn get(&self, id: &BlobId) -> BlobResult<OpenedBlob> {
        let blobs = self.blobs.read().await;
        let (meta, data) = blobs
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::not_found(id.as_str()))?;
        Ok(OpenedBlob {
            meta,
            stream: bytes_stream(data),
        })
    }

    async fn head(&self, id: &BlobId) -> BlobResult<BlobMeta> {
        self.blobs
            .read()
            .await
            .get(id)
            .map(|(meta, _)| meta.clone())
            .ok_or_else(|| BlobError::not_found(id.as_str()))
    }

    async fn delete(&self, id: &BlobId) -> BlobResult<()> {
        self.blobs
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BlobError::not_found(id.as_str()))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_stream() -> ByteStream {
        Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ]))
    }

    #[tokio::test]
    async fn failed_stream_stores_nothing() {
        let store = MemoryBlobStore::new();
        let res = store.put(&BlobPut::new("a.txt"), failing_stream()).await;
        assert!(matches!(res, Err(BlobError::Io { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = MemoryBlobStore::new();
        let meta = store
            .put(&BlobPut::new("a.txt"), bytes_stream("hi"))
            .await
            .unwrap();
        store.delete(&meta.id).await.unwrap();
        assert!(store.delete(&meta.id).await.unwrap_err().is_not_found());
    }
}
