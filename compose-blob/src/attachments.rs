use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use futures::StreamExt;

use crate::mime::content_type_for;
use crate::{
    BlobConfig, BlobError, BlobId, BlobMeta, BlobPut, BlobResult, BlobStore, ByteStream,
    OpenedBlob,
};

/// Attachment operations over a [`BlobStore`]. This is what the post
/// repository and the HTTP layer embed.
#[derive(Clone)]
pub struct AttachmentManager {
    store: Arc<dyn BlobStore>,
    config: BlobConfig,
}

impl AttachmentManager {
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    pub fn from_arc(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self { store, config }
    }

    /// Look up one attachment's metadata.
    pub async fn resolve(&self, id: &BlobId) -> BlobResult<BlobMeta> {
        self.store.head(id).await
    }

    /// Look up many attachments at once. Every input id appears in the
    /// result, in input order; ids that cannot be resolved map to `None`.
    pub async fn resolve_many(&self, ids: &[BlobId]) -> ResolvedSet {
        let lookups = ids.iter().map(|id| async move {
            match self.store.head(id).await {
                Ok(meta) => (id.clone(), Some(meta)),
                Err(e) if e.is_not_found() => (id.clone(), None),
                Err(e) => {
                    tracing::warn!(blob_id = %id, error = %e, "attachment lookup failed");
                    (id.clone(), None)
                }
            }
        });
        ResolvedSet {
            entries: join_all(lookups).await,
        }
    }

    /// Open an attachment for streaming. The returned meta carries a
    /// content type, guessed from the filename when none was recorded.
    pub async fn open(&self, id: &BlobId) -> BlobResult<OpenedBlob> {
        let mut opened = self.store.get(id).await?;
        opened.meta.content_type = Some(content_type_for(
            opened.meta.content_type.as_deref(),
            &opened.meta.name,
            &self.config.fallback_content_type,
        ));
        Ok(opened)
    }

    /// Find the first attachment among `ids` whose filename is exactly `name`.
    ///
    /// A match wins over lookup faults on other ids. With no match, the
    /// first non-NotFound fault is returned instead of `NotFound`.
    pub async fn match_by_name(&self, ids: &[BlobId], name: &str) -> BlobResult<BlobMeta> {
        let lookups = join_all(ids.iter().map(|id| self.store.head(id))).await;

        let mut fault = None;
        for lookup in lookups {
            match lookup {
                Ok(meta) if meta.name == name => return Ok(meta),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    if fault.is_none() {
                        fault = Some(e);
                    }
                }
            }
        }
        Err(fault.unwrap_or_else(|| BlobError::not_found(name)))
    }

    /// Remove an attachment's content and metadata.
    pub async fn delete(&self, id: &BlobId) -> BlobResult<()> {
        self.store.delete(id).await?;
        tracing::debug!(blob_id = %id, backend = self.store.kind(), "attachment deleted");
        Ok(())
    }

    /// Store new content. Uploads over `max_blob_bytes` fail with
    /// `TooLarge` and leave nothing behind.
    pub async fn store(&self, put: BlobPut, body: ByteStream) -> BlobResult<BlobMeta> {
        if put.filename.trim().is_empty() {
            return Err(BlobError::invalid("Filename is required"));
        }

        let limit = self.config.max_blob_bytes;
        if let Some(size) = put.size_hint {
            if size > limit {
                return Err(BlobError::TooLarge { limit });
            }
        }

        let put = match put.content_type {
            Some(_) => put,
            None => {
                let guessed = crate::mime::guess_content_type(&put.filename);
                BlobPut {
                    content_type: guessed,
                    ..put
                }
            }
        };

        let exceeded = Arc::new(AtomicBool::new(false));
        let limited = limit_stream(body, limit, exceeded.clone());

        match self.store.put(&put, limited).await {
            Ok(meta) => {
                tracing::info!(
                    blob_id = %meta.id,
                    filename = %meta.name,
                    size = meta.size,
                    backend = self.store.kind(),
                    "attachment stored"
                );
                Ok(meta)
            }
            Err(_) if exceeded.load(Ordering::SeqCst) => Err(BlobError::TooLarge { limit }),
            Err(e) => Err(e),
        }
    }
}

fn limit_stream(body: ByteStream, limit: u64, exceeded: Arc<AtomicBool>) -> ByteStream {
    let seen = Arc::new(AtomicU64::new(0));
    Box::pin(body.map(move |chunk| {
        let chunk = chunk?;
        let total = seen.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        if total > limit {
            exceeded.store(true, Ordering::SeqCst);
            return Err(std::io::Error::other("blob size limit exceeded"));
        }
        Ok(chunk)
    }))
}

/// Outcome of [`AttachmentManager::resolve_many`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    entries: Vec<(BlobId, Option<BlobMeta>)>,
}

impl ResolvedSet {
    pub fn entries(&self) -> &[(BlobId, Option<BlobMeta>)] {
        &self.entries
    }

    pub fn get(&self, id: &BlobId) -> Option<&BlobMeta> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn missing(&self) -> Vec<BlobId> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn into_map(self) -> HashMap<BlobId, Option<BlobMeta>> {
        self.entries.into_iter().collect()
    }
}
