pub mod config;
mod services;
pub mod utils;

use std::sync::Arc;

use anyhow::Result;
use compose_axum::{AxumApp, SharedGate};
use compose_blob::{AttachmentManager, BlobConfig, BlobStore, FsBlobStore, MemoryBlobStore};
use compose_content::{FsPostStore, MemoryPostStore, PostRepository, PostStore};
use compose_core::{ComposeConfig, StaticTokenGate};

pub use config::ServerConfig;
pub use services::settings::{Account, AccountSettings};
pub use services::ComposeState;

/// Wire stores, repository and routes from `config`.
pub async fn build(config: &ComposeConfig) -> Result<AxumApp> {
    let cfg = ServerConfig::from_snapshot(&config.snapshot())?;

    let (post_store, blob_store): (Arc<dyn PostStore>, Arc<dyn BlobStore>) = match &cfg.storage_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using filesystem storage");
            let posts: Arc<dyn PostStore> = Arc::new(FsPostStore::open(dir.join("posts")).await?);
            let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::open(dir.join("blobs")).await?);
            (posts, blobs)
        }
        None => {
            tracing::warn!("storage.dir not set; content lives in memory only");
            let posts: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
            let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
            (posts, blobs)
        }
    };

    let attachments = AttachmentManager::from_arc(
        blob_store,
        BlobConfig::default().with_max_blob_bytes(cfg.max_blob_bytes),
    );
    let posts = PostRepository::new(post_store, attachments.clone());

    if cfg.session_tokens.is_empty() {
        tracing::warn!("auth.tokens is empty; the admin API will reject every request");
    }
    let gate: SharedGate = Arc::new(StaticTokenGate::new(cfg.session_tokens.clone()));

    let accounts = AccountSettings::open(
        cfg.storage_dir.as_ref().map(|dir| dir.join("settings.json")),
        cfg.admin_email.clone(),
        cfg.admin_password.as_deref(),
        cfg.bcrypt_cost,
    )
    .await?;

    let state = ComposeState {
        posts,
        attachments,
        accounts: Arc::new(accounts),
        posts_per_page: cfg.posts_per_page,
    };

    Ok(AxumApp::new()
        .service("/health", || async { "ok" })
        .merge(services::configure(state, gate)))
}
