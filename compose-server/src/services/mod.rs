use std::sync::Arc;

use axum::Router;
use compose_axum::{require_access, SharedGate};
use compose_blob::AttachmentManager;
use compose_content::PostRepository;

pub mod files;
pub mod posts;
pub mod settings;

use settings::AccountSettings;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct ComposeState {
    pub posts: PostRepository,
    pub attachments: AttachmentManager,
    pub accounts: Arc<AccountSettings>,
    pub posts_per_page: usize,
}

/// Public site routes and admin routes. Every admin route sits behind the
/// access gate.
pub fn configure(state: ComposeState, gate: SharedGate) -> Router<()> {
    let admin = Router::new()
        .merge(posts::api_routes())
        .merge(files::api_routes())
        .merge(settings::api_routes())
        .route_layer(axum::middleware::from_fn_with_state(gate, require_access));

    Router::new()
        .merge(admin)
        .merge(posts::site_routes())
        .merge(files::site_routes())
        .with_state(state)
}
