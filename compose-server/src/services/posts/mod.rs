use axum::routing::get;
use axum::Router;

use crate::services::ComposeState;

pub mod post_params;
pub mod posts_service;

pub(crate) use posts_service::map_json_rejection;

pub fn site_routes() -> Router<ComposeState> {
    Router::new()
        .route("/", get(posts_service::index))
        .route("/{slug}", get(posts_service::view))
        .route("/{slug}/", get(posts_service::view_trailing_slash))
}

pub fn api_routes() -> Router<ComposeState> {
    Router::new()
        .route(
            "/api/posts",
            get(posts_service::list).post(posts_service::create),
        )
        .route(
            "/api/post/{id}",
            get(posts_service::get)
                .put(posts_service::update)
                .delete(posts_service::remove),
        )
}
