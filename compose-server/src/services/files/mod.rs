use axum::routing::{get, post};
use axum::Router;

use crate::services::ComposeState;

pub mod files_service;

pub fn site_routes() -> Router<ComposeState> {
    Router::new().route("/{slug}/{file}", get(files_service::view_file))
}

pub fn api_routes() -> Router<ComposeState> {
    Router::new()
        .route("/upload", post(files_service::upload))
        .route("/api/file", post(files_service::info_many))
        .route(
            "/api/file/{id}",
            get(files_service::info).delete(files_service::remove),
        )
}
