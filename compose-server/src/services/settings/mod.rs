use axum::routing::get;
use axum::Router;

use crate::services::ComposeState;

pub mod accounts;
pub mod settings_service;

pub use accounts::{Account, AccountSettings};

pub fn api_routes() -> Router<ComposeState> {
    Router::new().route(
        "/api/settings",
        get(settings_service::get).post(settings_service::update),
    )
}
