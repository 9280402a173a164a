use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use compose_axum::ComposeAxumError;
use compose_core::ComposeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::posts::map_json_rejection;
use crate::services::ComposeState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `GET /api/settings`
pub async fn get(State(state): State<ComposeState>) -> Json<Value> {
    let account = state.accounts.current().await;
    Json(json!({ "email": account.email }))
}

/// `POST /api/settings`: empty fields are left unchanged.
pub async fn update(
    State(state): State<ComposeState>,
    body: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<Value>, ComposeAxumError> {
    let Json(update) = body.map_err(map_json_rejection)?;

    let email = update.email.filter(|e| !e.trim().is_empty());
    let password = update.password.filter(|p| !p.is_empty());

    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(ComposeError::unprocessable("Invalid settings")
                .with_errors(json!({ "email": ["must be an email address"] }))
                .into());
        }
    }

    let email_changed = email.is_some();
    let password_changed = password.is_some();
    state
        .accounts
        .update(email.map(|e| e.trim().to_string()), password)
        .await?;
    tracing::info!(email_changed, password_changed, "admin settings updated");

    Ok(Json(json!({ "status": "success" })))
}
