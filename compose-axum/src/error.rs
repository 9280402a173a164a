use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compose_blob::BlobError;
use compose_content::ContentError;
use compose_core::ComposeError;

#[derive(Debug)]
pub struct ComposeAxumError(pub anyhow::Error);

impl From<anyhow::Error> for ComposeAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ComposeError> for ComposeAxumError {
    fn from(e: ComposeError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<ContentError> for ComposeAxumError {
    fn from(e: ContentError) -> Self {
        ComposeError::from(e).into()
    }
}

impl From<BlobError> for ComposeAxumError {
    fn from(e: BlobError) -> Self {
        ComposeError::from(e).into()
    }
}

impl IntoResponse for ComposeAxumError {
    fn into_response(self) -> Response {
        // Preserve Feathers-ish fields when a ComposeError is anywhere in the chain
        let err = match ComposeError::from_anyhow(&self.0) {
            Some(e) => e.sanitize_for_client(),
            None => ComposeError::general_error(self.0.to_string()).sanitize_for_client(),
        };

        if err.kind.is_server_fault() {
            tracing::error!(error = ?self.0, "request failed");
        }

        let status =
            StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(err.to_json())).into_response()
    }
}
