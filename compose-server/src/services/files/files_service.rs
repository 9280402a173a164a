use std::collections::HashMap;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use compose_axum::{blob_response, file_part, ComposeAxumError};
use compose_blob::{BlobError, BlobId, BlobMeta};
use compose_core::ComposeError;
use serde_json::{json, Value};

use crate::services::posts::map_json_rejection;
use crate::services::ComposeState;

type ApiResult<T> = Result<T, ComposeAxumError>;

/// `GET /{slug}/{file}`: an attachment of the post, by exact filename.
pub async fn view_file(
    State(state): State<ComposeState>,
    Path((slug, file)): Path<(String, String)>,
) -> ApiResult<Response> {
    let post = state.posts.find_by_slug(&slug).await?;
    let meta = state.attachments.match_by_name(&post.files, &file).await?;
    let opened = state.attachments.open(&meta.id).await?;
    Ok(blob_response(opened))
}

fn upload_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

/// `POST /upload`: multipart field `file`.
pub async fn upload(
    State(state): State<ComposeState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let part = match file_part(&headers, body, "file").await {
        Ok(part) => part,
        Err(e) => return e.into_response(),
    };
    let put = part.blob_put();

    match state.attachments.store(put, part.stream).await {
        Ok(meta) => Json(json!({
            "status": "success",
            "message": format!("Uploaded {}", meta.name),
            "_id": meta.id,
        }))
        .into_response(),
        Err(BlobError::TooLarge { limit }) => upload_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File exceeds the {limit} byte limit"),
        ),
        Err(BlobError::Invalid { message }) => upload_error(StatusCode::BAD_REQUEST, message),
        Err(BlobError::Io { source }) if source.kind() == std::io::ErrorKind::InvalidData => {
            upload_error(StatusCode::BAD_REQUEST, format!("Malformed upload: {source}"))
        }
        Err(e) => {
            tracing::error!(error = %e, "upload failed");
            upload_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal storage error".to_string(),
            )
        }
    }
}

/// `POST /api/file`: ids → metadata, `null` for unknown ids.
pub async fn info_many(
    State(state): State<ComposeState>,
    body: Result<Json<Vec<BlobId>>, JsonRejection>,
) -> ApiResult<Json<HashMap<BlobId, Option<BlobMeta>>>> {
    let Json(ids) = body.map_err(map_json_rejection)?;
    Ok(Json(state.attachments.resolve_many(&ids).await.into_map()))
}

/// `GET /api/file/{id}`
pub async fn info(
    State(state): State<ComposeState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BlobMeta>> {
    Ok(Json(state.attachments.resolve(&BlobId::from_string(id)).await?))
}

/// `DELETE /api/file/{id}`
pub async fn remove(
    State(state): State<ComposeState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = BlobId::from_string(id);
    match state.attachments.delete(&id).await {
        Ok(()) => Ok(Json(json!({ "status": "success" }))),
        Err(e) if e.is_not_found() => {
            Err(ComposeError::not_found(format!("File not found: {id}")).into())
        }
        Err(e) => Err(e.into()),
    }
}
