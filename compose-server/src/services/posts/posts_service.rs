use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use compose_axum::{conditional, ComposeAxumError, Ctx};
use compose_content::{Pagination, Post, PostHeader, PostId};
use compose_core::ComposeError;
use serde_json::{json, Value};

use super::post_params::{IndexPage, Segment};
use crate::services::ComposeState;

type ApiResult<T> = Result<T, ComposeAxumError>;

pub(crate) fn map_json_rejection(rejection: JsonRejection) -> ComposeAxumError {
    let err = match rejection {
        JsonRejection::JsonDataError(e) => ComposeError::unprocessable("Request body has the wrong shape")
            .with_errors(json!({"_schema": [e.body_text()]})),
        other => ComposeError::bad_request("Failed to parse the request body as JSON")
            .with_errors(json!({"_schema": [other.body_text()]})),
    };
    err.into()
}

async fn index_page(state: &ComposeState, page: usize) -> ApiResult<IndexPage> {
    let total = state.posts.count(false).await?;
    let pagination = Pagination::new(total, state.posts_per_page);
    if !pagination.is_valid(page) {
        return Err(ComposeError::not_found(format!("Page {page} does not exist")).into());
    }
    let posts = state
        .posts
        .list(pagination.offset(page), pagination.page_size, false)
        .await?;
    Ok(IndexPage {
        posts,
        current_page: page,
        total_pages: pagination.num_pages,
    })
}

/// `GET /`
pub async fn index(State(state): State<ComposeState>) -> ApiResult<Json<IndexPage>> {
    Ok(Json(index_page(&state, 1).await?))
}

/// `GET /{page}` for numeric segments, `GET /{slug}` otherwise.
pub async fn view(
    State(state): State<ComposeState>,
    Ctx(ctx): Ctx,
    Path(segment): Path<String>,
) -> ApiResult<Response> {
    match Segment::parse(&segment) {
        Segment::Page(page) => Ok(Json(index_page(&state, page).await?).into_response()),
        Segment::Slug(slug) => {
            let post = state.posts.find_by_slug(slug).await?;
            Ok(conditional(&ctx, post.last_modified, Json(post)))
        }
    }
}

/// `GET /{slug}/` redirects to the canonical post URL.
pub async fn view_trailing_slash(
    State(state): State<ComposeState>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    let post = state.posts.find_by_slug(&slug).await?;
    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, format!("/{}", post.slug))],
    )
        .into_response())
}

/// `GET /api/posts`
pub async fn list(State(state): State<ComposeState>) -> ApiResult<Json<Vec<PostHeader>>> {
    Ok(Json(state.posts.list_headers(0, 0, true).await?))
}

/// `POST /api/posts`
pub async fn create(State(state): State<ComposeState>) -> ApiResult<Json<Post>> {
    let mut post = state.posts.create();
    post.title = "New Post".to_string();
    let post = state.posts.save(post).await?;
    tracing::info!(post_id = %post.id, "post created");
    Ok(Json(post))
}

/// `GET /api/post/{id}`
pub async fn get(
    State(state): State<ComposeState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.find_by_id(&PostId::from(id)).await?))
}

/// `PUT /api/post/{id}`: full replace. The path names the post; `date`
/// stays what it was.
pub async fn update(
    State(state): State<ComposeState>,
    Path(id): Path<String>,
    body: Result<Json<Post>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let existing = state.posts.find_by_id(&PostId::from(id)).await?;
    let Json(mut post) = body.map_err(map_json_rejection)?;

    post.id = existing.id;
    post.date = existing.date;
    Ok(Json(state.posts.save(post).await?))
}

/// `DELETE /api/post/{id}`
pub async fn remove(
    State(state): State<ComposeState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let post = state.posts.find_by_id(&PostId::from(id)).await?;
    let report = state.posts.delete(&post).await?;
    Ok(Json(json!({
        "status": if report.is_clean() { "success" } else { "partial" },
        "failedFiles": report.failed,
    })))
}
