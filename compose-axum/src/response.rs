use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use compose_blob::OpenedBlob;
use compose_core::{evaluate, format_http_date, RequestContext};

/// Deliver `body` unless the client's copy is current.
///
/// Fresh requests get `304 Not Modified` with no body. Everything else gets
/// the full response stamped with `Last-Modified`.
pub fn conditional<T: IntoResponse>(
    ctx: &RequestContext,
    last_modified: DateTime<Utc>,
    body: T,
) -> Response {
    let stamp = HeaderValue::from_str(&format_http_date(last_modified)).ok();

    if evaluate(last_modified, ctx.if_modified_since.as_deref()).is_fresh() {
        tracing::debug!(request_id = ?ctx.request_id, "not modified");
        let mut res = StatusCode::NOT_MODIFIED.into_response();
        if let Some(v) = stamp {
            res.headers_mut().insert(header::LAST_MODIFIED, v);
        }
        return res;
    }

    let mut res = body.into_response();
    if let Some(v) = stamp {
        res.headers_mut().insert(header::LAST_MODIFIED, v);
    }
    res
}

/// Stream an opened blob as the response body.
pub fn blob_response(opened: OpenedBlob) -> Response {
    let content_type = opened
        .meta
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let mut res = Response::new(Body::from_stream(opened.stream));
    let headers = res.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(opened.meta.size));
    res
}
