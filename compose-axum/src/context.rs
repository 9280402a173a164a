use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use compose_core::RequestContext;

pub const SESSION_COOKIE: &str = "session_token";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build a [`RequestContext`] from request headers.
///
/// The session token comes from the `session_token` cookie, falling back to
/// `Authorization: Bearer <token>`.
pub fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let session_token = cookie(headers, SESSION_COOKIE).or_else(|| bearer(headers));

    RequestContext {
        session_token,
        request_id: header_str(headers, REQUEST_ID_HEADER),
        if_modified_since: header_str(headers, header::IF_MODIFIED_SINCE.as_str()),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extractor for the request's [`RequestContext`].
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Ctx(context_from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_cookie_before_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc123"),
        );
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Tue, 02 Jun 2015 15:04:05 GMT"),
        );

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.session_token.as_deref(), Some("abc123"));
        assert_eq!(
            ctx.if_modified_since.as_deref(),
            Some("Tue, 02 Jun 2015 15:04:05 GMT")
        );
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(context_from_headers(&headers).session_token.as_deref(), Some("tok"));

        assert!(context_from_headers(&HeaderMap::new()).session_token.is_none());
    }
}
