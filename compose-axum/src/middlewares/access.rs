use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use compose_core::{AccessGate, ComposeError};

use crate::context::context_from_headers;
use crate::ComposeAxumError;

/// Shared gate handed to [`require_access`].
pub type SharedGate = Arc<dyn AccessGate>;

/// Rejects the request with 401 unless the gate admits it. Runs before the
/// handler, so nothing is looked up for an unauthorized caller.
///
/// ```rust,ignore
/// let admin = Router::new()
///     .route("/api/posts", get(list))
///     .route_layer(axum::middleware::from_fn_with_state(gate, require_access));
/// ```
pub async fn require_access(State(gate): State<SharedGate>, req: Request, next: Next) -> Response {
    let ctx = context_from_headers(req.headers());
    if !gate.is_authorized(&ctx) {
        tracing::debug!(request_id = ?ctx.request_id, path = %req.uri().path(), "access denied");
        return ComposeAxumError::from(ComposeError::not_authenticated("Not authenticated"))
            .into_response();
    }
    next.run(req).await
}
