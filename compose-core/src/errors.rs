//! # Errors
//!
//! Compose carries one structured error type through every layer.
//! - consistent status codes + class names
//! - can be carried through anyhow::Error
//! - transport-agnostic (the axum adapter decides how to serialize)
//!
//! Storage and blob crates keep their own `thiserror` enums and convert into
//! [`ComposeError`] at the boundary, so the HTTP layer only ever has to look
//! for one type in an error chain.
//!
//! If you enable feature `serde`, you also get:
//! - `errors` as serde_json::Value
//! - `to_json()` helper

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Compose APIs that flow through anyhow.
pub type ComposeResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    NotFound,         // 404
    PayloadTooLarge,  // 413
    Unprocessable,    // 422
    GeneralError,     // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::NotFound => "not-found",
            ErrorKind::PayloadTooLarge => "payload-too-large",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
        }
    }

    /// Kinds whose message may describe server internals.
    pub fn is_server_fault(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(feature = "serde")]
pub type ErrorValue = serde_json::Value;

#[cfg(not(feature = "serde"))]
pub type ErrorValue = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// A structured Compose error that can live inside `anyhow::Error`.
///
/// Fields:
/// - name
/// - message
/// - code (HTTP status)
/// - class_name
/// - errors (optional)
#[derive(Debug)]
pub struct ComposeError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<ErrorValue>,
    pub source: Option<AnyError>,
}

impl ComposeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: ErrorValue) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through handler code.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `ComposeError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&ComposeError> {
        err.chain().find_map(|e| e.downcast_ref::<ComposeError>())
    }

    /// Turn any error into a ComposeError:
    /// - if it's already a ComposeError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> ComposeError {
        match err.downcast::<ComposeError>() {
            Ok(e) => e,
            Err(other) => {
                ComposeError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A "safe" version suitable for returning to clients:
    /// - keep kind/code/class_name/errors
    /// - drop the inner `source`
    /// - server faults get a generic message; the detail stays in the logs
    pub fn sanitize_for_client(&self) -> ComposeError {
        let message = if self.kind.is_server_fault() {
            "Internal storage error".to_string()
        } else {
            self.message.clone()
        };
        ComposeError {
            kind: self.kind,
            message,
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl ComposeError {
    /// JSON payload.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }
}

/// Convenience helper for "bail with ComposeError".
#[macro_export]
macro_rules! bail_compose {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::ComposeError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::ComposeError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(found: bool) -> ComposeResult<u32> {
        if !found {
            bail_compose!(not_found, "Post not found: {}", "abc");
        }
        Ok(1)
    }

    #[test]
    fn normalize_keeps_compose_errors() {
        let err = lookup(false).unwrap_err();
        let e = ComposeError::normalize(err);
        assert_eq!(e.kind, ErrorKind::NotFound);
        assert_eq!(e.message, "Post not found: abc");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_general() {
        let e = ComposeError::normalize(anyhow::anyhow!("disk on fire"));
        assert_eq!(e.kind, ErrorKind::GeneralError);
        assert_eq!(e.code(), 500);
    }

    #[test]
    fn from_anyhow_finds_error_under_context() {
        let err = ComposeError::unprocessable("bad shape")
            .into_anyhow()
            .context("decoding post");
        let found = ComposeError::from_anyhow(&err).unwrap();
        assert_eq!(found.kind, ErrorKind::Unprocessable);
    }

    #[test]
    fn sanitize_hides_server_fault_detail() {
        let e = ComposeError::general_error("connection refused to 10.0.0.3")
            .with_source(anyhow::anyhow!("io"));
        let safe = e.sanitize_for_client();
        assert!(safe.source.is_none());
        assert_eq!(safe.message, "Internal storage error");

        let e = ComposeError::not_found("Post not found: x");
        assert_eq!(e.sanitize_for_client().message, "Post not found: x");
    }
}
