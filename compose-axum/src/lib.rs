//! compose-axum: Axum adapter for Compose.
//!
//! Turns `ComposeError`s into Feathers-style JSON responses, extracts the
//! request context, guards admin routes with an `AccessGate`, and answers
//! conditional requests.

pub mod app;
pub mod context;
pub mod middlewares;
pub mod multipart;
pub mod response;
mod error;

pub use app::AxumApp;
pub use context::{context_from_headers, Ctx};
pub use error::ComposeAxumError;
pub use middlewares::{require_access, SharedGate};
pub use multipart::{file_part, FilePart};
pub use response::{blob_response, conditional};

pub use axum;
