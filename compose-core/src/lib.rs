//! compose-core: framework-agnostic core for Compose.
//!
//! Holds what every other crate agrees on: the error taxonomy, the
//! key/value configuration store, the request context, the access gate the
//! admin surface must consult, and the conditional-delivery predicate.

pub mod access;
pub mod conditional;
pub mod config;
pub mod context;
pub mod errors;

pub use access::{AccessGate, StaticTokenGate};
pub use conditional::{evaluate, format_http_date, parse_http_date, Freshness};
pub use config::{ComposeConfig, ComposeConfigSnapshot};
pub use context::RequestContext;
pub use errors::{ComposeError, ComposeResult, ErrorKind};
