pub mod access;

pub use access::{require_access, SharedGate};
