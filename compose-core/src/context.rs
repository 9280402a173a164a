//! Request-scoped context handed to the core by transports.

/// Context carried with every boundary call.
///
/// The session token is an opaque capability. The core never resolves it to
/// an identity itself; it only hands it to an [`crate::AccessGate`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session_token: Option<String>,
    pub request_id: Option<String>,
    /// Raw `If-Modified-Since` header value, unparsed.
    pub if_modified_since: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_token<S: Into<String>>(mut self, token: S) -> Self {
        self.session_token = Some(token.into());
        self
    }
}
