//! Access boundary.
//!
//! Every mutating entry point consults an [`AccessGate`] before it touches
//! storage. Credential checks and session issuance live outside Compose;
//! implementations of this trait are the only bridge to them.

use std::collections::HashSet;

use crate::context::RequestContext;

/// "Is this caller allowed to mutate?"
pub trait AccessGate: Send + Sync {
    fn is_authorized(&self, ctx: &RequestContext) -> bool;
}

impl<F> AccessGate for F
where
    F: Fn(&RequestContext) -> bool + Send + Sync,
{
    fn is_authorized(&self, ctx: &RequestContext) -> bool {
        self(ctx)
    }
}

/// Accepts a fixed set of session tokens.
///
/// An empty set authorizes nobody.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenGate {
    tokens: HashSet<String>,
}

impl StaticTokenGate {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AccessGate for StaticTokenGate {
    fn is_authorized(&self, ctx: &RequestContext) -> bool {
        ctx.session_token
            .as_deref()
            .map(|t| self.tokens.contains(t))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_gate_requires_known_token() {
        let gate = StaticTokenGate::new(["s3cret"]);
        assert!(gate.is_authorized(&RequestContext::new().with_session_token("s3cret")));
        assert!(!gate.is_authorized(&RequestContext::new().with_session_token("guess")));
        assert!(!gate.is_authorized(&RequestContext::new()));
    }

    #[test]
    fn empty_gate_denies_everyone() {
        let gate = StaticTokenGate::default();
        assert!(gate.is_empty());
        assert!(!gate.is_authorized(&RequestContext::new().with_session_token("")));
    }

    #[test]
    fn closures_are_gates() {
        let deny = |_: &RequestContext| false;
        assert!(!deny.is_authorized(&RequestContext::new()));
    }
}
