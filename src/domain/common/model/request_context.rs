use serde::Serialize;

pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Per-request facts the core needs, passed explicitly into each operation.
///
/// Authentication happens upstream; `actor` is whatever identity the
/// authenticating proxy vouched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub actor: String,
}

impl RequestContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self { actor: actor.into() }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_ACTOR)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
