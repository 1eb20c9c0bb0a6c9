use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::common::model::RequestContext;

/// Identity header set by the authenticating proxy in front of the API.
pub const ACTOR_HEADER: &str = "x-swarmdeck-user";

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(actor_from_parts(parts))
    }
}

pub fn actor_from_parts(parts: &Parts) -> RequestContext {
    parts
        .headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(RequestContext::new)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn actor_header_or_anonymous() {
        let (parts, _) = Request::builder()
            .header(ACTOR_HEADER, " alice ")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(actor_from_parts(&parts).actor, "alice");

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(actor_from_parts(&parts), RequestContext::anonymous());
    }
}
