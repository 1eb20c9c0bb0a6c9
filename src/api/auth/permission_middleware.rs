use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::api::auth::{Authorizer, Permission, Verb};
use crate::api::util::request_context::actor_from_parts;
use crate::errors::{internal_error, AppError, AppResult};

/// Per-route middleware state.
#[derive(Clone)]
pub struct PermissionGuard {
    pub authorizer: Arc<dyn Authorizer>,
    pub permission: Permission,
}

/// Rejects the request with 403 unless the authorizer grants `permission`.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let ctx = actor_from_parts(&parts);

    let name = match guard.permission.name_param {
        Some(param) => Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove(param)),
        None => None,
    };

    check(
        guard.authorizer.as_ref(),
        &ctx.actor,
        guard.permission.verb,
        guard.permission.kind,
        name.as_deref(),
    )
    .await?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Shared by the middleware and handlers that authorize per item.
pub async fn check(
    authorizer: &dyn Authorizer,
    actor: &str,
    verb: Verb,
    kind: &str,
    name: Option<&str>,
) -> AppResult<()> {
    let allowed = authorizer
        .is_allowed(actor, verb, kind, name)
        .await
        .map_err(internal_error)?;

    if allowed {
        return Ok(());
    }

    let target = match name {
        Some(n) => format!("{kind}/{n}"),
        None => kind.to_string(),
    };
    warn!("Denied {} on {} for {}", verb, target, actor);
    Err(AppError::Forbidden(format!("{actor} may not {verb} {target}")))
}
