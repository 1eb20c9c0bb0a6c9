use std::sync::Arc;

use axum::handler::Handler;
use http::Method;
use axum::middleware;
use axum::routing::{self, MethodRouter};
use axum::Router;
use tracing::debug;

use crate::api::auth::permission_middleware::{require_permission, PermissionGuard};
use crate::api::auth::{Authorizer, Permission};
use crate::app_state::AppState;

/// One row of the startup route table.
pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub permission: Option<Permission>,
    pub handler: MethodRouter<AppState>,
}

impl RouteEntry {
    pub fn get<H, T>(path: &'static str, permission: Option<Permission>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::GET,
            path,
            permission,
            handler: routing::get(handler),
        }
    }

    pub fn post<H, T>(path: &'static str, permission: Option<Permission>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method: Method::POST,
            path,
            permission,
            handler: routing::post(handler),
        }
    }
}

/// Registers every entry, guarding permissioned ones with the authorizer.
pub fn build_router(entries: Vec<RouteEntry>, authorizer: &Arc<dyn Authorizer>) -> Router<AppState> {
    entries.into_iter().fold(Router::new(), |router, entry| {
        debug!(
            "Route {} {} (permission: {:?})",
            entry.method, entry.path, entry.permission
        );

        let handler = match entry.permission {
            Some(permission) => entry.handler.route_layer(middleware::from_fn_with_state(
                PermissionGuard {
                    authorizer: authorizer.clone(),
                    permission,
                },
                require_permission,
            )),
            None => entry.handler,
        };

        router.route(entry.path, handler)
    })
}
