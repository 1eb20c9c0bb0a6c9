use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::routes::console_routes::console_route_table;
use crate::api::routes::route_table::build_router;
use crate::api::routes::service_routes::service_route_table;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router(state: AppState) -> Router {
    let mut table = service_route_table();
    table.extend(console_route_table());

    let api = build_router(table, &state.authorizer);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(api)
        .fallback(handler_404)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Server is running!"
}

async fn health_check() -> &'static str {
    "OK"
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
