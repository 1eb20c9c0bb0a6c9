//! Service lifecycle and observability routes

use crate::api::auth::Permission;
use crate::api::controller::service::{ServiceController, SERVICE_KIND};
use crate::api::routes::route_table::RouteEntry;

const READ: Option<Permission> = Some(Permission::read(SERVICE_KIND, "name"));
const WRITE: Option<Permission> = Some(Permission::write(SERVICE_KIND, "name"));

/// Batch delete re-checks each name in the controller.
const WRITE_ANY: Option<Permission> = Some(Permission::write_kind(SERVICE_KIND));

pub fn service_route_table() -> Vec<RouteEntry> {
    vec![
        RouteEntry::get("/api/v1/services", None, ServiceController::list_services),
        RouteEntry::post("/api/v1/services", None, ServiceController::create_service),
        RouteEntry::post("/api/v1/services/delete", WRITE_ANY, ServiceController::delete_services),
        RouteEntry::get("/api/v1/services/{name}", READ, ServiceController::get_service),
        RouteEntry::get("/api/v1/services/{name}/raw", READ, ServiceController::get_service_raw),
        RouteEntry::get("/api/v1/services/{name}/stats", READ, ServiceController::get_service_stats),
        RouteEntry::get("/api/v1/services/{name}/logs", READ, ServiceController::get_service_logs),
        RouteEntry::get("/api/v1/services/{name}/metrics", READ, ServiceController::get_service_metrics),
        // Replaces the modelled fields of the running spec; an absent
        // `replicas` keeps the running count.
        RouteEntry::post("/api/v1/services/{name}/edit", WRITE, ServiceController::update_service),
        RouteEntry::post("/api/v1/services/{name}/scale", WRITE, ServiceController::scale_service),
        RouteEntry::post("/api/v1/services/{name}/rollback", WRITE, ServiceController::rollback_service),
    ]
}
