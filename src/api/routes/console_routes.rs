//! Audit trail and registry read-only routes

use crate::api::controller::event::EventController;
use crate::api::controller::registry::RegistryController;
use crate::api::routes::route_table::RouteEntry;

pub fn console_route_table() -> Vec<RouteEntry> {
    vec![
        RouteEntry::get("/api/v1/events", None, EventController::list_events),
        RouteEntry::get("/api/v1/registries", None, RegistryController::list_registries),
    ]
}
