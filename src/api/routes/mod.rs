//! API route declarations (e.g., /api/v1/*)

pub mod console_routes;
pub mod route_table;
pub mod service_routes;
