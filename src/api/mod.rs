//! HTTP surface: routes, controllers, request/response DTOs

pub mod auth;
pub mod controller;
pub mod dto;
pub mod routes;
pub mod util;
