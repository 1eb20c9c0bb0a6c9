//! Orchestrated service lifecycle and read views

pub mod dto;
pub mod model;
pub mod service;
pub mod util;
