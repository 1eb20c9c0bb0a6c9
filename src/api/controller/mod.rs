pub mod event;
pub mod registry;
pub mod service;
