//! Business rules: service lifecycle control and metrics shaping

pub mod common;
pub mod metric;
pub mod service;
