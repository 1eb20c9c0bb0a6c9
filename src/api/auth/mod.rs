//! Authorization glue consulted before any controller runs.

pub mod authorizer;
pub mod permission_middleware;

pub use authorizer::{AllowAll, Authorizer, Permission, Verb};
