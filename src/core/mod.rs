//! Collaborator clients, persisted records and in-process runtime state

pub mod client;
pub mod persistence;
pub mod state;
