pub mod audit_runtime_state;
pub mod audit_sink;
