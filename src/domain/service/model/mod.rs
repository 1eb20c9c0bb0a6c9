pub mod lifecycle;
pub mod service_spec;

pub use lifecycle::{AuditEvent, LifecycleAction};
pub use service_spec::{RegistryCredential, ServiceMode, ServiceSpec};
