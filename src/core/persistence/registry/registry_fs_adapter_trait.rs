use anyhow::Result;

use super::registry_entity::RegistryEntity;

/// Storage backend for registry records.
pub trait RegistryFsAdapterTrait: Send + Sync {
    fn read_all(&self) -> Result<Vec<RegistryEntity>>;
}
