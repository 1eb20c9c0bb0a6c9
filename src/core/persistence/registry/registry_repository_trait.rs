use anyhow::Result;

use super::registry_entity::RegistryEntity;
use super::registry_fs_adapter_trait::RegistryFsAdapterTrait;

/// API-facing repository abstraction for registry records.
pub trait RegistryApiRepository: Send + Sync {
    fn fs_adapter(&self) -> &dyn RegistryFsAdapterTrait;

    /// `Ok(None)` when no record has that name.
    fn get(&self, name: &str) -> Result<Option<RegistryEntity>> {
        Ok(self
            .fs_adapter()
            .read_all()?
            .into_iter()
            .find(|r| r.name == name))
    }

    fn list(&self) -> Result<Vec<RegistryEntity>> {
        self.fs_adapter().read_all()
    }
}
