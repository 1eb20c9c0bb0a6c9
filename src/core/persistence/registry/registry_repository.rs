use std::path::PathBuf;

use super::registry_fs_adapter::RegistryFsAdapter;
use super::registry_fs_adapter_trait::RegistryFsAdapterTrait;
use super::registry_repository_trait::RegistryApiRepository;

pub struct RegistryRepository {
    adapter: RegistryFsAdapter,
}

impl RegistryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            adapter: RegistryFsAdapter::new(path),
        }
    }
}

impl RegistryApiRepository for RegistryRepository {
    fn fs_adapter(&self) -> &dyn RegistryFsAdapterTrait {
        &self.adapter
    }
}
