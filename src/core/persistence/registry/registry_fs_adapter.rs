use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::registry_entity::RegistryEntity;
use super::registry_fs_adapter_trait::RegistryFsAdapterTrait;

/// Reads registry records from a JSON array file (`registries.json`).
///
/// A missing file means no registries are configured.
pub struct RegistryFsAdapter {
    path: PathBuf,
}

impl RegistryFsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RegistryFsAdapterTrait for RegistryFsAdapter {
    fn read_all(&self) -> Result<Vec<RegistryEntity>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read registry file {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse registry file {}", self.path.display()))
    }
}
