pub mod registry_entity;
pub mod registry_fs_adapter;
pub mod registry_fs_adapter_trait;
pub mod registry_repository;
pub mod registry_repository_trait;
