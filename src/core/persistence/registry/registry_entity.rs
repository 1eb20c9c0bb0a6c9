use serde::{Deserialize, Serialize};

use crate::domain::service::model::RegistryCredential;

/// Stored credentials for a private image registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntity {
    pub name: String,
    /// Host (and optional path prefix) images are pulled from, e.g. `reg.example.com`
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl RegistryEntity {
    /// Pull credential addressed at this registry's host.
    pub fn credential(&self) -> RegistryCredential {
        RegistryCredential {
            username: self.username.clone(),
            password: self.password.clone(),
            server_address: self.url.clone(),
        }
    }

    /// `<url>/<image>`; a trailing slash on the url is not doubled.
    pub fn qualify_image(&self, image: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), image)
    }
}
