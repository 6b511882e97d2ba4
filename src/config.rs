use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::policy::AccessPolicy;
use crate::transport::Credentials;

/// Static part of the CLI configuration, as written in the YAML file. Holds no secrets.
#[derive(Debug, Deserialize)]
pub struct PublishConfigFile {
    /// Target repository, e.g. `https://repo.example.com/satis/`.
    pub url: String,
    /// Policy document (`.json`, `.yml`, `.yaml`), relative to the config file.
    #[serde(default)]
    pub policy: Option<PathBuf>,
}

/// Everything needed to build a publisher: file settings merged with env secrets.
#[derive(Debug)]
pub struct PublishConfig {
    pub url: String,
    pub policy: AccessPolicy,
    pub credentials: Option<Credentials>,
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            url = %self.url,
            requires_authentication = self.policy.requires_authentication(),
            has_credentials = self.credentials.is_some(),
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
