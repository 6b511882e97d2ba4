//! Serialized form of an [`AccessPolicy`], shared with the server side.
//!
//! ```yaml
//! acceptBundle: true
//! needAuthentication: false
//! allowedFiles: [json, zip]
//! allowedDirectories: [dist, include]
//! ```
//!
//! Missing fields take the values of [`PolicyDocument::default`], which are not
//! the same as [`AccessPolicy::default`]: a document without `needAuthentication`
//! describes a public server.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AccessPolicy;
use crate::error::PolicyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyDocument {
    pub accept_bundle: bool,
    pub need_authentication: bool,
    pub allowed_files: Vec<String>,
    pub allowed_directories: Vec<String>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        PolicyDocument {
            accept_bundle: true,
            need_authentication: false,
            allowed_files: vec!["json".to_string(), "zip".to_string()],
            allowed_directories: vec!["dist".to_string(), "include".to_string()],
        }
    }
}

impl From<&AccessPolicy> for PolicyDocument {
    fn from(policy: &AccessPolicy) -> Self {
        PolicyDocument {
            accept_bundle: policy.accepts_bundle_upload(),
            need_authentication: policy.requires_authentication(),
            allowed_files: policy.allowed_extensions().to_vec(),
            allowed_directories: policy.allowed_directories().to_vec(),
        }
    }
}

impl From<PolicyDocument> for AccessPolicy {
    fn from(doc: PolicyDocument) -> Self {
        let mut policy = AccessPolicy::default();
        policy
            .set_allowed_files(doc.allowed_files)
            .set_allowed_directories(doc.allowed_directories)
            .set_accept_bundle(doc.accept_bundle)
            .set_need_authentication(doc.need_authentication);
        policy
    }
}

/// On-disk encodings of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Json,
    Yaml,
}

impl PolicyFormat {
    /// Picks the format from the file extension (`json`, `yml`, `yaml`).
    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(PolicyFormat::Json),
            Some("yml") | Some("yaml") => Ok(PolicyFormat::Yaml),
            _ => Err(PolicyError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl std::str::FromStr for PolicyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(PolicyFormat::Json),
            "yml" | "yaml" => Ok(PolicyFormat::Yaml),
            other => Err(format!("unknown policy format: {other}")),
        }
    }
}

impl AccessPolicy {
    /// Replaces every field with the contents of the document at `source`.
    pub fn parse<P: AsRef<Path>>(&mut self, source: P) -> Result<&mut Self, PolicyError> {
        let path = source.as_ref();
        info!(policy_path = ?path, "Loading access policy from file");
        let format = PolicyFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|e| {
            error!(error = ?e, policy_path = ?path, "Failed to read policy file");
            PolicyError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        self.parse_str(&text, format)
    }

    /// Like [`AccessPolicy::parse`], from text already in memory.
    pub fn parse_str(&mut self, text: &str, format: PolicyFormat) -> Result<&mut Self, PolicyError> {
        let doc: PolicyDocument = match format {
            PolicyFormat::Json => serde_json::from_str(text)?,
            PolicyFormat::Yaml => serde_yaml::from_str(text)?,
        };
        *self = AccessPolicy::from(doc);
        info!(
            extensions = ?self.allowed_extensions(),
            directories = ?self.allowed_directories(),
            requires_authentication = self.requires_authentication(),
            accepts_bundle_upload = self.accepts_bundle_upload(),
            "Access policy loaded"
        );
        Ok(self)
    }

    pub fn dump(&self, format: PolicyFormat) -> Result<String, PolicyError> {
        let doc = PolicyDocument::from(self);
        let text = match format {
            PolicyFormat::Json => serde_json::to_string_pretty(&doc)?,
            PolicyFormat::Yaml => serde_yaml::to_string(&doc)?,
        };
        Ok(text)
    }

    /// Writes [`AccessPolicy::dump`] output to `target`, format taken from its extension.
    pub fn save<P: AsRef<Path>>(&self, target: P) -> Result<(), PolicyError> {
        let path = target.as_ref();
        let text = self.dump(PolicyFormat::from_path(path)?)?;
        fs::write(path, text).map_err(|e| {
            error!(error = ?e, policy_path = ?path, "Failed to write policy file");
            PolicyError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        info!(policy_path = ?path, "Access policy saved");
        Ok(())
    }
}
