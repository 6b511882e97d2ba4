//! `load_config`: reads the static YAML config and injects credentials from the environment.
//!
//! The YAML file never holds secrets. Credentials come from `SATIS_USER` and
//! `SATIS_PASSWORD`; both must be set, or neither.
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::{PublishConfig, PublishConfigFile};
use crate::policy::AccessPolicy;
use crate::transport::Credentials;

pub const USER_ENV: &str = "SATIS_USER";
pub const PASSWORD_ENV: &str = "SATIS_PASSWORD";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PublishConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: PublishConfigFile = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let mut policy = AccessPolicy::default();
    if let Some(policy_path) = &raw.policy {
        let policy_path = match path_ref.parent() {
            Some(dir) if policy_path.is_relative() => dir.join(policy_path),
            _ => policy_path.clone(),
        };
        policy
            .parse(&policy_path)
            .with_context(|| format!("Failed to load policy {}", policy_path.display()))?;
    }

    let credentials = credentials_from_env()?;

    let config = PublishConfig {
        url: raw.url,
        policy,
        credentials,
    };
    config.trace_loaded();
    Ok(config)
}

fn credentials_from_env() -> Result<Option<Credentials>> {
    match (env::var(USER_ENV), env::var(PASSWORD_ENV)) {
        (Ok(user), Ok(password)) => {
            info!(user = %user, "Credentials found in env");
            Ok(Some(Credentials::new(user, password)))
        }
        (Err(_), Err(_)) => {
            info!("No credentials in env, publishing anonymously");
            Ok(None)
        }
        (Ok(_), Err(e)) => {
            error!(error = ?e, "{PASSWORD_ENV} missing while {USER_ENV} is set");
            anyhow::bail!("{PASSWORD_ENV} environment variable not set: {e}")
        }
        (Err(e), Ok(_)) => {
            error!(error = ?e, "{USER_ENV} missing while {PASSWORD_ENV} is set");
            anyhow::bail!("{USER_ENV} environment variable not set: {e}")
        }
    }
}
