use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by [`crate::publisher::RepositoryPublisher`].
///
/// Remote error statuses are not here: they are recorded in
/// `RepositoryPublisher::status` so batch uploads can carry on.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid repository url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A private server without credentials, or a public one with them.
    #[error(
        "misconfigured publisher: server requires authentication = {requires_authentication}, credentials supplied = {has_credentials}"
    )]
    Configuration {
        requires_authentication: bool,
        has_credentials: bool,
    },

    #[error("PUT of {path} refused: not an allowed file or sub-directory")]
    UploadRejected { path: String },

    #[error("bundle upload of {} refused: {reason}", .path.display())]
    BundleRejected { path: PathBuf, reason: String },

    #[error("not a directory: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// No HTTP response was received at all (DNS, connect, timeout).
    #[error("network failure on {url}: {message}")]
    Network { url: String, message: String },
}

/// Failures while loading, storing or walking with an [`crate::policy::AccessPolicy`].
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid JSON policy document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported policy format for {} (expected .json, .yml or .yaml)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}
