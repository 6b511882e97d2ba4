//! # policy: what the remote Satis server accepts
//!
//! [`AccessPolicy`] is the allow-list consulted before every upload. It answers a
//! single question for the publisher: may this relative path be PUT under the
//! repository's base path?
//!
//! ## Rules
//! - The path must end in one of the allowed extensions (case-sensitive, from the last dot).
//! - The path must sit directly at the base path, or directly inside exactly one of
//!   the allowed top-level directories. Nothing deeper, nothing outside.
//! - `\` and `/` separators are treated alike.
//!
//! The policy owns no I/O except the helpers in [`document`] (load/store the
//! policy itself) and [`local_files`] (enumerate uploadable files on disk).

pub mod document;
pub mod local_files;

use regex::Regex;
use tracing::{debug, warn};

pub use document::{PolicyDocument, PolicyFormat};
pub use local_files::{LocalFile, LocalFiles};

/// Allow-list rules of a remote Satis repository server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed_extensions: Vec<String>,
    allowed_directories: Vec<String>,
    requires_authentication: bool,
    accepts_bundle_upload: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        AccessPolicy {
            allowed_extensions: vec!["json".to_string(), "zip".to_string()],
            allowed_directories: vec!["dist".to_string(), "include".to_string()],
            requires_authentication: true,
            accepts_bundle_upload: true,
        }
    }
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the suffix after the last dot is one of the allowed extensions.
    ///
    /// An empty extension set rejects everything.
    pub fn is_allowed_extension(&self, path: &str) -> bool {
        match path.rsplit_once('.') {
            Some((_, extension)) => self.allowed_extensions.iter().any(|e| e == extension),
            None => false,
        }
    }

    /// True iff `path` lands directly at `base_path` or directly inside one of
    /// the allowed directories below it.
    ///
    /// Builds the directory rule on every call; use [`AccessPolicy::directory_rule`]
    /// when checking many paths against the same base.
    pub fn is_allowed_directory(&self, path: &str, base_path: &str) -> bool {
        match self.directory_rule(base_path) {
            Some(rule) => rule.matches(path),
            None => false,
        }
    }

    /// The predicate the publisher checks before any upload.
    pub fn is_allowed(&self, path: &str, base_path: &str) -> bool {
        let allowed = self.is_allowed_extension(path) && self.is_allowed_directory(path, base_path);
        debug!(path, base_path, allowed, "Checked path against access policy");
        allowed
    }

    /// Compiles the directory check for `base_path` once.
    ///
    /// `None` only when the pattern exceeds the regex size limits; every path is
    /// then rejected.
    pub fn directory_rule(&self, base_path: &str) -> Option<DirectoryRule> {
        let directories = self
            .allowed_directories
            .iter()
            .map(|d| format!("{}/", regex::escape(d)))
            .collect::<Vec<_>>()
            .join("|");
        let directories = if directories.is_empty() {
            String::new()
        } else {
            format!("(?:{directories})?")
        };
        let pattern = format!("^{}{}([^/]*)$", regex::escape(base_path), directories);

        match Regex::new(&pattern) {
            Ok(pattern) => Some(DirectoryRule {
                base_path: base_path.to_string(),
                pattern,
            }),
            Err(e) => {
                warn!(error = %e, base_path, "Could not build directory pattern, rejecting paths");
                None
            }
        }
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    pub fn allowed_directories(&self) -> &[String] {
        &self.allowed_directories
    }

    /// Whether the server wants credentials on every GET and PUT.
    pub fn requires_authentication(&self) -> bool {
        self.requires_authentication
    }

    /// Whether the server unpacks zip bundles sent with `X-Explode-Archive`.
    pub fn accepts_bundle_upload(&self) -> bool {
        self.accepts_bundle_upload
    }

    /// Replaces the allowed extensions (no leading dot).
    pub fn set_allowed_files<I, S>(&mut self, extensions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allowed top-level directories.
    pub fn set_allowed_directories<I, S>(&mut self, directories: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_directories = directories.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_accept_bundle(&mut self, accept: bool) -> &mut Self {
        self.accepts_bundle_upload = accept;
        self
    }

    pub fn set_need_authentication(&mut self, authenticate: bool) -> &mut Self {
        self.requires_authentication = authenticate;
        self
    }
}

/// Compiled `^<base>(<dir1>/|<dir2>/|...)?<filename>$` check, every literal escaped.
#[derive(Debug, Clone)]
pub struct DirectoryRule {
    base_path: String,
    pattern: Regex,
}

impl DirectoryRule {
    /// True iff `path` (either separator) sits at the base path or directly in
    /// one allowed directory.
    pub fn matches(&self, path: &str) -> bool {
        let normalized = normalize_separators(path);
        let candidate = format!("{}{normalized}", self.base_path);
        // The captured tail differs from the basename only for `dir/`-style paths.
        self.pattern
            .captures(&candidate)
            .and_then(|c| c.get(1))
            .is_some_and(|name| name.as_str() == basename(&normalized))
    }
}

/// Converts Windows separators to `/`.
pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Last segment of a `/`-separated path, ignoring trailing separators.
fn basename(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}
