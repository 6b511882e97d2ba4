//! # publisher: push a Satis build to its web server
//!
//! [`RepositoryPublisher`] is bound to one target repository URL. It GETs files
//! from it and PUTs files to it, checking every upload against its
//! [`AccessPolicy`] first.
//!
//! ## Status bookkeeping
//! Each call records the outcome of its HTTP exchange:
//! - a successful response sets [`RepositoryPublisher::status`] and [`RepositoryPublisher::body`];
//! - a recognised error status (401/403/404 for GET, 401/403/405 for PUT) only sets `status`;
//! - any other error status leaves both untouched and is logged.
//!
//! Remote error statuses are never returned as `Err`, so [`RepositoryPublisher::put_dir`]
//! keeps going after a file the server refused. Caller mistakes (disallowed path,
//! missing archive or directory) and requests that got no response at all are
//! returned as [`PublishError`].
//!
//! ## Execution
//! One request at a time: every method awaits its exchange before returning and
//! `put_dir` uploads files strictly in sequence. No retries, no timeouts beyond
//! those of the transport.

use std::fs;
use std::path::Path;

use reqwest::Url;
use tracing::{error, info, warn};

use crate::error::PublishError;
use crate::policy::{normalize_separators, AccessPolicy};
use crate::status::{RemoteStatus, GET_ERROR_STATUSES, PUT_ERROR_STATUSES};
use crate::transport::{
    Credentials, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
};

pub const DEFAULT_INDEX_FILE: &str = "satis.json";
pub const DEFAULT_BUNDLE_ARCHIVE: &str = "build.zip";
/// Asks the server to unpack an uploaded zip in place.
pub const EXPLODE_ARCHIVE_HEADER: &str = "X-Explode-Archive";

pub struct RepositoryPublisher<T: Transport = ReqwestTransport> {
    base_url: String,
    base_path: String,
    credentials: Option<Credentials>,
    policy: AccessPolicy,
    transport: T,
    last_status: Option<RemoteStatus>,
    last_body: String,
}

impl RepositoryPublisher<ReqwestTransport> {
    /// Publisher talking HTTP through `reqwest`.
    ///
    /// See [`RepositoryPublisher::with_transport`] for the meaning of the arguments.
    pub fn new(
        target_url: &str,
        credentials: Option<Credentials>,
        policy: Option<AccessPolicy>,
    ) -> Result<Self, PublishError> {
        Self::with_transport(target_url, credentials, policy, ReqwestTransport::new())
    }
}

impl<T: Transport> RepositoryPublisher<T> {
    /// Binds a publisher to `target_url` (`scheme://[user:pass@]host[:port][/path/]`).
    ///
    /// Explicit `credentials` win over userinfo embedded in the URL. Without a
    /// `policy`, [`AccessPolicy::default`] applies.
    ///
    /// # Errors
    /// [`PublishError::Configuration`] when the policy's authentication requirement and
    /// the presence of credentials disagree.
    pub fn with_transport(
        target_url: &str,
        credentials: Option<Credentials>,
        policy: Option<AccessPolicy>,
        transport: T,
    ) -> Result<Self, PublishError> {
        let url = Url::parse(target_url).map_err(|e| {
            error!(error = %e, url = target_url, "Failed to parse repository url");
            PublishError::InvalidUrl {
                url: target_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            error!(url = target_url, "Repository url must be http(s) with a host");
            return Err(PublishError::InvalidUrl {
                url: target_url.to_string(),
                reason: "expected an http or https url with a host".to_string(),
            });
        }

        let base_url = url.origin().ascii_serialization();
        let mut base_path = url.path().to_string();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }

        let url_credentials = match (url.username(), url.password()) {
            (user, Some(password)) if !user.is_empty() => Some(Credentials::new(user, password)),
            _ => None,
        };
        let credentials = credentials.or(url_credentials);
        let policy = policy.unwrap_or_default();

        let requires_authentication = policy.requires_authentication();
        let has_credentials = credentials.is_some();
        if requires_authentication != has_credentials {
            error!(
                requires_authentication,
                has_credentials, "Publisher credentials do not match server authentication policy"
            );
            return Err(PublishError::Configuration {
                requires_authentication,
                has_credentials,
            });
        }

        info!(
            base_url = %base_url,
            base_path = %base_path,
            authenticated = has_credentials,
            "Initialized repository publisher"
        );
        Ok(RepositoryPublisher {
            base_url,
            base_path,
            credentials,
            policy,
            transport,
            last_status: None,
            last_body: String::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Status of the last recorded exchange, `None` before any.
    pub fn status(&self) -> Option<RemoteStatus> {
        self.last_status
    }

    /// Body of the last successful response, empty if there was none.
    pub fn body(&self) -> &str {
        &self.last_body
    }

    /// GETs `path` below the base path.
    pub async fn get_file(&mut self, path: &str) -> Result<&mut Self, PublishError> {
        let request = self.request(Method::Get, path, Vec::new(), Vec::new());
        self.exchange(request, GET_ERROR_STATUSES).await?;
        Ok(self)
    }

    /// PUTs `content` to `path` below the base path.
    ///
    /// # Errors
    /// [`PublishError::UploadRejected`] when the policy refuses `path`; no request is sent.
    pub async fn put_file(
        &mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> Result<&mut Self, PublishError> {
        if !self.policy.is_allowed(path, &self.base_path) {
            warn!(path, base_path = %self.base_path, "Upload refused by access policy");
            return Err(PublishError::UploadRejected {
                path: path.to_string(),
            });
        }

        let headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let request = self.request(
            Method::Put,
            &normalize_separators(path),
            headers,
            content.into(),
        );
        self.exchange(request, PUT_ERROR_STATUSES).await?;
        Ok(self)
    }

    /// Uploads a zip of the whole repository for the server to unpack.
    ///
    /// # Errors
    /// [`PublishError::BundleRejected`] when the server does not take bundles, or the
    /// archive is missing, unreadable or empty.
    pub async fn put_bundle_zip<P: AsRef<Path>>(
        &mut self,
        archive: P,
    ) -> Result<&mut Self, PublishError> {
        let archive = archive.as_ref();
        let reject = |reason: String| {
            warn!(archive = %archive.display(), reason = %reason, "Bundle upload refused");
            PublishError::BundleRejected {
                path: archive.to_path_buf(),
                reason,
            }
        };

        if !self.policy.accepts_bundle_upload() {
            return Err(reject("server does not accept bundle uploads".to_string()));
        }
        let content = match fs::read(archive) {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => return Err(reject("archive is empty".to_string())),
            Err(e) => return Err(reject(format!("cannot read archive: {e}"))),
        };
        let name = match archive.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return Err(reject("archive has no usable file name".to_string())),
        };

        info!(archive = %archive.display(), size = content.len(), "Uploading repository bundle");
        self.put_file(&name, content, &[(EXPLODE_ARCHIVE_HEADER, "true")])
            .await
    }

    /// Uploads, one by one, every file under `directory` the policy allows.
    ///
    /// A local file that cannot be read is logged and skipped, and a refusal by
    /// the server only updates [`RepositoryPublisher::status`]; both leave the
    /// remaining files to be sent.
    ///
    /// # Errors
    /// [`PublishError::DirectoryNotFound`] when `directory` is not a directory.
    /// [`PublishError::Network`] when a PUT gets no response at all; the files
    /// not yet sent are then not attempted.
    pub async fn put_dir<P: AsRef<Path>>(&mut self, directory: P) -> Result<&mut Self, PublishError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            warn!(directory = %directory.display(), "Directory to upload not found");
            return Err(PublishError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }

        let policy = self.policy().clone();
        let mut uploaded = 0usize;
        let mut skipped = 0usize;
        for file in policy.enumerate_local_files(directory) {
            let file = match file {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, "Skipping local file that could not be read");
                    skipped += 1;
                    continue;
                }
            };
            self.put_file(&file.relative_path, file.content, &[]).await?;
            uploaded += 1;
        }

        info!(
            directory = %directory.display(),
            uploaded,
            skipped,
            last_status = ?self.last_status,
            "Directory upload finished"
        );
        Ok(self)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{}{}", self.base_url, self.base_path, path),
            headers,
            body,
            credentials: self.credentials.clone(),
        }
    }

    /// Sends `request` and records its outcome; `recognised` lists the error
    /// statuses worth recording for this kind of request.
    async fn exchange(
        &mut self,
        request: HttpRequest,
        recognised: &[RemoteStatus],
    ) -> Result<(), PublishError> {
        let method = request.method;
        let url = request.url.clone();
        let outcome = self.transport.execute(request).await;
        self.record(method, url, outcome, recognised)
    }

    fn record(
        &mut self,
        method: Method,
        url: String,
        outcome: Result<HttpResponse, TransportError>,
        recognised: &[RemoteStatus],
    ) -> Result<(), PublishError> {
        match outcome {
            Ok(response) => {
                let status = RemoteStatus::from(response.status);
                info!(%method, url = %url, %status, "Request completed");
                self.last_status = Some(status);
                self.last_body = response.body;
                Ok(())
            }
            Err(TransportError::Status { code, status_line }) => {
                let status = code
                    .map(RemoteStatus::from)
                    .or_else(|| RemoteStatus::from_status_line(&status_line))
                    .filter(|s| recognised.contains(s));
                match status {
                    Some(status) => {
                        warn!(%method, url = %url, %status, "Server refused request");
                        self.last_status = Some(status);
                    }
                    None => {
                        warn!(
                            %method,
                            url = %url,
                            status_line = %status_line,
                            "Unrecognised error status, last status left unchanged"
                        );
                    }
                }
                Ok(())
            }
            Err(TransportError::Request(message)) => {
                error!(%method, url = %url, error = %message, "No response from server");
                Err(PublishError::Network { url, message })
            }
        }
    }
}
