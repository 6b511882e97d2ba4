//! # transport: one HTTP exchange at a time
//!
//! The publisher never talks to `reqwest` directly. It builds an [`HttpRequest`]
//! and hands it to a [`Transport`], which answers with a tagged result:
//!
//! - `Ok(HttpResponse)` for any non-error status (1xx to 3xx), with the body text.
//! - `Err(TransportError::Status { .. })` when the server answered 4xx/5xx. The numeric
//!   code is carried when known; `status_line` is kept for transports that only expose text.
//! - `Err(TransportError::Request(..))` when no response came back (DNS, connect, timeout).
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests build a `MockTransport` and script
//!   responses per request without a server.

use std::fmt;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Put => f.write_str("PUT"),
        }
    }
}

/// Basic-auth user and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully resolved request: absolute URL, extra headers, raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub credentials: Option<Credentials>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with an error status.
    #[error("server answered {status_line}")]
    Status {
        code: Option<u16>,
        status_line: String,
    },
    /// No response was received.
    #[error("request failed: {0}")]
    Request(String),
}

/// Sends one request and waits for its response.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Reuses a client configured elsewhere (proxy, timeouts, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        info!(
            method = %request.method,
            url = %request.url,
            body_size = request.body.len(),
            authenticated = request.credentials.is_some(),
            "Sending HTTP request"
        );

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url).body(request.body.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(creds) = &request.credentials {
            builder = builder.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = builder.send().await.map_err(|e| {
            error!(error = ?e, url = %request.url, "HTTP request failed without a response");
            TransportError::Request(e.to_string())
        })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let status_line = format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
            debug!(url = %request.url, %status_line, "Server answered with an error status");
            return Err(TransportError::Status {
                code: Some(status.as_u16()),
                status_line,
            });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = ?e, url = %request.url, "Failed to read response body");
            TransportError::Request(e.to_string())
        })?;
        debug!(url = %request.url, status = status.as_u16(), body_size = body.len(), "HTTP response received");
        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
