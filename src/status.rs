//! HTTP status vocabulary exposed by the publisher.

use std::fmt;

/// Status codes a Satis publishing run cares about. Anything else is carried as
/// [`RemoteStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    Ok,
    Created,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Other(u16),
}

/// Error statuses recorded for a GET.
pub const GET_ERROR_STATUSES: &[RemoteStatus] = &[
    RemoteStatus::NotFound,
    RemoteStatus::Forbidden,
    RemoteStatus::Unauthorized,
];

/// Error statuses recorded for a PUT.
pub const PUT_ERROR_STATUSES: &[RemoteStatus] = &[
    RemoteStatus::Forbidden,
    RemoteStatus::MethodNotAllowed,
    RemoteStatus::Unauthorized,
];

// Status lines some servers send, including French reason phrases.
const STATUS_LINE_PATTERNS: &[(RemoteStatus, &[&str])] = &[
    (RemoteStatus::NotFound, &["404 Not Found", "404 Introuvable"]),
    (RemoteStatus::Forbidden, &["403 Forbidden"]),
    (RemoteStatus::Unauthorized, &["401 Unauthorized", "401 Non-Autoris"]),
    (RemoteStatus::MethodNotAllowed, &["405 Method Not Allowed"]),
];

impl RemoteStatus {
    pub fn code(self) -> u16 {
        match self {
            RemoteStatus::Ok => 200,
            RemoteStatus::Created => 201,
            RemoteStatus::Unauthorized => 401,
            RemoteStatus::Forbidden => 403,
            RemoteStatus::NotFound => 404,
            RemoteStatus::MethodNotAllowed => 405,
            RemoteStatus::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.code())
    }

    /// Recognises a status from its textual status line when no numeric code is available.
    pub fn from_status_line(line: &str) -> Option<RemoteStatus> {
        STATUS_LINE_PATTERNS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| line.contains(p)))
            .map(|(status, _)| *status)
    }
}

impl From<u16> for RemoteStatus {
    fn from(code: u16) -> Self {
        match code {
            200 => RemoteStatus::Ok,
            201 => RemoteStatus::Created,
            401 => RemoteStatus::Unauthorized,
            403 => RemoteStatus::Forbidden,
            404 => RemoteStatus::NotFound,
            405 => RemoteStatus::MethodNotAllowed,
            other => RemoteStatus::Other(other),
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
