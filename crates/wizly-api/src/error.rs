use thiserror::Error;

/// Top-level error type for the `wizly-api` crate.
///
/// Every request either returns decoded JSON or fails with exactly one of
/// these variants. `wizly-core` maps them into user-facing diagnostics and,
/// during a refresh cycle, downgrades them to a per-endpoint `Unavailable`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server rejected the API key (HTTP 401).
    #[error("Authentication failed: invalid credentials")]
    Auth,

    /// The API key cannot be encoded as an HTTP header value.
    #[error("Invalid API key header value: {message}")]
    InvalidApiKey { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// No response reached us (DNS failure, connection refused, timeout).
    #[error("Cannot reach {url}: {reason}")]
    Connectivity {
        url: String,
        reason: String,
        timed_out: bool,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A resource id that cannot stand as a single path segment.
    #[error("Invalid resource id: {id:?}")]
    InvalidId { id: String },

    /// TLS configuration or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Any non-2xx status other than 401, with the raw body for diagnostics.
    #[error("Request failed (HTTP {status}): {body}")]
    Request { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A 2xx response whose body is not JSON.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse classification of an [`Error`], used for logging and for the
/// credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Auth,
    Request,
    Other,
}

impl Error {
    /// Build a connectivity error from a `reqwest` failure.
    pub(crate) fn connectivity(url: &url::Url, err: &reqwest::Error) -> Self {
        Self::Connectivity {
            url: url.to_string(),
            reason: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::Auth | Self::InvalidApiKey { .. } => ErrorKind::Auth,
            Self::Request { .. } => ErrorKind::Request,
            Self::InvalidUrl(_)
            | Self::InvalidId { .. }
            | Self::Tls(_)
            | Self::Deserialization { .. } => ErrorKind::Other,
        }
    }

    /// Returns `true` if the server rejected our credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connectivity { .. } => true,
            Self::Request { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Request { status: 404, .. })
    }

    /// The HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth => Some(401),
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let conn = Error::Connectivity {
            url: "http://wizarr.local/api/status".into(),
            reason: "connection refused".into(),
            timed_out: false,
        };
        assert_eq!(conn.kind(), ErrorKind::Connectivity);
        assert!(conn.is_transient());
        assert_eq!(conn.status(), None);

        assert_eq!(Error::Auth.kind(), ErrorKind::Auth);
        assert!(Error::Auth.is_auth());
        assert_eq!(Error::Auth.status(), Some(401));

        let bad = Error::Request {
            status: 422,
            body: "{\"error\":\"server_ids required\"}".into(),
        };
        assert_eq!(bad.kind(), ErrorKind::Request);
        assert!(!bad.is_transient());
        assert_eq!(bad.status(), Some(422));

        let gone = Error::Request {
            status: 404,
            body: String::new(),
        };
        assert!(gone.is_not_found());
        assert_eq!(ErrorKind::Connectivity.to_string(), "connectivity");
    }
}
