// ── Core error types ──
//
// User-facing errors from wizly-core. Transport failures arrive as
// `wizly_api::Error` and are translated here so consumers see
// domain-level variants instead of HTTP plumbing.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Wizarr at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to Wizarr timed out: {url}")]
    Timeout { url: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Wizarr rejected the request (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from Wizarr: {message}")]
    InvalidResponse { message: String },

    // ── Notification errors ──────────────────────────────────────────
    #[error("Failed to send email: {message}")]
    Notify { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wizly_api::Error> for CoreError {
    fn from(err: wizly_api::Error) -> Self {
        match err {
            wizly_api::Error::Auth => CoreError::AuthenticationFailed {
                message: "invalid credentials".into(),
            },
            wizly_api::Error::InvalidApiKey { message } => CoreError::AuthenticationFailed {
                message: format!("API key is not a valid header value: {message}"),
            },
            wizly_api::Error::Connectivity {
                url,
                timed_out: true,
                ..
            } => CoreError::Timeout { url },
            wizly_api::Error::Connectivity { url, reason, .. } => {
                CoreError::ConnectionFailed { url, reason }
            }
            wizly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wizly_api::Error::InvalidId { id } => CoreError::ValidationFailed {
                message: format!("invalid id {id:?}"),
            },
            wizly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            wizly_api::Error::Request { status: 404, body } => CoreError::NotFound {
                message: if body.is_empty() {
                    "resource does not exist".into()
                } else {
                    body
                },
            },
            wizly_api::Error::Request { status, body } => CoreError::Api {
                status,
                message: body,
            },
            wizly_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_translate() {
        let timed_out = wizly_api::Error::Connectivity {
            url: "http://wizarr.local/api/status".into(),
            reason: "operation timed out".into(),
            timed_out: true,
        };
        assert!(matches!(
            CoreError::from(timed_out),
            CoreError::Timeout { .. }
        ));

        assert!(matches!(
            CoreError::from(wizly_api::Error::Auth),
            CoreError::AuthenticationFailed { .. }
        ));

        let missing = wizly_api::Error::Request {
            status: 404,
            body: String::new(),
        };
        assert!(matches!(
            CoreError::from(missing),
            CoreError::NotFound { .. }
        ));

        let rejected = wizly_api::Error::Request {
            status: 400,
            body: "server_ids required".into(),
        };
        match CoreError::from(rejected) {
            CoreError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "server_ids required");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
