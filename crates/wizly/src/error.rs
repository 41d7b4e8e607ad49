//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wizly_config::ConfigError;
use wizly_core::{CoreError, VerifyError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const ACTION_FAILED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Wizarr at {url}")]
    #[diagnostic(
        code(wizly::connection_failed),
        help(
            "Check that Wizarr is running and reachable.\n\
             Reason: {reason}\n\
             Try: wizly config test --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(wizly::timeout),
        help("Increase the timeout with --timeout or check Wizarr's responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Wizarr rejected the API key")]
    #[diagnostic(
        code(wizly::auth_failed),
        help(
            "Create an API key under Settings > API Keys in Wizarr, then run:\n\
             wizly config set-key --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(wizly::no_credentials),
        help(
            "Configure one with: wizly config init\n\
             Or pass --api-key / set WIZLY_API_KEY."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} not found: {message}")]
    #[diagnostic(
        code(wizly::not_found),
        help("Run: wizly {list_command} to see available ids")
    )]
    NotFound {
        resource_type: String,
        message: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Wizarr returned HTTP {status}: {message}")]
    #[diagnostic(code(wizly::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from Wizarr: {message}")]
    #[diagnostic(code(wizly::invalid_response))]
    InvalidResponse { message: String },

    #[error("{endpoint} is unavailable: {reason}")]
    #[diagnostic(
        code(wizly::unavailable),
        help("Run with -v to see why each endpoint failed.")
    )]
    Unavailable { endpoint: String, reason: String },

    // ── Actions ──────────────────────────────────────────────────────

    #[error("Invitation {outcome}: {reason}")]
    #[diagnostic(code(wizly::action_failed))]
    ActionFailed { outcome: String, reason: String },

    #[error("Email could not be sent: {message}")]
    #[diagnostic(
        code(wizly::notify),
        help("Check the [profiles.<name>.smtp] table in your config.")
    )]
    Notify { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wizly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wizly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wizly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Wizarr server configured")]
    #[diagnostic(
        code(wizly::no_config),
        help(
            "Create a profile with: wizly config init\n\
             Expected at: {path}\n\
             Or pass --url and --api-key."
        )
    )]
    NoConfig { path: String },

    #[error("No SMTP settings for profile '{profile}'")]
    #[diagnostic(
        code(wizly::no_smtp),
        help(
            "Add a [profiles.{profile}.smtp] table with host, username and\n\
             password (or an outbox directory for local testing)."
        )
    )]
    NoSmtp { profile: String },

    #[error(transparent)]
    #[diagnostic(code(wizly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wizly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(wizly::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unavailable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ActionFailed { .. } | Self::Notify { .. } => exit_code::ACTION_FAILED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the active profile in auth help text.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed {
                profile: "<name>".into(),
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::NotFound { message } => Self::NotFound {
                resource_type: "Resource".into(),
                message,
                list_command: "status".into(),
            },
            CoreError::Api { status, message } => Self::ApiError { status, message },
            CoreError::InvalidResponse { message } => Self::InvalidResponse { message },
            CoreError::Notify { message } => Self::Notify { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<VerifyError> for CliError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::CannotConnect { reason } => Self::ConnectionFailed {
                url: "(configured URL)".into(),
                reason,
            },
            VerifyError::InvalidAuth => Self::AuthFailed {
                profile: "<name>".into(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::NoSmtp { profile } => Self::NoSmtp { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see wizly config show)".into(),
            },
            other => Self::Config(other),
        }
    }
}
