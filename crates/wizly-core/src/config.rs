// ── Runtime connection configuration ──
//
// Describes how to reach one Wizarr server. Carries the credential and
// connection tuning, never touches disk. The CLI builds a `ClientConfig`
// from its profile and hands it to `Controller`.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use wizly_api::{TlsMode, TransportConfig};

use crate::error::CoreError;

/// Default period between refresh cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest refresh period accepted.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed reverse proxies).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single Wizarr server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g. `http://192.168.1.29:5690`).
    pub url: Url,
    /// Value of the `X-API-Key` header.
    pub api_key: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Period between scheduled refresh cycles.
    pub refresh_interval: Duration,
}

impl ClientConfig {
    /// Build a config with default timeout, TLS and refresh interval.
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Set the refresh interval, rejecting anything below
    /// [`MIN_REFRESH_INTERVAL`].
    pub fn with_refresh_interval(mut self, interval: Duration) -> Result<Self, CoreError> {
        validate_refresh_interval(interval)?;
        self.refresh_interval = interval;
        Ok(self)
    }

    /// Check invariants a hand-built config may have skipped.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme '{}'", self.url.scheme()),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        validate_refresh_interval(self.refresh_interval)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

fn validate_refresh_interval(interval: Duration) -> Result<(), CoreError> {
    if interval < MIN_REFRESH_INTERVAL {
        return Err(CoreError::Config {
            message: format!(
                "refresh interval must be at least {}s (got {}s)",
                MIN_REFRESH_INTERVAL.as_secs(),
                interval.as_secs()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(
            Url::parse("http://wizarr.local:5690").unwrap(),
            SecretString::from("key".to_owned()),
        )
    }

    #[test]
    fn defaults() {
        let cfg = config();
        assert_eq!(cfg.refresh_interval, Duration::from_secs(30));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        assert!(config().with_refresh_interval(Duration::from_secs(9)).is_err());
        let cfg = config()
            .with_refresh_interval(Duration::from_secs(10))
            .unwrap();
        assert_eq!(cfg.refresh_interval, MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let mut cfg = config();
        cfg.url = Url::parse("ftp://wizarr.local").unwrap();
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }
}
