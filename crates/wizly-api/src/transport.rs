// Shared transport configuration for building reqwest::Client instances.
//
// TLS, timeout, and default-header settings live here so the client
// module only deals with URLs and response classification.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed reverse proxies on a LAN).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// Used by [`WizarrClient`](crate::WizarrClient) to inject the
    /// `X-API-Key` header on every request.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("wizly/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/wizly-ca.pem")),
            timeout: Duration::from_secs(5),
        };
        let result = config.build_client_with_headers(HeaderMap::new());
        assert!(matches!(result, Err(Error::Tls(_))));
    }

    #[test]
    fn default_config_builds() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.build_client_with_headers(HeaderMap::new()).is_ok());
    }
}
