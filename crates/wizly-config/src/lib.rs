//! Shared configuration for wizly.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `wizly_core::ClientConfig` and `wizly_core::MailSettings`.
//! The CLI layers its `GlobalOpts` overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wizly_core::{ClientConfig, MailSettings, SmtpSettings, TlsVerification};

/// Keyring service name all secrets are stored under.
pub const KEYRING_SERVICE: &str = "wizly";

/// Prefix for environment overrides (`WIZLY_DEFAULTS__TIMEOUT=60`).
pub const ENV_PREFIX: &str = "WIZLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no SMTP settings configured for profile '{profile}'")]
    NoSmtp { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Refresh interval in seconds for `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    wizly_core::DEFAULT_REFRESH_INTERVAL.as_secs()
}

/// A named Wizarr server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Wizarr base URL (e.g. "http://192.168.1.29:5690").
    pub url: String,

    /// API key (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Public base URL used in emailed invitation links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,

    /// Outgoing mail for `invitations email`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpProfile>,
}

/// Outgoing mail settings for a profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpProfile {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Sender address; defaults to `username`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default = "default_starttls")]
    pub starttls: bool,

    /// Write messages to this directory instead of sending them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox: Option<PathBuf>,
}

fn default_smtp_port() -> u16 {
    587
}
fn default_starttls() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "wizly", "wizly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wizly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file yields
/// the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str, secret: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{secret}"),
    )?)
}

/// Store a profile's API key in the system keyring.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "api-key")?.set_password(key)?;
    Ok(())
}

/// Store a profile's SMTP password in the system keyring.
pub fn store_smtp_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "smtp-password")?.set_password(password)?;
    Ok(())
}

/// Env var named by `env_name`, then keyring, then plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    profile_name: &str,
    keyring_key: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    // 1. Env var named by the profile
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(secret) = keyring_entry(profile_name, keyring_key).and_then(|entry| {
        entry.get_password().map_err(ConfigError::from)
    }) {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    plaintext.map(|s| SecretString::from(s.to_owned()))
}

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.api_key_env.as_deref(),
        profile_name,
        "api-key",
        profile.api_key.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to core types ───────────────────────────────────────

/// Parse and check a Wizarr base URL.
pub fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `ClientConfig` from a profile and the global defaults, with no
/// CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_key = resolve_api_key(profile, profile_name)?;
    client_config_with_key(profile, defaults, api_key)
}

/// Build a `ClientConfig` from a profile with an already-resolved key.
pub fn client_config_with_key(
    profile: &Profile,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let url = parse_url("url", &profile.url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ClientConfig::new(url, api_key);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let interval = profile.refresh_interval.unwrap_or(defaults.refresh_interval);
    config
        .with_refresh_interval(Duration::from_secs(interval))
        .map_err(|e| ConfigError::Validation {
            field: "refresh_interval".into(),
            reason: e.to_string(),
        })
}

/// Build mail delivery settings from a profile's `[smtp]` table.
pub fn profile_to_mail_settings(
    profile: &Profile,
    profile_name: &str,
) -> Result<MailSettings, ConfigError> {
    let smtp = profile.smtp.as_ref().ok_or_else(|| ConfigError::NoSmtp {
        profile: profile_name.into(),
    })?;

    if let Some(ref dir) = smtp.outbox {
        let from = smtp.from.clone().unwrap_or_else(|| smtp.username.clone());
        return Ok(MailSettings::File {
            dir: dir.clone(),
            from,
        });
    }

    if smtp.host.is_empty() {
        return Err(ConfigError::Validation {
            field: "smtp.host".into(),
            reason: "must not be empty".into(),
        });
    }
    let password = resolve_secret(
        smtp.password_env.as_deref(),
        profile_name,
        "smtp-password",
        smtp.password.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })?;

    Ok(MailSettings::Smtp(SmtpSettings {
        host: smtp.host.clone(),
        port: smtp.port,
        username: smtp.username.clone(),
        password,
        from: smtp.from.clone(),
        starttls: smtp.starttls,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 15

[profiles.home]
url = "http://192.168.1.29:5690"
api_key = "plain-key"
public_url = "https://media.example.com"
refresh_interval = 60

[profiles.home.smtp]
host = "smtp.example.com"
username = "wizarr@example.com"
password = "hunter2"

[profiles.lab]
url = "https://wizarr.lab"
api_key_env = "CARGO_PKG_NAME"
insecure = true
"#;

    fn load_sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile_name(), "default");
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.refresh_interval, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn parses_profiles_and_defaults() {
        let cfg = load_sample();
        assert_eq!(cfg.default_profile_name(), "home");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 15);
        assert_eq!(cfg.defaults.color, "auto");

        let home = cfg.profile("home").unwrap();
        assert_eq!(home.public_url.as_deref(), Some("https://media.example.com"));
        let smtp = home.smtp.as_ref().unwrap();
        assert_eq!(smtp.port, 587);
        assert!(smtp.starttls);
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn client_config_from_profile() {
        let cfg = load_sample();
        let home = cfg.profile("home").unwrap();
        let client = profile_to_client_config(home, "home", &cfg.defaults).unwrap();
        assert_eq!(client.url.as_str(), "http://192.168.1.29:5690/");
        assert_eq!(client.timeout, Duration::from_secs(15));
        assert_eq!(client.refresh_interval, Duration::from_secs(60));
        assert_eq!(client.tls, TlsVerification::SystemDefaults);

        let lab = cfg.profile("lab").unwrap();
        let client = profile_to_client_config(lab, "lab", &cfg.defaults).unwrap();
        assert_eq!(client.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(client.api_key.expose_secret(), "wizly-config");
    }

    #[test]
    fn refresh_interval_below_floor_is_rejected() {
        let profile = Profile {
            url: "http://wizarr.local".into(),
            api_key: Some("k".into()),
            refresh_interval: Some(5),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, "fast", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "refresh_interval"));
    }

    #[test]
    fn url_validation() {
        assert!(parse_url("url", "http://wizarr.local").is_ok());
        assert!(parse_url("url", "wizarr.local").is_err());
        assert!(parse_url("url", "ftp://wizarr.local").is_err());
    }

    #[test]
    fn mail_settings_from_profile() {
        let cfg = load_sample();
        let home = cfg.profile("home").unwrap();
        let MailSettings::Smtp(smtp) = profile_to_mail_settings(home, "home").unwrap() else {
            panic!("expected SMTP settings");
        };
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.sender(), "wizarr@example.com");

        let lab = cfg.profile("lab").unwrap();
        assert!(matches!(
            profile_to_mail_settings(lab, "lab"),
            Err(ConfigError::NoSmtp { .. })
        ));
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                url: "http://wizarr.local:5690".into(),
                api_key_env: Some("WIZARR_KEY".into()),
                ..Profile::default()
            },
        );
        save_config_to(&path, &cfg).unwrap();

        let reloaded = load_config_from(&path).unwrap();
        let profile = reloaded.profile("default").unwrap();
        assert_eq!(profile.url, "http://wizarr.local:5690");
        assert_eq!(profile.api_key_env.as_deref(), Some("WIZARR_KEY"));
        assert!(profile.api_key.is_none());
    }
}
