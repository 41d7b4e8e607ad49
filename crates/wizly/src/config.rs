//! CLI configuration: thin wrapper around `wizly_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --api-key, --insecure, --timeout).

use secrecy::SecretString;

use wizly_core::{ClientConfig, MailSettings};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use wizly_config::{Config, Defaults, Profile, config_path};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Everything a command needs to talk to one Wizarr server.
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub profile: Option<Profile>,
}

impl Resolved {
    pub fn public_url(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.public_url.as_deref())
    }

    pub fn mail_settings(&self) -> Result<MailSettings, CliError> {
        let profile = self.profile.as_ref().ok_or_else(|| CliError::NoSmtp {
            profile: self.profile_name.clone(),
        })?;
        Ok(wizly_config::profile_to_mail_settings(
            profile,
            &self.profile_name,
        )?)
    }
}

/// Build a `ClientConfig` from the config file, profile and CLI overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = wizly_config::load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let client = resolve_profile(profile, &profile_name, &cfg.defaults, global)?;
        return Ok(Resolved {
            profile_name,
            client,
            profile: Some(profile.clone()),
        });
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() && global.url.is_none() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile: build from flags / env vars alone
    let url = global.url.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let api_key = global.api_key.clone().ok_or_else(|| CliError::NoCredentials {
        profile: profile_name.clone(),
    })?;
    let profile = Profile {
        url,
        insecure: global.insecure.then_some(true),
        timeout: global.timeout,
        ..Profile::default()
    };
    let client =
        wizly_config::client_config_with_key(&profile, &cfg.defaults, SecretString::from(api_key))?;

    Ok(Resolved {
        profile_name,
        client,
        profile: None,
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let mut profile = profile.clone();

    // 1. URL (flag > env > profile)
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }

    // 2. TLS and timeout
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    // 3. API key: flag wins, else the shared credential chain
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => wizly_config::resolve_api_key(&profile, profile_name)?,
    };

    Ok(wizly_config::client_config_with_key(
        &profile, defaults, api_key,
    )?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
