//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};

use wizly_core::Controller;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with every plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
        if let Some(smtp) = profile.smtp.as_mut() {
            if smtp.password.is_some() {
                smtp.password = Some(MASK.into());
            }
        }
    }
    cfg
}

/// TOML-ish listing for `config show` in table mode.
fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|_| {
        let mut out = String::new();
        let _ = writeln!(out, "default_profile = {:?}", cfg.default_profile_name());
        for name in cfg.profiles.keys() {
            let _ = writeln!(out, "[profiles.{name}]");
        }
        out
    })
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn load() -> Result<Config, CliError> {
    Ok(wizly_config::load_config()?)
}

fn save(cfg: &Config) -> Result<(), CliError> {
    wizly_config::save_config(cfg)?;
    Ok(())
}

/// Ask for a secret, then store it in the keyring or hand it back for
/// plaintext config.
fn prompt_secret_storage(
    secret: String,
    label: &str,
    store: impl FnOnce(&str) -> Result<(), wizly_config::ConfigError>,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store(&secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn read_secret(prompt: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("wizly configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = load()?;

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(cfg.default_profile_name().to_owned())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("Wizarr URL")
                .default("http://localhost:5690".into())
                .validate_with(|input: &String| {
                    wizly_config::parse_url("url", input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let key = read_secret("API key: ", "api_key")?;
            let api_key = prompt_secret_storage(key, "API key", |k| {
                wizly_config::store_api_key(&profile_name, k)
            })?;

            let public_url: String = Input::new()
                .with_prompt("Public URL for emailed links (blank to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let insecure = Confirm::new()
                .with_prompt("Accept invalid TLS certificates?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                url,
                api_key,
                public_url: Some(public_url).filter(|u| !u.trim().is_empty()),
                insecure: insecure.then_some(true),
                ..Profile::default()
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: wizly config test");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&load()?);
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.profiles.keys().cloned().collect::<Vec<_>>().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            let path = config::config_path();
            let text = path.display().to_string();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => text,
                format => output::render_single(format, &text, Clone::clone, Clone::clone)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { profile, smtp } => {
            let cfg = load()?;
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            if smtp {
                let password = read_secret("SMTP password: ", "smtp_password")?;
                wizly_config::store_smtp_password(&profile_name, &password)?;
            } else {
                let key = read_secret("API key: ", "api_key")?;
                wizly_config::store_api_key(&profile_name, &key)?;
            }
            util::note(
                global.quiet,
                &format!("✓ Secret stored in system keyring for profile '{profile_name}'"),
            );
            Ok(())
        }

        // ── Test ────────────────────────────────────────────────────
        ConfigCommand::Test => {
            let resolved = config::resolve(global)?;
            let url = resolved.client.url.to_string();
            let controller = Controller::new(resolved.client)?;
            controller
                .verify()
                .await
                .map_err(|e| CliError::from(e).for_profile(&resolved.profile_name))?;
            util::note(
                global.quiet,
                &format!("✓ Connected to {url} (profile '{}')", resolved.profile_name),
            );
            Ok(())
        }
    }
}
