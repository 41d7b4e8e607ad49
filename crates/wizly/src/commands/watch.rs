//! `wizly watch`: periodic refresh until Ctrl-C.

use std::time::Duration;

use wizly_core::{Controller, MIN_REFRESH_INTERVAL, Snapshot};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status::{self, StatusReport};

/// Parse `--interval` ("45s", "2m"), enforcing the refresh floor.
fn parse_interval(raw: &str) -> Result<Duration, CliError> {
    let interval = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
        field: "interval".into(),
        reason: e.to_string(),
    })?;
    if interval < MIN_REFRESH_INTERVAL {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: format!(
                "must be at least {}",
                humantime::format_duration(MIN_REFRESH_INTERVAL)
            ),
        });
    }
    Ok(interval)
}

fn print_snapshot(snapshot: &Snapshot, failures: u32, global: &GlobalOpts) -> Result<(), CliError> {
    let report = StatusReport::from_snapshot(snapshot);
    output::print_output(&status::render(&report, global)?, global.quiet);
    if failures > 0 && !global.quiet {
        eprintln!(
            "{failures} consecutive refresh(es) with no endpoint available{}",
            status::first_failure(snapshot)
                .map(|reason| format!(" ({reason})"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn handle(
    controller: &Controller,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // A custom interval needs its own controller; the client is shared.
    let controller = match args.interval.as_deref() {
        Some(raw) => {
            let config = controller
                .config()
                .clone()
                .with_refresh_interval(parse_interval(raw)?)?;
            Controller::with_client(config, controller.client().clone())
        }
        None => controller.clone(),
    };

    let mut updates = controller.subscribe();
    let first = controller.start().await;
    updates.mark_unchanged();
    print_snapshot(&first, controller.refresh_status().consecutive_failures, global)?;

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    let failures = controller.refresh_status().consecutive_failures;
                    print_snapshot(&snapshot, failures, global)?;
                }
            }
        }
    }

    controller.stop().await;
    Ok(())
}
