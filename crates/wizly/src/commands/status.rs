//! `wizly status`: one refresh cycle rendered as summary views.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;
use wizly_core::{Controller, DerivedView, EndpointState, Snapshot, build_views};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Report ──────────────────────────────────────────────────────────

/// What `status` and `watch` print for one snapshot.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub fetched_at: DateTime<Utc>,
    pub available: usize,
    pub views: Vec<DerivedView>,
}

impl StatusReport {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            fetched_at: snapshot.fetched_at(),
            available: snapshot.available_count(),
            views: build_views(snapshot),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ViewRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl ViewRow {
    fn new(view: &DerivedView, color: bool) -> Self {
        Self {
            endpoint: view.endpoint.to_string(),
            state: output::paint_state(&view.state.to_string(), color),
            details: details(view),
        }
    }
}

/// `key: value` lines for every attribute except the bulky invitation
/// list and the redundant `status` marker.
fn details(view: &DerivedView) -> String {
    view.attributes
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "invitations" | "status"))
        .map(|(key, value)| format!("{key}: {}", compact(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn compact(value: &Value) -> String {
    match value {
        Value::Object(buckets) => buckets
            .iter()
            .map(|(bucket, count)| format!("{bucket}={}", output::cell(Some(count))))
            .collect::<Vec<_>>()
            .join(", "),
        other => output::cell(Some(other)),
    }
}

// ── Rendering ───────────────────────────────────────────────────────

pub fn render(report: &StatusReport, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color);
    output::render_single(
        global.output,
        report,
        |r| {
            let rows: Vec<ViewRow> = r.views.iter().map(|v| ViewRow::new(v, color)).collect();
            let mut text = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            let _ = write!(
                text,
                "\n{}/{} endpoints available, fetched {}",
                r.available,
                r.views.len(),
                r.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            text
        },
        |r| {
            r.views
                .iter()
                .map(|v| format!("{}\t{}", v.endpoint, v.state))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

/// First failure reason, for when nothing answered.
pub fn first_failure(snapshot: &Snapshot) -> Option<String> {
    snapshot.iter().find_map(|(endpoint, state)| match state {
        EndpointState::Unavailable { reason, .. } => Some(format!("{endpoint}: {reason}")),
        EndpointState::Available { .. } => None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller.refresh().await;
    let report = StatusReport::from_snapshot(&snapshot);
    output::print_output(&render(&report, global)?, global.quiet);

    if snapshot.any_available() {
        Ok(())
    } else {
        Err(CliError::Unavailable {
            endpoint: "Wizarr".into(),
            reason: first_failure(&snapshot).unwrap_or_default(),
        })
    }
}
