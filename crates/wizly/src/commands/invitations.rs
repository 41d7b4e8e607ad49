//! Invitation command handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;
use wizly_core::{
    ActionOutcome, Controller, CoreError, CreateInvitationRequest, EmailInvitationRequest,
    EnrichedInvitation, Endpoint, MailNotifier, Record, RecordId, build_library_labels,
    build_user_labels, enrich_invitations, parse_id_list,
};

use crate::cli::{
    CreateInvitationArgs, EmailInvitationArgs, GlobalOpts, InvitationsArgs, InvitationsCommand,
};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, cell};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InvitationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Used By")]
    used_by: String,
    #[tabled(rename = "Libraries")]
    libraries: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&EnrichedInvitation> for InvitationRow {
    fn from(inv: &EnrichedInvitation) -> Self {
        let v = inv.record().as_value();
        Self {
            id: cell(v.get("id")),
            code: cell(v.get("code")),
            status: cell(v.get("status")),
            used_by: cell(inv.used_by()),
            libraries: Some(cell(inv.specific_libraries()))
                .filter(|libs| !libs.is_empty())
                .unwrap_or_else(|| "all".into()),
            expires: cell(v.get("expires")),
        }
    }
}

// ── Action report ───────────────────────────────────────────────────

/// Serializable summary of a successful (or half-successful) action.
#[derive(Debug, Serialize)]
struct ActionReport<'a> {
    outcome: &'static str,
    id: Option<&'a RecordId>,
    code: Option<&'a str>,
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> ActionReport<'a> {
    fn new(outcome: &'a ActionOutcome) -> Self {
        let invitation = outcome.invitation();
        Self {
            outcome: outcome.kind(),
            id: invitation.and_then(|i| i.id.as_ref()),
            code: invitation.and_then(|i| i.code.as_deref()),
            url: invitation.and_then(|i| i.url.as_deref()),
            recipient: match outcome {
                ActionOutcome::Emailed { recipient, .. } => Some(recipient.as_str()),
                _ => None,
            },
            error: outcome.failure(),
        }
    }

    fn detail(&self) -> String {
        let mut lines = vec![format!(
            "Invitation {}",
            self.id.map_or_else(|| "created".into(), ToString::to_string)
        )];
        if let Some(code) = self.code {
            lines.push(format!("  Code: {code}"));
        }
        if let Some(url) = self.url {
            lines.push(format!("  URL:  {url}"));
        }
        if let Some(recipient) = self.recipient {
            lines.push(format!("  Emailed to {recipient}"));
        }
        lines.join("\n")
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn build_request(args: &CreateInvitationArgs) -> CreateInvitationRequest {
    CreateInvitationRequest {
        server_ids: parse_id_list(&args.servers),
        expires_in_days: args.expires_in_days,
        duration: args.duration.clone(),
        library_ids: args
            .libraries
            .as_deref()
            .map(parse_id_list)
            .unwrap_or_default(),
        allow_downloads: args.allow_downloads,
        allow_live_tv: args.allow_live_tv,
        allow_mobile_uploads: args.allow_mobile_uploads,
    }
}

fn build_email_request(args: EmailInvitationArgs, resolved: &Resolved) -> EmailInvitationRequest {
    let mut request = EmailInvitationRequest::new(build_request(&args.invitation), args.to);
    request.public_url = args
        .public_url
        .or_else(|| resolved.public_url().map(str::to_owned));
    request.subject = args.subject;
    request
}

/// Print what was created, then turn failures into errors.
fn report(outcome: &ActionOutcome, global: &GlobalOpts) -> Result<(), CliError> {
    if outcome.invitation().is_some() {
        let report = ActionReport::new(outcome);
        let out = output::render_single(global.output, &report, ActionReport::detail, |r| {
            r.url.unwrap_or_default().to_owned()
        })?;
        output::print_output(&out, global.quiet);
    }

    match outcome {
        ActionOutcome::Created(_) | ActionOutcome::Emailed { .. } => Ok(()),
        ActionOutcome::CreatedEmailFailed { reason, .. } => Err(CliError::ActionFailed {
            outcome: "created but not emailed".into(),
            reason: reason.clone(),
        }),
        ActionOutcome::ValidationFailed { reason } => Err(CliError::Validation {
            field: "invitation".into(),
            reason: reason.clone(),
        }),
        ActionOutcome::TransportFailed { error, .. } => Err(CliError::ActionFailed {
            outcome: "not created".into(),
            reason: error.to_string(),
        }),
    }
}

/// Invitations plus the user and library tables, fetched concurrently.
/// Lookup endpoints that fail only cost the labels.
async fn fetch_enriched(controller: &Controller) -> Result<Vec<EnrichedInvitation>, CliError> {
    let (invitations, users, libraries) = tokio::join!(
        controller.fetch_records(Endpoint::Invitations),
        controller.fetch_records(Endpoint::Users),
        controller.fetch_records(Endpoint::Libraries),
    );
    let invitations = invitations?;
    let users = lookup_records(Endpoint::Users, users);
    let libraries = lookup_records(Endpoint::Libraries, libraries);

    Ok(enrich_invitations(
        &invitations,
        &build_user_labels(&users),
        &build_library_labels(&libraries),
    ))
}

fn lookup_records(endpoint: Endpoint, result: Result<Vec<Record>, CoreError>) -> Vec<Record> {
    result.unwrap_or_else(|e| {
        warn!(%endpoint, error = %e, "labels unavailable, showing raw ids");
        Vec::new()
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: InvitationsArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InvitationsCommand::List => {
            let invitations = fetch_enriched(controller).await?;
            let out = output::render_list(
                global.output,
                &invitations,
                |i| InvitationRow::from(i),
                |i| i.record().id().map(|id| id.to_string()).unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InvitationsCommand::Create(create) => {
            let outcome = controller.create_invitation(&build_request(&create)).await;
            report(&outcome, global)
        }

        InvitationsCommand::Email(email) => {
            let request = build_email_request(email, resolved);
            // Reject bad input before touching mail settings or the network
            request.validate().map_err(CliError::from)?;

            let notifier = MailNotifier::new(&resolved.mail_settings()?).map_err(|e| {
                CliError::Notify {
                    message: e.to_string(),
                }
            })?;
            let outcome = controller
                .create_invitation_and_email(&request, &notifier)
                .await;
            report(&outcome, global)
        }

        InvitationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete invitation {id}?"), global.yes)? {
                return Ok(());
            }
            controller
                .delete_invitation(&id)
                .await
                .map_err(|e| match e {
                    CoreError::NotFound { message } => CliError::NotFound {
                        resource_type: "Invitation".into(),
                        message,
                        list_command: "invitations list".into(),
                    },
                    other => other.into(),
                })?;
            util::note(global.quiet, &format!("Invitation {id} deleted"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wizly_core::CreatedInvitation;

    use super::*;

    fn args(servers: &str) -> CreateInvitationArgs {
        CreateInvitationArgs {
            servers: servers.into(),
            expires_in_days: Some(7),
            duration: None,
            libraries: Some("3, x,4".into()),
            allow_downloads: Some(true),
            allow_live_tv: Some(false),
            allow_mobile_uploads: None,
        }
    }

    #[test]
    fn request_parses_id_lists() {
        let request = build_request(&args("1, 2,x"));
        assert_eq!(request.server_ids, vec![1, 2]);
        assert_eq!(request.library_ids, vec![3, 4]);
        assert_eq!(request.allow_downloads, Some(true));
        assert_eq!(request.allow_live_tv, Some(false));
        assert_eq!(request.allow_mobile_uploads, None);
        assert!(request.is_limited());
    }

    #[test]
    fn invitation_row_shows_resolved_labels() {
        let invitation = Record::from(json!({
            "id": 5, "code": "ABC", "status": "used",
            "used_by": "<User 1>", "specific_libraries": [10]
        }));
        let users = build_user_labels(&[json!({"id": 1, "username": "al"}).into()]);
        let libraries = build_library_labels(&[json!({"id": 10, "name": "Movies"}).into()]);
        let enriched = enrich_invitations(&[invitation], &users, &libraries);
        let row = InvitationRow::from(&enriched[0]);
        assert_eq!(row.used_by, "al");
        assert_eq!(row.libraries, "Movies");

        let bare = enrich_invitations(&[json!({"id": 6}).into()], &users, &libraries);
        assert_eq!(InvitationRow::from(&bare[0]).libraries, "all");
    }

    #[test]
    fn half_success_is_reported_then_fails() {
        let outcome = ActionOutcome::CreatedEmailFailed {
            invitation: CreatedInvitation::from_response(json!({"id": 9, "code": "Q"})),
            reason: "smtp down".into(),
        };
        let report = ActionReport::new(&outcome);
        assert_eq!(report.outcome, "created_email_failed");
        assert_eq!(report.code, Some("Q"));
        assert_eq!(report.error.as_deref(), Some("smtp down"));
    }
}
