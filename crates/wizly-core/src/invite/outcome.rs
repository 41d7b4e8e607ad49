// ── Invitation action results ──

use serde::Serialize;
use serde_json::Value;
use wizly_api::Endpoint;

use crate::error::CoreError;
use crate::model::{Record, RecordId};
use crate::normalize::normalize_value;

/// Best-effort view of the invitation a create call returned.
///
/// Wizarr wraps the created invitation differently across versions
/// (`{"invitation": {...}}`, `{"data": {...}}`, a one-element list, or
/// the bare object), so each field is optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedInvitation {
    pub id: Option<RecordId>,
    pub url: Option<String>,
    pub code: Option<String>,
    /// The full response body.
    pub response: Value,
}

impl CreatedInvitation {
    pub fn from_response(response: Value) -> Self {
        let record = locate_invitation(&response);
        let field = |key: &str| {
            record
                .as_ref()
                .and_then(|r| r.str_field(key))
                .map(str::to_owned)
        };
        Self {
            id: record.as_ref().and_then(Record::id),
            url: field("url"),
            code: field("code"),
            response,
        }
    }
}

fn locate_invitation(response: &Value) -> Option<Record> {
    for wrapper in ["invitation", "data"] {
        if let Some(inner @ Value::Object(_)) = response.get(wrapper) {
            return Some(Record::new(inner.clone()));
        }
    }
    normalize_value(Endpoint::Invitations, response)
        .into_iter()
        .next()
        .filter(|record| record.as_object().is_some())
        .or_else(|| response.is_object().then(|| Record::new(response.clone())))
}

/// How an invitation action ended. Actions never return `Err`; every
/// failure is one of these variants.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The invitation was created.
    Created(CreatedInvitation),
    /// The invitation was created and its link emailed.
    Emailed {
        invitation: CreatedInvitation,
        recipient: String,
    },
    /// The invitation exists on the server but no email went out.
    CreatedEmailFailed {
        invitation: CreatedInvitation,
        reason: String,
    },
    /// Input was rejected before any request was made.
    ValidationFailed { reason: String },
    /// The create call itself failed.
    TransportFailed { error: CoreError, payload: Value },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Emailed { .. })
    }

    pub fn invitation(&self) -> Option<&CreatedInvitation> {
        match self {
            Self::Created(invitation)
            | Self::Emailed { invitation, .. }
            | Self::CreatedEmailFailed { invitation, .. } => Some(invitation),
            Self::ValidationFailed { .. } | Self::TransportFailed { .. } => None,
        }
    }

    /// Short machine-readable label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Emailed { .. } => "emailed",
            Self::CreatedEmailFailed { .. } => "created_email_failed",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::TransportFailed { .. } => "transport_failed",
        }
    }

    /// Human-readable failure reason, if the action failed.
    pub fn failure(&self) -> Option<String> {
        match self {
            Self::Created(_) | Self::Emailed { .. } => None,
            Self::CreatedEmailFailed { reason, .. } | Self::ValidationFailed { reason } => {
                Some(reason.clone())
            }
            Self::TransportFailed { error, .. } => Some(error.to_string()),
        }
    }
}
