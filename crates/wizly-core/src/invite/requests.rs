// ── Invitation request types ──
//
// Caller-facing inputs for the two invitation actions, plus the wire
// payload POSTed to `/invitations`.

use serde::Serialize;

use super::parse::is_valid_email;
use crate::error::CoreError;

/// Inputs for creating an invitation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInvitationRequest {
    /// Servers the invitation grants access to. Must be non-empty and
    /// positive.
    pub server_ids: Vec<i64>,
    pub expires_in_days: Option<u32>,
    /// Account duration (e.g. `"30"`). Absent or empty means unlimited.
    pub duration: Option<String>,
    /// Restrict access to these libraries. Empty means all libraries.
    pub library_ids: Vec<i64>,
    pub allow_downloads: Option<bool>,
    pub allow_live_tv: Option<bool>,
    pub allow_mobile_uploads: Option<bool>,
}

/// JSON body of `POST /invitations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationPayload {
    pub server_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlimited: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub library_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_downloads: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_live_tv: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_mobile_uploads: Option<bool>,
}

impl CreateInvitationRequest {
    pub fn new(server_ids: Vec<i64>) -> Self {
        Self {
            server_ids,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server_ids.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "no valid server IDs provided".into(),
            });
        }
        if let Some(bad) = self.server_ids.iter().find(|id| **id <= 0) {
            return Err(CoreError::ValidationFailed {
                message: format!("server ID must be positive (got {bad})"),
            });
        }
        if self.expires_in_days == Some(0) {
            return Err(CoreError::ValidationFailed {
                message: "expires_in_days must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Whether the invitation restricts library access.
    pub fn is_limited(&self) -> bool {
        !self.library_ids.is_empty()
    }

    /// Build the wire payload. A missing or blank duration marks the
    /// invitation unlimited.
    pub fn payload(&self) -> InvitationPayload {
        let duration = self
            .duration
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        let unlimited = duration.is_none().then_some(true);
        InvitationPayload {
            server_ids: self.server_ids.clone(),
            expires_in_days: self.expires_in_days,
            duration,
            unlimited,
            library_ids: self.library_ids.clone(),
            allow_downloads: self.allow_downloads,
            allow_live_tv: self.allow_live_tv,
            allow_mobile_uploads: self.allow_mobile_uploads,
        }
    }
}

/// Inputs for creating an invitation and emailing its link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailInvitationRequest {
    pub invitation: CreateInvitationRequest,
    pub recipient: String,
    /// Public base URL to graft the invitation path onto, for servers
    /// that report an internal address.
    pub public_url: Option<String>,
    /// Subject line; defaults to [`DEFAULT_SUBJECT`](crate::notify::DEFAULT_SUBJECT).
    pub subject: Option<String>,
}

impl EmailInvitationRequest {
    pub fn new(invitation: CreateInvitationRequest, recipient: impl Into<String>) -> Self {
        Self {
            invitation,
            recipient: recipient.into(),
            public_url: None,
            subject: None,
        }
    }

    /// Validate the recipient first, then the invitation fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !is_valid_email(&self.recipient) {
            return Err(CoreError::ValidationFailed {
                message: format!("invalid email format: {}", self.recipient),
            });
        }
        self.invitation.validate()
    }
}

/// Graft `url`'s path and query onto `public_url`.
///
/// `http://192.168.1.29:5690/j/ABC?x=1` with `https://media.example.com/`
/// becomes `https://media.example.com/j/ABC?x=1`. A relative invitation
/// URL such as `/j/ABC` is grafted the same way.
pub fn rewrite_public_url(url: &str, public_url: &str) -> String {
    let parsed = url::Url::parse(url).or_else(|_| {
        url::Url::parse("http://localhost/").and_then(|base| base.join(url))
    });
    let Ok(parsed) = parsed else {
        return url.to_owned();
    };
    let mut rewritten = format!("{}{}", public_url.trim_end_matches('/'), parsed.path());
    if let Some(query) = parsed.query() {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    rewritten
}
