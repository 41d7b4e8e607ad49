// ── Notification sender ──
//
// `Notifier` is the seam between the invitation workflow and whatever
// delivers the message. `MailNotifier` is the default, built on lettre.

mod mail;
mod template;

use std::future::Future;

use thiserror::Error;

pub use mail::{MailNotifier, MailSettings, SmtpSettings};

/// Subject used when the caller does not supply one.
pub const DEFAULT_SUBJECT: &str = "Your Wizarr Invitation";

/// Everything needed to render and address one invitation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationEmail {
    pub recipient: String,
    pub subject: String,
    pub server_name: String,
    pub server_type: String,
    pub invitation_url: String,
    pub expires_in_days: Option<u32>,
    /// Access restricted to specific libraries.
    pub limited: bool,
}

impl InvitationEmail {
    /// `"7 days"`, or `"Never"` for invitations without expiry.
    pub fn expiry_text(&self) -> String {
        match self.expires_in_days {
            Some(days) => format!("{days} days"),
            None => "Never".to_owned(),
        }
    }

    pub fn access_level(&self) -> &'static str {
        if self.limited {
            "Limited"
        } else {
            "Full Library Access"
        }
    }

    pub fn plain_body(&self) -> Result<String, NotifyError> {
        template::plain(self)
    }

    pub fn html_body(&self) -> Result<String, NotifyError> {
        template::html(self)
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("failed to deliver message: {0}")]
    Delivery(String),

    #[error("mail transport setup failed: {0}")]
    Setup(String),
}

/// Delivers invitation emails. Failures are reported, never retried.
pub trait Notifier: Sync {
    fn send(&self, email: &InvitationEmail) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email() -> InvitationEmail {
        InvitationEmail {
            recipient: "viewer@example.com".into(),
            subject: DEFAULT_SUBJECT.into(),
            server_name: "Basement".into(),
            server_type: "Plex".into(),
            invitation_url: "https://media.example.com/j/ABC123".into(),
            expires_in_days: Some(7),
            limited: false,
        }
    }

    #[test]
    fn expiry_and_access_wording() {
        let mut e = email();
        assert_eq!(e.expiry_text(), "7 days");
        assert_eq!(e.access_level(), "Full Library Access");
        e.expires_in_days = None;
        e.limited = true;
        assert_eq!(e.expiry_text(), "Never");
        assert_eq!(e.access_level(), "Limited");
    }

    #[test]
    fn bodies_mention_the_invitation() {
        let e = email();
        let plain = e.plain_body().unwrap();
        assert!(plain.contains("join the Basement Plex server"));
        assert!(plain.contains("https://media.example.com/j/ABC123"));
        assert!(plain.contains("- Expires: 7 days"));
        assert!(plain.contains("- Access Level: Full Library Access"));

        let html = e.html_body().unwrap();
        assert!(html.contains(r#"href="https://media.example.com/j/ABC123""#));
        assert!(html.contains("Basement (Plex)"));
    }
}
