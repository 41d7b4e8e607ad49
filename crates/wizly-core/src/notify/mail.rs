// ── lettre-backed mail delivery ──
//
// SMTP with STARTTLS for real delivery, or a file transport that drops
// `.eml` files into a directory for local testing.

use std::path::PathBuf;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::{InvitationEmail, Notifier, NotifyError};

/// SMTP server connection settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender address; defaults to `username`.
    pub from: Option<String>,
    /// Upgrade the connection with STARTTLS (on by default).
    pub starttls: bool,
}

impl SmtpSettings {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

/// Where outgoing mail goes.
#[derive(Debug, Clone)]
pub enum MailSettings {
    Smtp(SmtpSettings),
    /// Write each message to `dir` as an `.eml` file.
    File { dir: PathBuf, from: String },
}

enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

/// [`Notifier`] that sends multipart (plain text + HTML) email.
pub struct MailNotifier {
    transport: MailTransport,
    from: String,
}

impl MailNotifier {
    pub fn new(settings: &MailSettings) -> Result<Self, NotifyError> {
        match settings {
            MailSettings::Smtp(smtp) => {
                if !smtp.starttls {
                    warn!(host = %smtp.host, "SMTP STARTTLS is disabled, credentials travel in clear text");
                }
                let builder = if smtp.starttls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                        .map_err(|e| NotifyError::Setup(e.to_string()))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                };
                let transport = builder
                    .port(smtp.port)
                    .credentials(Credentials::new(
                        smtp.username.clone(),
                        smtp.password.expose_secret().to_owned(),
                    ))
                    .build();
                Ok(Self {
                    transport: MailTransport::Smtp(transport),
                    from: smtp.sender().to_owned(),
                })
            }
            MailSettings::File { dir, from } => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    NotifyError::Setup(format!("cannot create {}: {e}", dir.display()))
                })?;
                Ok(Self {
                    transport: MailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir)),
                    from: from.clone(),
                })
            }
        }
    }

    fn build_message(&self, email: &InvitationEmail) -> Result<Message, NotifyError> {
        let from = parse_mailbox(&self.from)?;
        let to = parse_mailbox(&email.recipient)?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                email.plain_body()?,
                email.html_body()?,
            ))
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

impl Notifier for MailNotifier {
    async fn send(&self, email: &InvitationEmail) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        match &self.transport {
            MailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| NotifyError::Delivery(e.to_string()))?;
            }
            MailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| NotifyError::Delivery(e.to_string()))?;
            }
        }
        debug!(recipient = %email.recipient, "invitation email handed to transport");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::DEFAULT_SUBJECT;

    fn email() -> InvitationEmail {
        InvitationEmail {
            recipient: "viewer@example.com".into(),
            subject: DEFAULT_SUBJECT.into(),
            server_name: "Basement".into(),
            server_type: "Jellyfin".into(),
            invitation_url: "https://media.example.com/j/ABC123".into(),
            expires_in_days: None,
            limited: true,
        }
    }

    #[tokio::test]
    async fn file_transport_writes_an_eml() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = MailNotifier::new(&MailSettings::File {
            dir: dir.path().to_path_buf(),
            from: "wizarr@example.com".into(),
        })
        .unwrap();

        notifier.send(&email()).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "eml"))
            .collect();
        assert_eq!(files.len(), 1);
        let raw = std::fs::read_to_string(&files[0]).unwrap();
        assert!(raw.contains("To: viewer@example.com"));
        assert!(raw.contains("Subject: Your Wizarr Invitation"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn bad_sender_is_an_address_error() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = MailNotifier::new(&MailSettings::File {
            dir: dir.path().to_path_buf(),
            from: "not an address".into(),
        })
        .unwrap();
        let err = notifier.send(&email()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Address { .. }));
    }

    #[test]
    fn sender_defaults_to_username() {
        let smtp = SmtpSettings {
            host: "smtp.example.com".into(),
            port: 587,
            username: "wizarr@example.com".into(),
            password: SecretString::from("hunter2".to_owned()),
            from: None,
            starttls: true,
        };
        assert_eq!(smtp.sender(), "wizarr@example.com");
    }
}
