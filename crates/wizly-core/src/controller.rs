// ── Controller ──
//
// The context object every consumer goes through. Owns the HTTP client,
// the current snapshot and the refresh bookkeeping, runs the periodic
// refresh task, and hosts the on-demand invitation actions.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wizly_api::{Endpoint, WizarrClient};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::invite::{
    ActionOutcome, CreateInvitationRequest, CreatedInvitation, EmailInvitationRequest,
    rewrite_public_url,
};
use crate::model::Record;
use crate::normalize::normalize_value;
use crate::notify::{DEFAULT_SUBJECT, InvitationEmail, Notifier};
use crate::store::{Snapshot, refresh};
use crate::view::{DerivedView, build_views};

/// Consecutive all-endpoints-down cycles before logging at error level.
const ESCALATE_AFTER: u32 = 3;

const FALLBACK_SERVER_NAME: &str = "our media";
const FALLBACK_SERVER_TYPE: &str = "server";

// ── RefreshStatus ────────────────────────────────────────────────

/// Bookkeeping across refresh cycles.
///
/// A cycle succeeds when at least one endpoint answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl RefreshStatus {
    /// `true` once a cycle has succeeded and the latest one did.
    pub fn is_available(&self) -> bool {
        self.last_success.is_some() && self.consecutive_failures == 0
    }

    fn record(&mut self, snapshot: &Snapshot) {
        let at = snapshot.fetched_at();
        self.last_attempt = Some(at);
        if snapshot.any_available() {
            self.last_success = Some(at);
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
    }
}

/// Why a credential check failed.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Cannot connect to Wizarr: {reason}")]
    CannotConnect { reason: String },

    #[error("Wizarr rejected the API key")]
    InvalidAuth,
}

// ── Controller ───────────────────────────────────────────────────

/// Handle to one Wizarr server.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    client: WizarrClient,
    current: ArcSwapOption<Snapshot>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    status_tx: watch::Sender<RefreshStatus>,
    /// Held for the whole of a cycle so two never overlap.
    cycle: Mutex<()>,
    /// The periodic task and its shutdown token, swapped as one unit.
    scheduler: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Controller {
    /// Validate `config` and build the HTTP client. Does not touch the
    /// network.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client =
            WizarrClient::from_api_key(config.url.as_str(), &config.api_key, &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (caller manages auth headers).
    pub fn with_client(config: ClientConfig, client: WizarrClient) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(RefreshStatus::default());
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                current: ArcSwapOption::empty(),
                snapshot_tx,
                status_tx,
                cycle: Mutex::new(()),
                scheduler: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &WizarrClient {
        &self.inner.client
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one refresh cycle and publish its snapshot.
    ///
    /// Waits for any cycle already in flight to finish first.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let _cycle = self.inner.cycle.lock().await;

        let snapshot = Arc::new(refresh(&self.inner.client).await);

        self.inner.status_tx.send_modify(|status| status.record(&snapshot));
        let failures = self.inner.status_tx.borrow().consecutive_failures;
        if failures >= ESCALATE_AFTER {
            error!(
                consecutive_failures = failures,
                "Wizarr unreachable on every endpoint"
            );
        } else if failures > 0 {
            warn!(consecutive_failures = failures, "refresh cycle failed on every endpoint");
        }

        self.inner.current.store(Some(Arc::clone(&snapshot)));
        self.inner.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// The latest published snapshot, if any cycle has run.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.current.load_full()
    }

    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn refresh_status(&self) -> RefreshStatus {
        self.inner.status_tx.borrow().clone()
    }

    pub fn status_updates(&self) -> watch::Receiver<RefreshStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Derived views of the latest snapshot.
    pub fn views(&self) -> Option<Vec<DerivedView>> {
        self.snapshot().map(|snapshot| build_views(&snapshot))
    }

    /// Fetch and normalize a single endpoint outside the refresh cycle.
    pub async fn fetch_records(&self, endpoint: Endpoint) -> Result<Vec<Record>, CoreError> {
        let value = self.inner.client.fetch(endpoint).await?;
        Ok(normalize_value(endpoint, &value))
    }

    // ── Scheduler ────────────────────────────────────────────────

    /// Run an initial refresh, then keep refreshing every
    /// `config.refresh_interval` until [`stop()`](Self::stop).
    ///
    /// Calling `start` on a running controller only refreshes. The task is
    /// registered before the initial refresh, so a `stop()` issued while
    /// that refresh is in flight still shuts it down.
    pub async fn start(&self) -> Arc<Snapshot> {
        {
            let mut scheduler = self.inner.scheduler.lock().await;
            if scheduler.is_none() {
                let cancel = CancellationToken::new();
                let period = self.inner.config.refresh_interval;
                let handle = tokio::spawn(refresh_task(self.clone(), period, cancel.clone()));
                *scheduler = Some((cancel, handle));
                info!(interval_secs = period.as_secs(), "periodic refresh started");
            }
        }
        self.refresh().await
    }

    /// Stop the periodic refresh and wait for it to wind down. A cycle in
    /// flight runs to completion first.
    pub async fn stop(&self) {
        let scheduler = self.inner.scheduler.lock().await.take();
        if let Some((cancel, handle)) = scheduler {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
            debug!("periodic refresh stopped");
        }
    }

    /// `true` between [`start()`](Self::start) and [`stop()`](Self::stop).
    pub async fn is_running(&self) -> bool {
        self.inner.scheduler.lock().await.is_some()
    }

    // ── Credential check ─────────────────────────────────────────

    /// Probe `/status` to confirm the URL and API key.
    pub async fn verify(&self) -> Result<(), VerifyError> {
        match self.inner.client.get_status().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth() => Err(VerifyError::InvalidAuth),
            Err(e) => Err(VerifyError::CannotConnect {
                reason: e.to_string(),
            }),
        }
    }

    // ── Mutations ────────────────────────────────────────────────
    //
    // Effects show up in views only after the next refresh.

    pub async fn delete_invitation(&self, invitation_id: &str) -> Result<Value, CoreError> {
        let response = self.inner.client.delete_invitation(invitation_id).await?;
        info!(invitation_id, "invitation deleted");
        Ok(response)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Value, CoreError> {
        let response = self.inner.client.delete_user(user_id).await?;
        info!(user_id, "user deleted");
        Ok(response)
    }

    pub async fn extend_user(&self, user_id: &str, extension: &Value) -> Result<Value, CoreError> {
        let response = self.inner.client.extend_user(user_id, extension).await?;
        info!(user_id, "user access extended");
        Ok(response)
    }

    // ── Invitation actions ───────────────────────────────────────

    /// Create an invitation. Failures are logged and returned as an
    /// outcome, never as `Err`.
    pub async fn create_invitation(&self, request: &CreateInvitationRequest) -> ActionOutcome {
        if let Err(e) = request.validate() {
            error!(error = %e, "invitation not created");
            return ActionOutcome::ValidationFailed {
                reason: e.to_string(),
            };
        }
        match self.submit_invitation(request).await {
            Ok(created) => {
                info!(
                    id = ?created.id,
                    code = created.code.as_deref().unwrap_or("-"),
                    "invitation created"
                );
                ActionOutcome::Created(created)
            }
            Err(outcome) => outcome,
        }
    }

    /// Create an invitation and email its link to the recipient.
    ///
    /// Validation happens before any request. If the invitation is created
    /// but cannot be emailed the outcome says so, since the invitation
    /// already exists on the server.
    pub async fn create_invitation_and_email<N: Notifier>(
        &self,
        request: &EmailInvitationRequest,
        notifier: &N,
    ) -> ActionOutcome {
        if let Err(e) = request.validate() {
            error!(error = %e, recipient = %request.recipient, "invitation email not sent");
            return ActionOutcome::ValidationFailed {
                reason: e.to_string(),
            };
        }

        let invitation = match self.submit_invitation(&request.invitation).await {
            Ok(created) => created,
            Err(outcome) => return outcome,
        };

        let Some(raw_url) = invitation.url.clone() else {
            error!(response = %invitation.response, "no invitation URL in create response");
            return ActionOutcome::CreatedEmailFailed {
                invitation,
                reason: "no invitation URL in create response".into(),
            };
        };
        let invitation_url = match &request.public_url {
            Some(public) => {
                let rewritten = rewrite_public_url(&raw_url, public);
                info!(url = %rewritten, "using public invitation URL");
                rewritten
            }
            None => raw_url,
        };

        let (server_name, server_type) = self
            .display_server(&request.invitation.server_ids)
            .await;

        let email = InvitationEmail {
            recipient: request.recipient.clone(),
            subject: request
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned()),
            server_name,
            server_type,
            invitation_url,
            expires_in_days: request.invitation.expires_in_days,
            limited: request.invitation.is_limited(),
        };

        match notifier.send(&email).await {
            Ok(()) => {
                info!(recipient = %email.recipient, "invitation email sent");
                ActionOutcome::Emailed {
                    invitation,
                    recipient: email.recipient,
                }
            }
            Err(e) => {
                error!(
                    error = %e,
                    recipient = %email.recipient,
                    payload = ?request.invitation.payload(),
                    "failed to send invitation email"
                );
                ActionOutcome::CreatedEmailFailed {
                    invitation,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// POST the invitation; on failure, the finished outcome.
    async fn submit_invitation(
        &self,
        request: &CreateInvitationRequest,
    ) -> Result<CreatedInvitation, ActionOutcome> {
        let payload = request.payload();
        match self.inner.client.create_invitation(&payload).await {
            Ok(response) => {
                debug!(%response, "create invitation response");
                Ok(CreatedInvitation::from_response(response))
            }
            Err(e) => {
                error!(error = %e, ?payload, "failed to create invitation");
                Err(ActionOutcome::TransportFailed {
                    error: e.into(),
                    payload: serde_json::to_value(&payload).unwrap_or(Value::Null),
                })
            }
        }
    }

    /// Name and title-cased type of the first server in `server_ids`, or
    /// the generic fallbacks when the lookup fails.
    async fn display_server(&self, server_ids: &[i64]) -> (String, String) {
        let fallback = || {
            (
                FALLBACK_SERVER_NAME.to_owned(),
                FALLBACK_SERVER_TYPE.to_owned(),
            )
        };
        let servers = match self.inner.client.get_servers().await {
            Ok(value) => normalize_value(Endpoint::Servers, &value),
            Err(e) => {
                warn!(error = %e, "could not fetch server details");
                return fallback();
            }
        };
        let Some(server) = servers.iter().find(|server| {
            server
                .id()
                .and_then(|id| id.as_int())
                .is_some_and(|id| server_ids.contains(&id))
        }) else {
            return fallback();
        };
        (
            server
                .str_field("name")
                .unwrap_or(FALLBACK_SERVER_NAME)
                .to_owned(),
            server
                .str_field("server_type")
                .map_or_else(|| FALLBACK_SERVER_TYPE.to_owned(), title_case),
        )
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh until cancelled. Missed ticks are skipped, so a
/// slow cycle never triggers a burst of catch-up cycles.
async fn refresh_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                controller.refresh().await;
            }
        }
    }
}

/// `"jellyfin"` → `"Jellyfin"`, `"emby-server"` → `"Emby-Server"`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
