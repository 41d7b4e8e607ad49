//! Data reconciliation layer between `wizly-api` and the `wizly` CLI.
//!
//! Wizarr answers its read endpoints in several JSON shapes depending on
//! version. This crate turns those payloads into a stable model and
//! derives human-readable summaries from it:
//!
//! - **[`Controller`]**: context object owning the [`WizarrClient`], the
//!   current [`Snapshot`] and the [`RefreshStatus`]. [`refresh()`](Controller::refresh)
//!   runs one cycle; [`start()`](Controller::start) keeps refreshing on an
//!   interval. It also hosts the invitation actions, which report an
//!   [`ActionOutcome`] instead of failing.
//!
//! - **Refresh aggregator** ([`store::refresh`]): fans out all six reads
//!   concurrently and folds each result into the snapshot, marking failed
//!   endpoints [`EndpointState::Unavailable`] without failing the cycle.
//!
//! - **Normalizer** ([`normalize()`]): [`RawPayload`] → ordered
//!   `Vec<Record>`, total over any JSON input.
//!
//! - **Resolver** ([`resolve`]): id → label tables for users and
//!   libraries, applied to invitation copies.
//!
//! - **Views** ([`view`]): per-endpoint counts and group-by histograms.
//!
//! - **Notifier** ([`notify`]): the email seam, with a lettre-backed
//!   [`MailNotifier`].
//!
//! [`WizarrClient`]: wizly_api::WizarrClient

pub mod config;
pub mod controller;
pub mod error;
pub mod invite;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod resolve;
pub mod store;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    ClientConfig, DEFAULT_REFRESH_INTERVAL, DEFAULT_TIMEOUT, MIN_REFRESH_INTERVAL,
    TlsVerification,
};
pub use controller::{Controller, RefreshStatus, VerifyError};
pub use error::CoreError;
pub use invite::{
    ActionOutcome, CreateInvitationRequest, CreatedInvitation, EmailInvitationRequest,
    is_valid_email, parse_id_list,
};
pub use model::{RawPayload, Record, RecordId};
pub use normalize::normalize;
pub use notify::{InvitationEmail, MailNotifier, MailSettings, Notifier, NotifyError, SmtpSettings};
pub use resolve::{
    EnrichedInvitation, LookupTable, build_library_labels, build_user_labels, enrich_invitations,
};
pub use store::{EndpointFetcher, EndpointState, Snapshot};
pub use view::{DerivedView, ViewState, build_view, build_views};

pub use wizly_api::Endpoint;
