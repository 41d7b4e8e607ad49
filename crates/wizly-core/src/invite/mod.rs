// ── Invitation actions ──
//
// Input types, validation and result types for the two on-demand
// actions. The actions themselves run on `Controller`.

pub mod outcome;
pub mod parse;
pub mod requests;

pub use outcome::{ActionOutcome, CreatedInvitation};
pub use parse::{is_valid_email, parse_id_list};
pub use requests::{
    CreateInvitationRequest, EmailInvitationRequest, InvitationPayload, rewrite_public_url,
};
