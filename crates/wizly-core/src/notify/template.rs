use askama::Template;

use super::{InvitationEmail, NotifyError};

// The `.html` template escapes every field, the `.txt` one does not.

#[derive(Template)]
#[template(path = "invitation.txt")]
struct PlainBody<'a> {
    email: &'a InvitationEmail,
}

#[derive(Template)]
#[template(path = "invitation.html")]
struct HtmlBody<'a> {
    email: &'a InvitationEmail,
}

pub(super) fn plain(email: &InvitationEmail) -> Result<String, NotifyError> {
    PlainBody { email }
        .render()
        .map_err(|e| NotifyError::Message(e.to_string()))
}

pub(super) fn html(email: &InvitationEmail) -> Result<String, NotifyError> {
    HtmlBody { email }
        .render()
        .map_err(|e| NotifyError::Message(e.to_string()))
}
