use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InvitationCreate {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InvitationAccept {
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub(crate) token: String,
}

/// `shared` is true when the address already had an account and a direct
/// share was created instead of a token invitation.
#[derive(Debug, Serialize)]
pub(crate) struct InvitationOutcome {
    pub(crate) presentation_id: String,
    pub(crate) email: String,
    pub(crate) shared: bool,
    pub(crate) invitation_id: Option<String>,
}
