//! Guest invitations

use super::types::InvitationBody;
use super::GraphClient;
use crate::domain::Invitation;
use crate::error::Result;
use validator::Validate;

impl GraphClient {
    /// Invite an external user. The invitation is not tracked afterwards.
    pub async fn create_invitation(&self, invitation: &Invitation) -> Result<()> {
        invitation.validate()?;

        let body = InvitationBody {
            invited_user_email_address: invitation.email.clone(),
            invited_user_display_name: invitation.display_name.clone(),
            invite_redirect_url: invitation.redirect_url.clone(),
            send_invitation_message: invitation.send_email,
        };

        let url = self.endpoint(&["invitations"])?;
        self.send(self.http_client.post(url).json(&body), "create_invitation")
            .await?;

        tracing::info!(
            email = %invitation.email,
            send_email = invitation.send_email,
            "Created invitation"
        );
        Ok(())
    }
}
