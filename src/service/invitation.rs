//! Guest invitations

use crate::directory::DirectoryService;
use crate::domain::{Invitation, User};
use crate::error::Result;
use std::sync::Arc;
use validator::Validate;

pub struct InviteManager<D: DirectoryService + ?Sized> {
    directory: Arc<D>,
}

impl<D: DirectoryService + ?Sized + 'static> InviteManager<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    pub async fn create_invitation(&self, invitation: &Invitation) -> Result<()> {
        invitation.validate()?;
        self.directory.create_invitation(invitation).await
    }

    /// Invite `user` by their mail address and display name.
    pub async fn invite_user(
        &self,
        user: &User,
        send_email: bool,
        redirect_url: &str,
    ) -> Result<()> {
        let invitation = Invitation {
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            redirect_url: redirect_url.to_string(),
            send_email,
        };
        self.create_invitation(&invitation).await
    }
}
