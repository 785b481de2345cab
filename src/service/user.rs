//! User management

use crate::directory::{paginate, DirectoryService};
use crate::domain::{Group, User, UserQuery};
use crate::error::{DirectoryError, Result};
use futures::stream::BoxStream;
use std::sync::Arc;

pub struct UserManager<D: DirectoryService + ?Sized> {
    directory: Arc<D>,
}

impl<D: DirectoryService + ?Sized + 'static> UserManager<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// `Ok(None)` when no user has this id or UPN.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.directory.get_user(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.directory.find_user_by_email(email).await
    }

    pub async fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(self.directory.get_user(name).await?.is_some())
    }

    /// All users matching `query`, fetched page by page as the stream is read.
    pub fn list_users(&self, query: UserQuery) -> BoxStream<'static, Result<User>> {
        let directory = Arc::clone(&self.directory);
        paginate(move |cursor| {
            let directory = Arc::clone(&directory);
            let query = query.clone();
            async move { directory.list_users_page(&query, cursor).await }
        })
    }

    /// Create a user. Accounts stay disabled unless `user.enabled` is set.
    pub async fn create_user(&self, user: &User) -> Result<User> {
        if user.upn.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "user principal name is required".to_string(),
            ));
        }
        if user.display_name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "display name is required".to_string(),
            ));
        }

        self.directory.create_user(user).await
    }

    pub async fn update_user(&self, user: &User) -> Result<()> {
        self.directory.update_user(user).await
    }

    pub async fn enable_user(&self, id: &str) -> Result<()> {
        self.directory.enable_user(id).await
    }

    pub async fn disable_user(&self, id: &str) -> Result<()> {
        self.directory.disable_user(id).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.directory.delete_user(id).await
    }

    /// Bind a certificate as the user's second factor, replacing or adding to
    /// existing bindings.
    pub async fn associate_certificate_mfa(
        &self,
        user_id: &str,
        cert_id: &str,
        replace: bool,
    ) -> Result<()> {
        self.directory
            .associate_certificate_mfa(user_id, cert_id, replace)
            .await
    }

    /// Groups the user is a direct member of
    pub fn get_user_groups(&self, user_id: &str) -> BoxStream<'static, Result<Group>> {
        let directory = Arc::clone(&self.directory);
        let user_id = user_id.to_string();
        paginate(move |cursor| {
            let directory = Arc::clone(&directory);
            let user_id = user_id.clone();
            async move { directory.list_user_groups_page(&user_id, cursor).await }
        })
    }
}
