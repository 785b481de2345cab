//! The directory port: every operation the generic managers need from an
//! identity provider. Provider-specific code lives behind this trait.

mod pager;

pub use pager::paginate;

use crate::domain::{Group, Invitation, License, LicenseChange, Page, PageCursor, User, UserQuery};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Directory service operations.
///
/// Lookups return `Ok(None)` when the object does not exist. List operations
/// are exposed page by page; [`paginate`] turns them into a lazy stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryService: Send + Sync {
    // Users
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users_page(
        &self,
        query: &UserQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>>;
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn update_user(&self, user: &User) -> Result<()>;
    async fn enable_user(&self, id: &str) -> Result<()>;
    async fn disable_user(&self, id: &str) -> Result<()>;
    async fn delete_user(&self, id: &str) -> Result<()>;
    async fn associate_certificate_mfa(
        &self,
        user_id: &str,
        cert_id: &str,
        replace: bool,
    ) -> Result<()>;
    async fn list_user_groups_page(
        &self,
        user_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Group>>;

    // Groups
    async fn list_groups_page(&self, cursor: Option<PageCursor>) -> Result<Page<Group>>;
    async fn get_group(&self, id: &str) -> Result<Option<Group>>;
    /// First group with this display name. Names are not unique.
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>>;
    async fn create_group(&self, name: &str) -> Result<Group>;
    async fn rename_group(&self, id: &str, name: &str) -> Result<()>;
    async fn delete_group(&self, id: &str) -> Result<()>;
    async fn list_group_members_page(
        &self,
        group_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>>;
    /// Adds each user independently; failures are returned together.
    async fn add_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()>;
    /// Removes each user independently; failures are returned together.
    async fn remove_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()>;

    // Licenses
    async fn list_licenses(&self) -> Result<Vec<License>>;
    async fn get_user_licenses(&self, user_id: &str) -> Result<Option<Vec<Uuid>>>;
    async fn assign_licenses(&self, user_id: &str, change: &LicenseChange) -> Result<()>;
    async fn list_license_users_page(
        &self,
        sku: Uuid,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>>;

    // Invitations
    async fn create_invitation(&self, invitation: &Invitation) -> Result<()>;
}
