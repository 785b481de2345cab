//! `DirectoryService` backed by Microsoft Graph

use super::GraphClient;
use crate::directory::DirectoryService;
use crate::domain::{Group, Invitation, License, LicenseChange, Page, PageCursor, User, UserQuery};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl DirectoryService for GraphClient {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        GraphClient::get_user(self, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        GraphClient::find_user_by_email(self, email).await
    }

    async fn list_users_page(
        &self,
        query: &UserQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        GraphClient::list_users_page(self, query, cursor).await
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        GraphClient::create_user(self, user).await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        GraphClient::update_user(self, user).await
    }

    async fn enable_user(&self, id: &str) -> Result<()> {
        GraphClient::enable_user(self, id).await
    }

    async fn disable_user(&self, id: &str) -> Result<()> {
        GraphClient::disable_user(self, id).await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        GraphClient::delete_user(self, id).await
    }

    async fn associate_certificate_mfa(
        &self,
        user_id: &str,
        cert_id: &str,
        replace: bool,
    ) -> Result<()> {
        GraphClient::associate_certificate_mfa(self, user_id, cert_id, replace).await
    }

    async fn list_user_groups_page(
        &self,
        user_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Group>> {
        GraphClient::list_user_groups_page(self, user_id, cursor).await
    }

    async fn list_groups_page(&self, cursor: Option<PageCursor>) -> Result<Page<Group>> {
        GraphClient::list_groups_page(self, cursor).await
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        GraphClient::get_group(self, id).await
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        GraphClient::find_group_by_name(self, name).await
    }

    async fn create_group(&self, name: &str) -> Result<Group> {
        GraphClient::create_group(self, name).await
    }

    async fn rename_group(&self, id: &str, name: &str) -> Result<()> {
        GraphClient::rename_group(self, id, name).await
    }

    async fn delete_group(&self, id: &str) -> Result<()> {
        GraphClient::delete_group(self, id).await
    }

    async fn list_group_members_page(
        &self,
        group_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        GraphClient::list_group_members_page(self, group_id, cursor).await
    }

    async fn add_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        GraphClient::add_group_members(self, group_id, user_ids).await
    }

    async fn remove_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        GraphClient::remove_group_members(self, group_id, user_ids).await
    }

    async fn list_licenses(&self) -> Result<Vec<License>> {
        GraphClient::list_licenses(self).await
    }

    async fn get_user_licenses(&self, user_id: &str) -> Result<Option<Vec<Uuid>>> {
        GraphClient::get_user_licenses(self, user_id).await
    }

    async fn assign_licenses(&self, user_id: &str, change: &LicenseChange) -> Result<()> {
        GraphClient::assign_licenses(self, user_id, change).await
    }

    async fn list_license_users_page(
        &self,
        sku: Uuid,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        GraphClient::list_license_users_page(self, sku, cursor).await
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<()> {
        GraphClient::create_invitation(self, invitation).await
    }
}
