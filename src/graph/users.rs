//! User operations

use super::convert::{
    certificate_user_id, group_from_graph, odata_quote, user_from_graph, user_patch, user_to_graph,
};
use super::types::{GraphGroup, GraphUser, UserAuthorization};
use super::GraphClient;
use crate::domain::{Group, Page, PageCursor, User, UserQuery};
use crate::error::{DirectoryError, Result};
use serde_json::json;

impl GraphClient {
    fn user_select(&self) -> (&'static str, String) {
        ("$select", self.config.select_fields.join(","))
    }

    /// Get a user by object id or UPN
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        tracing::debug!(user_id = %id, "Fetching user");
        let url = self.endpoint(&["users", id])?;
        let user: Option<GraphUser> = self
            .get_optional(url, &[self.user_select()], "get_user")
            .await?;
        Ok(user.map(user_from_graph))
    }

    /// First user whose `mail` matches.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = vec![
            self.user_select(),
            ("$filter", format!("mail eq {}", odata_quote(email))),
            ("$count", "true".to_string()),
        ];
        let page: Page<GraphUser> = self
            .fetch_page(self.endpoint(&["users"])?, query, None, true, "find_user_by_email")
            .await?;
        Ok(page.items.into_iter().next().map(user_from_graph))
    }

    /// One page of users. Filtered listings are sent as advanced queries.
    pub async fn list_users_page(
        &self,
        query: &UserQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        let mut params = vec![self.user_select()];
        let eventual = match &query.filter {
            Some(filter) => {
                params.push(("$filter", filter.clone()));
                params.push(("$count", "true".to_string()));
                true
            }
            None => false,
        };

        let page: Page<GraphUser> = self
            .fetch_page(self.endpoint(&["users"])?, params, cursor, eventual, "list_users")
            .await?;
        Ok(page.filter_map(|user| Some(user_from_graph(user))))
    }

    /// Create a user and return it as the server stored it.
    pub async fn create_user(&self, user: &User) -> Result<User> {
        let url = self.endpoint(&["users"])?;
        let request = self.http_client.post(url).json(&user_to_graph(user));
        let created: GraphUser = self.send(request, "create_user").await?.json().await?;
        let created = user_from_graph(created);

        tracing::info!(user_id = %created.id, upn = %created.upn, "Created user");
        Ok(created)
    }

    /// PATCH the profile fields of an existing user.
    pub async fn update_user(&self, user: &User) -> Result<()> {
        if user.id.is_empty() {
            return Err(DirectoryError::Validation(
                "user id is required for update".to_string(),
            ));
        }

        let url = self.endpoint(&["users", user.id.as_str()])?;
        let request = self.http_client.patch(url).json(&user_patch(user));
        self.send(request, "update_user").await?;

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(())
    }

    pub async fn enable_user(&self, id: &str) -> Result<()> {
        self.set_account_enabled(id, true).await
    }

    pub async fn disable_user(&self, id: &str) -> Result<()> {
        self.set_account_enabled(id, false).await
    }

    /// Partial update touching only `accountEnabled`.
    async fn set_account_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let operation = if enabled { "enable_user" } else { "disable_user" };
        let url = self.endpoint(&["users", id])?;
        let request = self
            .http_client
            .patch(url)
            .json(&json!({ "accountEnabled": enabled }));
        self.send(request, operation).await?;

        tracing::info!(user_id = %id, enabled, "Changed account state");
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["users", id])?;
        self.send(self.http_client.delete(url), "delete_user").await?;

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Bind a certificate to the user for certificate-based MFA.
    ///
    /// The id is stored in `authorizationInfo.certificateUserIds` with the
    /// `X509:<PN>` prefix. `replace` drops any existing bindings; otherwise the
    /// id is appended unless it is already bound.
    pub async fn associate_certificate_mfa(
        &self,
        user_id: &str,
        cert_id: &str,
        replace: bool,
    ) -> Result<()> {
        if cert_id.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "certificate id is required".to_string(),
            ));
        }
        let cert_id = certificate_user_id(cert_id.trim());

        let url = self.endpoint(&["users", user_id])?;
        let request = self
            .http_client
            .get(url.clone())
            .query(&[("$select", "authorizationInfo")]);
        let mut current: UserAuthorization = self
            .send(request, "get_authorization_info")
            .await?
            .json()
            .await?;

        let ids = &mut current.authorization_info.certificate_user_ids;
        if replace {
            ids.clear();
        } else if ids.contains(&cert_id) {
            tracing::debug!(user_id = %user_id, "Certificate already bound");
            return Ok(());
        }
        ids.push(cert_id);

        let request = self.http_client.patch(url).json(&current);
        self.send(request, "associate_certificate_mfa").await?;

        tracing::info!(user_id = %user_id, replace, "Associated MFA certificate");
        Ok(())
    }

    /// One page of the groups a user is a direct member of.
    ///
    /// `memberOf` also returns directory roles and administrative units;
    /// those are skipped.
    pub async fn list_user_groups_page(
        &self,
        user_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Group>> {
        let url = self.endpoint(&["users", user_id, "memberOf"])?;
        let page: Page<GraphGroup> = self
            .fetch_page(url, Vec::new(), cursor, false, "list_user_groups")
            .await?;
        Ok(page.filter_map(|group| group.is_group().then(|| group_from_graph(group))))
    }
}
