//! Group operations

use super::convert::{group_from_graph, group_to_graph, odata_quote, user_from_graph};
use super::types::{GraphGroup, GraphUser, ReferenceCreate};
use super::GraphClient;
use crate::domain::{Group, Page, PageCursor, User};
use crate::error::{BatchError, Result};
use serde_json::json;

/// Properties read for group members
const MEMBER_SELECT_FIELDS: &str = "id,displayName,givenName,surname,userPrincipalName";

impl GraphClient {
    pub async fn list_groups_page(&self, cursor: Option<PageCursor>) -> Result<Page<Group>> {
        let query = vec![("$select", "id,displayName".to_string())];
        let page: Page<GraphGroup> = self
            .fetch_page(self.endpoint(&["groups"])?, query, cursor, false, "list_groups")
            .await?;
        Ok(page.filter_map(|group| Some(group_from_graph(group))))
    }

    pub async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        let url = self.endpoint(&["groups", id])?;
        let group: Option<GraphGroup> = self
            .get_optional(url, &[("$select", "id,displayName".to_string())], "get_group")
            .await?;
        Ok(group.map(group_from_graph))
    }

    /// Look a group up by display name.
    ///
    /// Display names are not unique in the directory. The first match in
    /// server order is returned and any others are ignored.
    pub async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let query = vec![
            ("$select", "id,displayName".to_string()),
            ("$filter", format!("displayName eq {}", odata_quote(name))),
            ("$count", "true".to_string()),
        ];
        let page: Page<GraphGroup> = self
            .fetch_page(self.endpoint(&["groups"])?, query, None, true, "find_group_by_name")
            .await?;

        if page.items.len() > 1 {
            tracing::warn!(
                name = %name,
                matches = page.items.len(),
                "Group display name is ambiguous, using the first match"
            );
        }
        Ok(page.items.into_iter().next().map(group_from_graph))
    }

    /// Create a security group
    pub async fn create_group(&self, name: &str) -> Result<Group> {
        let url = self.endpoint(&["groups"])?;
        let request = self.http_client.post(url).json(&group_to_graph(name));
        let created: GraphGroup = self.send(request, "create_group").await?.json().await?;
        let group = group_from_graph(created);

        tracing::info!(group_id = %group.id, name = %group.name, "Created group");
        Ok(group)
    }

    pub async fn rename_group(&self, id: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&["groups", id])?;
        let request = self
            .http_client
            .patch(url)
            .json(&json!({ "displayName": name }));
        self.send(request, "rename_group").await?;

        tracing::info!(group_id = %id, name = %name, "Renamed group");
        Ok(())
    }

    pub async fn delete_group(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["groups", id])?;
        self.send(self.http_client.delete(url), "delete_group").await?;

        tracing::info!(group_id = %id, "Deleted group");
        Ok(())
    }

    /// One page of a group's user members. Nested groups and devices are skipped.
    pub async fn list_group_members_page(
        &self,
        group_id: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        let url = self.endpoint(&["groups", group_id, "members"])?;
        let query = vec![("$select", MEMBER_SELECT_FIELDS.to_string())];
        let page: Page<GraphUser> = self
            .fetch_page(url, query, cursor, false, "list_group_members")
            .await?;
        Ok(page.filter_map(|member| member.is_user().then(|| user_from_graph(member))))
    }

    /// Add users one at a time; every failure is collected.
    pub async fn add_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        let url = self.endpoint(&["groups", group_id, "members", "$ref"])?;
        let mut failures = BatchError::default();

        for user_id in user_ids {
            let body = ReferenceCreate {
                odata_id: self.directory_object_ref(user_id),
            };
            let request = self.http_client.post(url.clone()).json(&body);
            if let Err(e) = self.send(request, "add_group_member").await {
                tracing::warn!(group_id = %group_id, user_id = %user_id, error = %e, "Failed to add group member");
                failures.push(user_id.as_str(), e);
            }
        }

        tracing::info!(
            group_id = %group_id,
            requested = user_ids.len(),
            failed = failures.len(),
            "Added group members"
        );
        failures.into_result()
    }

    /// Remove users one at a time; every failure is collected.
    pub async fn remove_group_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        let mut failures = BatchError::default();

        for user_id in user_ids {
            let result = match self.endpoint(&["groups", group_id, "members", user_id.as_str(), "$ref"]) {
                Ok(url) => self
                    .send(self.http_client.delete(url), "remove_group_member")
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::warn!(group_id = %group_id, user_id = %user_id, error = %e, "Failed to remove group member");
                failures.push(user_id.as_str(), e);
            }
        }

        tracing::info!(
            group_id = %group_id,
            requested = user_ids.len(),
            failed = failures.len(),
            "Removed group members"
        );
        failures.into_result()
    }
}

