//! License operations

use super::convert::{license_from_graph, user_from_graph};
use super::types::{AssignLicenseBody, AssignedLicense, GraphUser, SubscribedSku};
use super::GraphClient;
use crate::directory::paginate;
use crate::domain::{License, LicenseChange, Page, PageCursor, User};
use crate::error::Result;
use futures::TryStreamExt;
use uuid::Uuid;

impl GraphClient {
    /// The tenant's subscribed SKUs
    pub async fn list_licenses(&self) -> Result<Vec<License>> {
        let url = self.endpoint(&["subscribedSkus"])?;
        let skus: Vec<SubscribedSku> = paginate(move |cursor| {
            let url = url.clone();
            async move {
                self.fetch_page::<SubscribedSku>(url, Vec::new(), cursor, false, "list_licenses")
                    .await
            }
        })
        .try_collect()
        .await?;

        Ok(skus.into_iter().map(license_from_graph).collect())
    }

    /// SKUs assigned to a user, `None` when the user does not exist.
    pub async fn get_user_licenses(&self, user_id: &str) -> Result<Option<Vec<Uuid>>> {
        let url = self.endpoint(&["users", user_id])?;
        let user: Option<GraphUser> = self
            .get_optional(
                url,
                &[("$select", "assignedLicenses".to_string())],
                "get_user_licenses",
            )
            .await?;

        Ok(user.map(|user| {
            user.assigned_licenses
                .unwrap_or_default()
                .into_iter()
                .map(|license| license.sku_id)
                .collect()
        }))
    }

    /// Apply one combined add/remove request. An empty change sends nothing.
    pub async fn assign_licenses(&self, user_id: &str, change: &LicenseChange) -> Result<()> {
        if change.is_empty() {
            tracing::debug!(user_id = %user_id, "License change is empty, skipping");
            return Ok(());
        }

        let body = AssignLicenseBody {
            add_licenses: change
                .add
                .iter()
                .map(|sku| AssignedLicense {
                    sku_id: *sku,
                    disabled_plans: Vec::new(),
                })
                .collect(),
            remove_licenses: change.remove.clone(),
        };

        let url = self.endpoint(&["users", user_id, "assignLicense"])?;
        self.send(self.http_client.post(url).json(&body), "assign_licenses")
            .await?;

        tracing::info!(
            user_id = %user_id,
            added = change.add.len(),
            removed = change.remove.len(),
            "Updated license assignment"
        );
        Ok(())
    }

    /// One page of users holding a SKU
    pub async fn list_license_users_page(
        &self,
        sku: Uuid,
        cursor: Option<PageCursor>,
    ) -> Result<Page<User>> {
        let query = vec![
            ("$select", self.config.select_fields.join(",")),
            ("$filter", format!("assignedLicenses/any(s:s/skuId eq {})", sku)),
        ];
        let page: Page<GraphUser> = self
            .fetch_page(self.endpoint(&["users"])?, query, cursor, false, "list_license_users")
            .await?;
        Ok(page.filter_map(|user| Some(user_from_graph(user))))
    }
}
