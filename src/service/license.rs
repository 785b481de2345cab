//! License assignment

use crate::directory::{paginate, DirectoryService};
use crate::domain::{License, LicenseChange, User};
use crate::error::{DirectoryError, Result, RESOURCE_NOT_FOUND_CODES};
use futures::stream::BoxStream;
use std::sync::Arc;
use uuid::Uuid;

pub struct LicenseManager<D: DirectoryService + ?Sized> {
    directory: Arc<D>,
}

impl<D: DirectoryService + ?Sized + 'static> LicenseManager<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Licenses the tenant subscribes to
    pub async fn list_licenses(&self) -> Result<Vec<License>> {
        self.directory.list_licenses().await
    }

    /// `Ok(None)` when the user does not exist.
    pub async fn get_user_licenses(&self, user_id: &str) -> Result<Option<Vec<Uuid>>> {
        self.directory.get_user_licenses(user_id).await
    }

    /// Users that hold `sku`
    pub fn get_assigned(&self, sku: Uuid) -> BoxStream<'static, Result<User>> {
        let directory = Arc::clone(&self.directory);
        paginate(move |cursor| {
            let directory = Arc::clone(&directory);
            async move { directory.list_license_users_page(sku, cursor).await }
        })
    }

    /// Explicit add/remove in one request. A SKU named on both sides is left alone.
    pub async fn assign_licenses(
        &self,
        user_id: &str,
        add: &[Uuid],
        remove: &[Uuid],
    ) -> Result<LicenseChange> {
        let change = LicenseChange::new(add.iter().copied(), remove.iter().copied());
        self.directory.assign_licenses(user_id, &change).await?;
        Ok(change)
    }

    /// Bring the user's licenses to exactly `desired`.
    ///
    /// Reads the current assignment first. Returns the change that was applied.
    pub async fn set_licenses(&self, user_id: &str, desired: &[Uuid]) -> Result<LicenseChange> {
        let current = self
            .directory
            .get_user_licenses(user_id)
            .await?
            .ok_or_else(|| DirectoryError::Request {
                status: 404,
                code: RESOURCE_NOT_FOUND_CODES[0].to_string(),
                message: format!("user {} does not exist", user_id),
            })?;

        self.set_licenses_from(user_id, desired, &current).await
    }

    /// Like [`set_licenses`](Self::set_licenses) with a known current assignment.
    pub async fn set_licenses_from(
        &self,
        user_id: &str,
        desired: &[Uuid],
        current: &[Uuid],
    ) -> Result<LicenseChange> {
        let change = LicenseChange::between(desired, current);
        tracing::debug!(
            user_id = %user_id,
            add = ?change.add,
            remove = ?change.remove,
            "Computed license change"
        );

        if !change.is_empty() {
            self.directory.assign_licenses(user_id, &change).await?;
        }
        Ok(change)
    }
}
