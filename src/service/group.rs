//! Group management

use crate::directory::{paginate, DirectoryService};
use crate::domain::{Group, User};
use crate::error::{DirectoryError, Result};
use futures::stream::BoxStream;
use std::sync::Arc;

pub struct GroupManager<D: DirectoryService + ?Sized> {
    directory: Arc<D>,
}

impl<D: DirectoryService + ?Sized + 'static> GroupManager<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    pub fn list_groups(&self) -> BoxStream<'static, Result<Group>> {
        let directory = Arc::clone(&self.directory);
        paginate(move |cursor| {
            let directory = Arc::clone(&directory);
            async move { directory.list_groups_page(cursor).await }
        })
    }

    pub async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        self.directory.get_group(id).await
    }

    /// First group with this display name.
    ///
    /// Display names are not unique, so with duplicates the result depends on
    /// server order.
    pub async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        self.directory.find_group_by_name(name).await
    }

    /// Id of the first group with this display name
    pub async fn get_group_id(&self, name: &str) -> Result<Option<String>> {
        Ok(self.find_group_by_name(name).await?.map(|group| group.id))
    }

    pub async fn create_group(&self, name: &str) -> Result<Group> {
        if name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "group name is required".to_string(),
            ));
        }
        self.directory.create_group(name).await
    }

    pub async fn rename_group(&self, id: &str, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "group name is required".to_string(),
            ));
        }
        self.directory.rename_group(id, name).await
    }

    pub async fn delete_group(&self, id: &str) -> Result<()> {
        self.directory.delete_group(id).await
    }

    pub fn get_group_members(&self, group_id: &str) -> BoxStream<'static, Result<User>> {
        let directory = Arc::clone(&self.directory);
        let group_id = group_id.to_string();
        paginate(move |cursor| {
            let directory = Arc::clone(&directory);
            let group_id = group_id.clone();
            async move { directory.list_group_members_page(&group_id, cursor).await }
        })
    }

    /// Add every user; failures come back together as a batch error.
    pub async fn add_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        self.directory.add_group_members(group_id, user_ids).await
    }

    /// Remove every user; failures come back together as a batch error.
    pub async fn remove_members(&self, group_id: &str, user_ids: &[String]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        self.directory.remove_group_members(group_id, user_ids).await
    }
}
