//! License (SKU) domain model

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A subscribed SKU in the tenant's license catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    pub sku: Uuid,
    /// SKU part number, e.g. "ENTERPRISEPACK"
    pub name: String,
    pub consumed: i64,
    pub total: i64,
}

/// One combined add/remove license request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseChange {
    pub add: Vec<Uuid>,
    pub remove: Vec<Uuid>,
}

impl LicenseChange {
    /// Explicit change. A SKU named on both sides cancels out.
    pub fn new(
        add: impl IntoIterator<Item = Uuid>,
        remove: impl IntoIterator<Item = Uuid>,
    ) -> Self {
        let add = dedup(add);
        let remove = dedup(remove);
        let both: HashSet<Uuid> = add.iter().filter(|sku| remove.contains(sku)).copied().collect();

        Self {
            add: add.into_iter().filter(|sku| !both.contains(sku)).collect(),
            remove: remove.into_iter().filter(|sku| !both.contains(sku)).collect(),
        }
    }

    pub fn add(skus: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            add: dedup(skus),
            remove: Vec::new(),
        }
    }

    pub fn remove(skus: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            add: Vec::new(),
            remove: dedup(skus),
        }
    }

    /// Change that turns `current` into `desired`.
    ///
    /// `add = desired - current`, `remove = current - desired`; a SKU in both
    /// sets is left alone. Order follows the input slices.
    pub fn between(desired: &[Uuid], current: &[Uuid]) -> Self {
        let desired_set: HashSet<&Uuid> = desired.iter().collect();
        let current_set: HashSet<&Uuid> = current.iter().collect();

        Self {
            add: dedup(desired.iter().copied().filter(|sku| !current_set.contains(sku))),
            remove: dedup(current.iter().copied().filter(|sku| !desired_set.contains(sku))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

fn dedup(skus: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    skus.into_iter().filter(|sku| seen.insert(*sku)).collect()
}

/// Parse SKU identifiers, rejecting anything that is not a UUID.
pub fn parse_skus<S: AsRef<str>>(values: &[S]) -> crate::error::Result<Vec<Uuid>> {
    values
        .iter()
        .map(|value| {
            let value = value.as_ref().trim();
            Uuid::parse_str(value).map_err(|e| {
                crate::error::DirectoryError::Validation(format!(
                    "invalid license SKU {:?}: {}",
                    value, e
                ))
            })
        })
        .collect()
}
