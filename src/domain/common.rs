//! Common types for domain models

use serde::{Deserialize, Serialize};

/// Opaque continuation token handed out by the directory service.
///
/// For Graph this is the absolute `@odata.nextLink` URL; callers must not
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(pub String);

impl PageCursor {
    pub fn new(value: impl Into<String>) -> Self {
        PageCursor(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One server-side page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present while the server has more pages
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<PageCursor>) -> Self {
        Self { items, next }
    }

    /// A final page
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Convert the items, dropping the ones `f` rejects. The cursor is kept.
    pub fn filter_map<U>(self, f: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            items: self.items.into_iter().filter_map(f).collect(),
            next: self.next,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}

/// User listing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Raw OData `$filter` expression
    pub filter: Option<String>,
}

impl UserQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
        }
    }
}
