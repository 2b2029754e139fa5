//! Page-based pagination for list endpoints.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Default page size used by the admin endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error type for pagination parameters and page envelopes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Page must be at least 1, got {0}")]
    InvalidPage(u32),
    #[error("Limit must be between 1 and 100, got {0}")]
    InvalidLimit(u32),
    #[error("Page flags disagree with totals: hasNext={has_next}, hasPrevious={has_previous}")]
    InconsistentFlags { has_next: bool, has_previous: bool },
    #[error("Page has neither `items` nor `data`")]
    MissingItems,
}

/// Key a page carries its rows under. Some endpoints use `data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemsKey {
    #[default]
    Items,
    Data,
}

impl ItemsKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemsKey::Items => "items",
            ItemsKey::Data => "data",
        }
    }
}

/// One page of a collection, as returned by list endpoints.
///
/// Rows are read from `items` or `data` and written back under the key they
/// arrived with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPage<T>")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub items_key: ItemsKey,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage<T> {
    items: Option<Vec<T>>,
    data: Option<Vec<T>>,
    total: u64,
    page: u32,
    limit: u32,
    has_next: bool,
    has_previous: bool,
}

impl<T> TryFrom<RawPage<T>> for Page<T> {
    type Error = PageError;

    fn try_from(raw: RawPage<T>) -> Result<Self, Self::Error> {
        let (items, items_key) = match (raw.items, raw.data) {
            (Some(items), _) => (items, ItemsKey::Items),
            (None, Some(data)) => (data, ItemsKey::Data),
            (None, None) => return Err(PageError::MissingItems),
        };
        Ok(Self {
            items,
            total: raw.total,
            page: raw.page,
            limit: raw.limit,
            has_next: raw.has_next,
            has_previous: raw.has_previous,
            items_key,
        })
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 6)?;
        state.serialize_field(self.items_key.as_str(), &self.items)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("limit", &self.limit)?;
        state.serialize_field("hasNext", &self.has_next)?;
        state.serialize_field("hasPrevious", &self.has_previous)?;
        state.end()
    }
}

impl<T> Page<T> {
    /// Builds a page for `query` with navigation flags derived from `total`.
    pub fn from_parts(items: Vec<T>, total: u64, query: &PageQuery) -> Self {
        let mut page = Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            has_next: false,
            has_previous: query.page > 1,
            items_key: ItemsKey::Items,
        };
        page.has_next = u64::from(page.page) < page.total_pages();
        page
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checks that the navigation flags agree with `total`, `page` and `limit`.
    ///
    /// Decoding does not call this; the server is authoritative.
    pub fn check(&self) -> Result<(), PageError> {
        if self.page == 0 {
            return Err(PageError::InvalidPage(self.page));
        }
        let expect_next = u64::from(self.page) < self.total_pages();
        let expect_previous = self.page > 1;
        if self.has_next != expect_next || self.has_previous != expect_previous {
            return Err(PageError::InconsistentFlags {
                has_next: self.has_next,
                has_previous: self.has_previous,
            });
        }
        Ok(())
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            has_next: self.has_next,
            has_previous: self.has_previous,
            items_key: self.items_key,
        }
    }
}

/// Page selection sent as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<(), PageError> {
        if self.page == 0 {
            return Err(PageError::InvalidPage(self.page));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(PageError::InvalidLimit(self.limit));
        }
        Ok(())
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}
