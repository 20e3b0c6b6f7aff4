//! Offset pagination shared by every list operation.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Page/limit as requested by a caller. Deserializes from query strings with
/// both fields optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Cap the limit at `max`. Non-positive pages and limits are left alone
    /// so that [`paginate`] still rejects them.
    pub fn clamped(self, max: i64) -> Self {
        Self {
            limit: self.limit.min(max),
            ..self
        }
    }

    pub fn window(&self) -> Result<PageWindow, PaginationError> {
        paginate(self.page, self.limit)
    }

    pub fn wrap<T>(&self, items: Vec<T>, total: i64) -> Result<PageResult<T>, PaginationError> {
        wrap(items, total, self.page, self.limit)
    }
}

/// Bounded slice of a query: rows to skip and rows to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub skip: i64,
    pub take: i64,
}

/// Result envelope for a list operation.
///
/// `pages == 0` iff `total == 0`, and `items.len() <= limit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub limit: i64,
}

/// Pagination metadata without the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> PageResult<T> {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            total: self.total,
            pages: self.pages,
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pages: self.pages,
            page: self.page,
            limit: self.limit,
        }
    }
}

fn check_limit(limit: i64) -> Result<(), PaginationError> {
    if limit < 1 {
        return Err(PaginationError::InvalidArgument(format!(
            "limit must be at least 1, got {}",
            limit
        )));
    }
    Ok(())
}

fn check_page(page: i64) -> Result<(), PaginationError> {
    if page < 1 {
        return Err(PaginationError::InvalidArgument(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    Ok(())
}

/// `skip = max(0, page - 1) * limit`, `take = limit`.
pub fn paginate(page: i64, limit: i64) -> Result<PageWindow, PaginationError> {
    check_page(page)?;
    check_limit(limit)?;
    let skip = (page - 1)
        .max(0)
        .checked_mul(limit)
        .ok_or_else(|| PaginationError::InvalidArgument(format!("page {} is out of range", page)))?;
    Ok(PageWindow { skip, take: limit })
}

/// Build the envelope with `pages = ceil(total / limit)`.
pub fn wrap<T>(
    mut items: Vec<T>,
    total: i64,
    page: i64,
    limit: i64,
) -> Result<PageResult<T>, PaginationError> {
    check_page(page)?;
    check_limit(limit)?;
    let total = total.max(0);
    // a store that over-delivers must not break the envelope invariant
    items.truncate(limit as usize);

    Ok(PageResult {
        items,
        total,
        pages: (total + limit - 1) / limit,
        page,
        limit,
    })
}
