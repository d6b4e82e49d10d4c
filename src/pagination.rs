//! This module defines the common functionality for paging data.

use crate::Error;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Validate the raw `page`/`pageSize` query values against `config`.
    ///
    /// Missing values fall back to the configured defaults.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `page` or `page_size` is not positive,
    /// or if `page_size` exceeds the configured maximum.
    pub fn new(
        page: Option<i64>,
        page_size: Option<i64>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = page.unwrap_or(config.default_page as i64);
        let page_size = page_size.unwrap_or(config.default_page_size as i64);

        if page < 1 {
            return Err(Error::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }

        if page_size < 1 {
            return Err(Error::Validation(format!(
                "pageSize must be at least 1, got {page_size}"
            )));
        }

        if page_size as u64 > config.max_page_size {
            return Err(Error::Validation(format!(
                "pageSize must be at most {}, got {page_size}",
                config.max_page_size
            )));
        }

        // A page this deep has no rows behind it; rejecting it keeps the
        // offset arithmetic from overflowing.
        if (page as u64 - 1).checked_mul(page_size as u64).is_none() {
            return Err(Error::Validation(format!("page {page} is out of range")));
        }

        Ok(Self {
            page: page as u64,
            page_size: page_size as u64,
        })
    }

    /// The number of rows to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

/// The number of pages needed to display `total_items`.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size)
}
