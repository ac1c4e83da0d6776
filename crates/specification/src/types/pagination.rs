//! Page arithmetic and paged result shapes.
//!
//! Paging is offset based: a Specification carries a `skip`/`take` window and
//! the repository reports where that window sits in the full matching set.

use serde::{Deserialize, Serialize};

/// Page position derived from a total count and a paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// 1-based page number.
    pub page_number: u64,
    /// Items per page.
    pub page_size: u64,
    /// Number of pages needed to hold `total_count` items.
    pub total_pages: u64,
}

impl PageMetadata {
    /// Computes page metadata.
    ///
    /// With `page_size > 0`, `page_number = skip / page_size + 1` and
    /// `total_pages = ceil(total_count / page_size)`.
    ///
    /// A page size of zero is a single degenerate page: `page_number = 1`,
    /// and `total_pages` is 0 for an empty set and 1 otherwise.
    ///
    /// `skip` past the end of the set is not clamped; the page number keeps
    /// pointing past the last page while `total_pages` still describes the
    /// whole set.
    pub fn calculate(total_count: u64, skip: u64, page_size: u64) -> Self {
        if page_size == 0 {
            return Self {
                page_number: 1,
                page_size: 0,
                total_pages: u64::from(total_count > 0),
            };
        }
        Self {
            page_number: skip / page_size + 1,
            page_size,
            total_pages: total_count.div_ceil(page_size),
        }
    }
}

/// One page of results together with its position in the full result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// The items of the requested page, in evaluation order.
    pub items: Vec<T>,
    /// Number of items matching the criteria, ignoring the paging window.
    pub total_count: u64,
    /// 1-based page number.
    pub page_number: u64,
    /// Items per page.
    pub page_size: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    /// Creates a paged result from its items and precomputed metadata.
    pub fn new(items: Vec<T>, total_count: u64, metadata: PageMetadata) -> Self {
        Self {
            items,
            total_count,
            page_number: metadata.page_number,
            page_size: metadata.page_size,
            total_pages: metadata.total_pages,
        }
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if a later page exists.
    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// Returns true if an earlier page exists.
    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    /// Returns the page metadata.
    pub fn metadata(&self) -> PageMetadata {
        PageMetadata {
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
