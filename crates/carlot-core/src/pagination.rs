//! # Pagination Module
//!
//! Page window computation for listing endpoints.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pagination Contract                                │
//! │                                                                         │
//! │  page is 1-indexed, limit items per page                               │
//! │                                                                         │
//! │  skip     = (page - 1) * limit                                         │
//! │  has_more = total_count > page * limit                                 │
//! │                                                                         │
//! │  total_count = 25, limit = 10:                                         │
//! │                                                                         │
//! │  page 1 → items  0..9   has_more = true                                │
//! │  page 2 → items 10..19  has_more = true                                │
//! │  page 3 → items 20..24  has_more = false                               │
//! │  page 4 → empty         has_more = false                               │
//! │                                                                         │
//! │  Ordering is the store's stable insertion order.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `page = 0` and `limit = 0` are rejected with a validation error up front:
//! a zero limit would otherwise report `has_more` forever, and page 0 has no
//! defined window.

use serde::Serialize;

use crate::error::ValidationErrors;
use crate::CARS_PER_PAGE;

/// Default page number for listing requests.
pub const DEFAULT_PAGE: u64 = 1;

// =============================================================================
// Page Request
// =============================================================================

/// A validated page request: 1-indexed page number and page size.
///
/// ## Example
/// ```rust
/// use carlot_core::PageRequest;
///
/// let request = PageRequest::new(3, 10).unwrap();
/// assert_eq!(request.skip(), 20);
///
/// // page 0 and limit 0 are rejected up front
/// assert!(PageRequest::new(0, 10).is_err());
/// assert!(PageRequest::new(1, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Creates a page request, rejecting zero page numbers and zero limits.
    pub fn new(page: u64, limit: u64) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if page == 0 {
            errors.add("page", "must be at least 1");
        }
        if limit == 0 {
            errors.add("limit", "must be at least 1");
        }

        errors.into_result()?;
        Ok(PageRequest { page, limit })
    }

    /// The 1-indexed page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Items per page.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Offset of the first item of this page.
    ///
    /// Saturates: an absurdly large page yields an offset past any real
    /// collection, which is just an empty window.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Computes the page window over a collection of `total_count` items.
    pub fn window(&self, total_count: u64) -> PageWindow {
        PageWindow {
            page: self.page,
            skip: self.skip(),
            limit: self.limit,
            has_more: total_count > self.page.saturating_mul(self.limit),
        }
    }
}

impl Default for PageRequest {
    /// First page, [`CARS_PER_PAGE`] items.
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            limit: CARS_PER_PAGE,
        }
    }
}

// =============================================================================
// Page Window
// =============================================================================

/// A computed page window: what to ask the store for, and whether more
/// pages exist beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// The 1-indexed page this window covers.
    pub page: u64,

    /// Offset of the first item.
    pub skip: u64,

    /// Maximum number of items in the window.
    pub limit: u64,

    /// True when items exist beyond this window.
    pub has_more: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
