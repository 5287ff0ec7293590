//! Offset pagination.

use serde::Serialize;

/// Errors from validating pagination parameters.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// Page numbers start at 1.
    #[error("The page number must be greater than 0")]
    PageTooLow,
    /// Page size outside the endpoint's allowed range.
    #[error("perPage must be between {min} and {max}")]
    PerPageOutOfRange {
        /// Smallest allowed page size.
        min: u32,
        /// Largest allowed page size.
        max: u32,
    },
}

/// A validated page request.
///
/// Each listing endpoint has its own default and bounds for the page size, so
/// construction takes them explicitly:
///
/// ```
/// use blended_core::PageRequest;
///
/// let req = PageRequest::new(Some(3), None, 6, 3..=7).unwrap();
/// assert_eq!(req.per_page(), 6);
/// assert_eq!(req.offset(), 12);
///
/// assert!(PageRequest::new(Some(0), None, 6, 3..=7).is_err());
/// assert!(PageRequest::new(None, Some(20), 6, 3..=7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate optional query values against the endpoint's defaults.
    ///
    /// # Errors
    ///
    /// Returns `PageError::PageTooLow` for page 0 and
    /// `PageError::PerPageOutOfRange` when the page size is outside `bounds`.
    pub fn new(
        page: Option<u32>,
        per_page: Option<u32>,
        default_per_page: u32,
        bounds: std::ops::RangeInclusive<u32>,
    ) -> Result<Self, PageError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageError::PageTooLow);
        }

        let per_page = per_page.unwrap_or(default_per_page);
        if !bounds.contains(&per_page) {
            return Err(PageError::PerPageOutOfRange {
                min: *bounds.start(),
                max: *bounds.end(),
            });
        }

        Ok(Self { page, per_page })
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip, for SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Rows to return, for SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Pagination metadata returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number that was served.
    pub page: u32,
    /// Page size that was used.
    pub per_page: u32,
    /// Total rows matching the query.
    pub total_items: i64,
    /// `ceil(total_items / per_page)`.
    pub total_pages: i64,
}

impl PageInfo {
    /// Build metadata for `request` given the total row count.
    #[must_use]
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let per_page = i64::from(request.per_page);
        let total_items = total_items.max(0);
        Self {
            page: request.page,
            per_page: request.per_page,
            total_items,
            total_pages: (total_items + per_page - 1) / per_page,
        }
    }
}
