//! # Pagination
//!
//! Page requests and the pages stores answer them with.
//!
//! ## Partitioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Filtered result set (ordered by sort, then id)                        │
//! │                                                                         │
//! │  [ e0 e1 e2 | e3 e4 e5 | e6 e7 ]      size = 3                         │
//! │    page 0     page 1     page 2       total_elements = 8               │
//! │                                       total_pages    = 3               │
//! │                                                                         │
//! │  Pages never overlap and never skip: offset = page × size.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{validate_page_size, ValidationResult};

// =============================================================================
// Sort
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort order on a single entity property.
///
/// Stores decide which properties they can sort on and always break ties by
/// primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(property: impl Into<String>) -> Self {
        Sort {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Sort {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

// =============================================================================
// Page Request
// =============================================================================

/// Which slice of a result set to return.
///
/// ## Example
/// ```rust
/// use bakery_core::page::{PageRequest, Sort};
///
/// let request = PageRequest::new(2, 25).unwrap().with_sort(Sort::asc("name"));
/// assert_eq!(request.offset(), 50);
/// ```
///
/// Only constructible through [`PageRequest::new`] / [`PageRequest::first`],
/// so the size is always at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Option<Sort>,
}

impl PageRequest {
    /// Creates a request for zero-based `page` of `size` elements.
    ///
    /// Fails when `size` is zero or above [`crate::MAX_PAGE_SIZE`].
    pub fn new(page: u32, size: u32) -> ValidationResult<Self> {
        validate_page_size(size)?;
        Ok(PageRequest {
            page,
            size,
            sort: None,
        })
    }

    /// Page 0 with a single element.
    pub fn first() -> Self {
        PageRequest {
            page: 0,
            size: 1,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Number of elements before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// The following page with the same size and sort; `None` past `u32::MAX`.
    pub fn next(&self) -> Option<Self> {
        Some(PageRequest {
            page: self.page.checked_add(1)?,
            size: self.size,
            sort: self.sort.clone(),
        })
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of a result set, with totals over the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page number.
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page answering `request` from a store's slice and total count.
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size());
        Page {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// An empty page.
    pub fn empty(request: &PageRequest) -> Self {
        Page::new(Vec::new(), request, 0)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Converts the content, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
