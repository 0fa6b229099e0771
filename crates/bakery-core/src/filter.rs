//! # Filter Criteria
//!
//! Optional, case-insensitive substring filters over an entity's name.
//!
//! ## From Filter To Store Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FilterCriterion::any()          FilterCriterion::contains("Cen")      │
//! │         │                                   │                           │
//! │         ▼                                   ▼                           │
//! │  pattern() == None               pattern() == Some(NamePattern)        │
//! │         │                                   │  like: "%Cen%"            │
//! │         ▼                                   ▼                           │
//! │  store.find_all(page)            store.find_by_name_like(pattern, page) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An absent filter never becomes a pattern. A present but empty filter is
//! the pattern `%%`, which matches every name.

use serde::{Deserialize, Serialize};

/// Escape character used in generated `LIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Case folding shared by every store: Unicode lowercase.
///
/// SQL stores persist a folded copy of each filtered name and match
/// [`NamePattern::like`] against it.
pub fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

// =============================================================================
// Filter Criterion
// =============================================================================

/// An optional substring to look for in entity names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriterion(Option<String>);

impl FilterCriterion {
    /// Matches every entity.
    pub const fn any() -> Self {
        FilterCriterion(None)
    }

    /// Matches entities whose name contains `needle`, ignoring case.
    pub fn contains(needle: impl Into<String>) -> Self {
        FilterCriterion(Some(needle.into()))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// The raw filter text, if any.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The "contains" pattern for a present filter.
    pub fn pattern(&self) -> Option<NamePattern> {
        self.0.as_deref().map(NamePattern::contains)
    }
}

impl From<Option<String>> for FilterCriterion {
    fn from(value: Option<String>) -> Self {
        FilterCriterion(value)
    }
}

impl From<&str> for FilterCriterion {
    fn from(value: &str) -> Self {
        FilterCriterion::contains(value)
    }
}

// =============================================================================
// Name Pattern
// =============================================================================

/// A case-insensitive "contains" match, ready for a store.
///
/// Wildcards typed by the user (`%`, `_`) are escaped, so the needle is
/// always matched literally. SQL stores use [`NamePattern::like`] with
/// `ESCAPE '\'`; in-process stores use [`NamePattern::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamePattern {
    needle: String,
    like: String,
}

impl NamePattern {
    /// Wraps `needle` as `%needle%`.
    pub fn contains(needle: &str) -> Self {
        let needle = fold_case(needle);
        let mut like = String::with_capacity(needle.len() + 2);
        like.push('%');
        for c in needle.chars() {
            if matches!(c, '%' | '_' | LIKE_ESCAPE) {
                like.push(LIKE_ESCAPE);
            }
            like.push(c);
        }
        like.push('%');

        NamePattern { needle, like }
    }

    /// The `LIKE` pattern text, for matching against folded names.
    pub fn like(&self) -> &str {
        &self.like
    }

    /// Lowercased needle.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Evaluates the pattern against a name, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        fold_case(name).contains(&self.needle)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
