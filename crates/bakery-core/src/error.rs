//! # Error Types
//!
//! Domain-specific error types for bakery-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bakery-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ServiceError<E>  - FilterableCrudService failures, generic over   │
//! │                         the store's own error type                     │
//! │                                                                         │
//! │  bakery-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → ServiceError<DbError> → presentation layer    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, ID, field)
//! 3. Store errors pass through untouched inside `ServiceError::Store`

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Dashboard data violates one of its shape invariants.
    ///
    /// ## When This Occurs
    /// - A time series has the wrong length for the aggregation date
    /// - Sales rows have different lengths
    /// - Product ranking is out of order or repeats a product
    #[error("Invalid dashboard data: {0}")]
    InvalidDashboard(#[source] ValidationError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before a store is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., letters in a phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Sequence has the wrong number of elements.
    #[error("{field} must have {expected} entries, got {actual}")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Ranked sequence is not in non-increasing order.
    #[error("{field} is not ranked: position {position} exceeds its predecessor")]
    NotRanked { field: String, position: usize },

    /// Duplicate value (e.g., the same product ranked twice).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Service Error
// =============================================================================

/// Errors raised by [`FilterableCrudService`](crate::service::FilterableCrudService)
/// operations.
///
/// `E` is the error type of the backing record store. Store failures are
/// wrapped, never translated.
#[derive(Debug, Error)]
pub enum ServiceError<E>
where
    E: std::error::Error + 'static,
{
    /// No entity satisfies the request.
    ///
    /// ## When This Occurs
    /// - `get_default()` on an empty store
    /// - `load(id)` with an unknown id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity failed validation before save.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[source] E),
}

impl<E> ServiceError<E>
where
    E: std::error::Error + 'static,
{
    /// Creates a NotFound error for a given entity kind and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true for the NotFound variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result of a service operation over a store with error type `E`.
pub type ServiceResult<T, E> = Result<T, ServiceError<E>>;

// =============================================================================
// Unit Tests
// =============================================================================
