//! # Validation Module
//!
//! Input validation applied before anything reaches a record store.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer (forms)                                   │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: FilterableCrudService::save / PageRequest::new               │
//! │  └── THIS MODULE: field and paging rules                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bakery_core::validation::{validate_name, validate_page_size};
//!
//! assert!(validate_name("name", "Store").is_ok());
//! assert!(validate_page_size(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_NAME_LENGTH, MAX_PAGE_SIZE, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (location, product, customer).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// Digits, spaces, `+`, `-` and parentheses only; at most 20 characters.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_phone".to_string(),
        });
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "customer_phone".to_string(),
            max: 20,
        });
    }

    let valid = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "customer_phone".to_string(),
            reason: "only digits, spaces, '+', '-' and parentheses are allowed".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn out_of_price_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_PRICE_CENTS,
    }
}

/// Validates a price or total: zero up to [`MAX_PRICE_CENTS`].
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_PRICE_CENTS {
        return Err(out_of_price_range("price"));
    }
    Ok(())
}

/// Order total after adding `quantity` units at `price` to `current`.
///
/// A total that overflows or exceeds [`MAX_PRICE_CENTS`] is out of range.
pub fn add_to_total(current: Money, price: Money, quantity: i64) -> ValidationResult<Money> {
    validate_quantity(quantity)?;

    let total = price
        .checked_mul(quantity)
        .and_then(|line| current.checked_add(line))
        .ok_or_else(|| out_of_price_range("total"))?;

    if total.is_negative() || total.cents() > MAX_PRICE_CENTS {
        return Err(out_of_price_range("total"));
    }
    Ok(total)
}

/// Validates an order line quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a page size: 1 up to [`MAX_PAGE_SIZE`].
pub fn validate_page_size(size: u32) -> ValidationResult<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Store").is_ok());
        assert!(validate_name("name", "Bakery").is_ok());

        assert_eq!(
            validate_name("name", "   "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );

        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            validate_name("name", &long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123456789012345678901").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(450)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_price(Money::from_cents(MAX_PRICE_CENTS + 1)).is_err());
    }

    #[test]
    fn test_add_to_total() {
        let cake = Money::from_cents(1250);
        assert_eq!(
            add_to_total(Money::from_cents(300), cake, 2),
            Ok(Money::from_cents(2800))
        );
        assert_eq!(
            add_to_total(Money::zero(), Money::from_cents(MAX_PRICE_CENTS), 1),
            Ok(Money::from_cents(MAX_PRICE_CENTS))
        );

        let over = add_to_total(Money::zero(), cake, 1000);
        assert!(matches!(over, Err(ValidationError::OutOfRange { ref field, .. }) if field == "total"));
        assert!(add_to_total(Money::from_cents(MAX_PRICE_CENTS), Money::from_cents(1), 1).is_err());

        // Overflowing quantities fail instead of wrapping
        assert!(add_to_total(Money::zero(), cake, i64::MAX / 100).is_err());
        assert!(add_to_total(Money::zero(), cake, i64::MAX).is_err());

        assert!(matches!(
            add_to_total(Money::zero(), cake, 0),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }
}
