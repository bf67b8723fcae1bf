//! # Validation Module
//!
//! Input checks that run before a domain operation touches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI                                                           │
//! │  └── Immediate feedback (empty fields, digit-only PIN pad)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend command                                              │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record store                                                 │
//! │  └── Identifier presence only                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use namaa_core::validation::{validate_password, validate_quantity};
//!
//! validate_password("1234").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, StoreSettings, User};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Length of an operator PIN.
pub const PASSWORD_LENGTH: usize = 4;

const MAX_NAME_LEN: usize = 200;
const MAX_SKU_LEN: usize = 50;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an operator password.
///
/// ## Rules
/// - Exactly 4 characters
/// - ASCII digits only
///
/// ## Example
/// ```rust
/// use namaa_core::validation::validate_password;
///
/// assert!(validate_password("0420").is_ok());
/// assert!(validate_password("123").is_err());
/// assert!(validate_password("12a4").is_err());
/// ```
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() != PASSWORD_LENGTH || !password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be exactly {} digits", PASSWORD_LENGTH),
        });
    }
    Ok(())
}

/// Validates a SKU (barcode).
///
/// Uniqueness is not checked here; manually entered duplicates are accepted.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku)?;

    if sku.trim().len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product or user).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required(field, name)?;

    if name.trim().len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item or return quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an absolute stock count (stocktaking, product form).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a price. Zero is allowed (free items).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before it is written by the product form.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    required("id", &product.id)?;
    validate_name("name", &product.name)?;
    validate_sku(&product.sku)?;
    validate_price("price", product.price)?;
    validate_price("cost", product.cost)?;
    validate_stock(product.stock)?;
    Ok(())
}

/// Validates a user account before it is written.
pub fn validate_user(user: &User) -> ValidationResult<()> {
    required("id", &user.id)?;
    validate_name("name", &user.name)?;
    validate_password(&user.password)?;
    Ok(())
}

/// Validates store settings.
pub fn validate_settings(settings: &StoreSettings) -> ValidationResult<()> {
    validate_name("storeName", &settings.store_name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;
    use chrono::Utc;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("1234").is_ok());
        assert!(validate_password("0000").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("123").is_err());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("12 4").is_err());
        assert!(validate_password("١٢٣٤").is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("4821").is_ok());
        assert!(validate_sku("MILK-1L").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"1".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_quantity_and_stock() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_user() {
        let mut user = User {
            id: "u1".to_string(),
            name: "Salma".to_string(),
            password: "1234".to_string(),
            role: UserRole::Cashier,
            created_at: Utc::now(),
        };
        assert!(validate_user(&user).is_ok());

        user.password = "12".to_string();
        assert!(validate_user(&user).is_err());
    }

    #[test]
    fn test_validate_settings() {
        assert!(validate_settings(&StoreSettings::new("Namaa", "", "")).is_ok());
        assert!(validate_settings(&StoreSettings::new("  ", "", "")).is_err());
    }
}
