//! # Validation Module
//!
//! Input validation utilities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  └── Type validation (JSON deserialization, multipart field present)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: ims-core                                                     │
//! │  └── THIS MODULE: field rules before anything reaches the store        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── Partial UNIQUE index (one ingest receipt per product)             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewProduct;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product name the catalog stores.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Validates a requested quantity on a cart line.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use ims_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

fn non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if value < 0.0 || value.is_nan() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a product decoded from a QR payload before it is inserted.
///
/// ## Rules
/// - `name` passes [`validate_product_name`]
/// - `quantity`, `base_price`, `tax`, `min_order` are not negative
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;

    if product.quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }
    if product.min_order < 0 {
        return Err(ValidationError::Negative {
            field: "min_order".to_string(),
        });
    }
    non_negative("base_price", product.base_price)?;
    non_negative("tax", product.tax)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
