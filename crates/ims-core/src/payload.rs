//! # QR Payload Parsing
//!
//! Product labels carry a JSON object in their QR code:
//!
//! ```json
//! {"category_id": 1, "brand_id": 1, "name": "Widget", "model": "W1",
//!  "description": "d", "quantity": 10, "unit": "ea", "base_price": 5.0,
//!  "tax": 0.1, "min_order": 1, "supplier": 2, "status": "active"}
//! ```
//!
//! Every field is required. Unknown fields are ignored so labels printed
//! with extra metadata still ingest.

use crate::error::ValidationError;
use crate::types::NewProduct;
use crate::validation::{validate_new_product, ValidationResult};

/// Parses and validates the text decoded from a product QR code.
///
/// ## Example
/// ```rust
/// use ims_core::payload::parse_product_payload;
///
/// let text = r#"{"category_id":1,"brand_id":1,"name":"Widget","model":"W1",
///     "description":"d","quantity":10,"unit":"ea","base_price":5.0,"tax":0.1,
///     "min_order":1,"supplier":2,"status":"active"}"#;
/// let product = parse_product_payload(text).unwrap();
/// assert_eq!(product.quantity, 10);
///
/// assert!(parse_product_payload("not json").is_err());
/// ```
pub fn parse_product_payload(text: &str) -> ValidationResult<NewProduct> {
    let text = text.trim_start_matches('\u{feff}').trim();

    if text.is_empty() {
        return Err(ValidationError::required("payload"));
    }

    let product: NewProduct =
        serde_json::from_str(text).map_err(|e| ValidationError::InvalidFormat {
            field: "payload".to_string(),
            reason: e.to_string(),
        })?;

    validate_new_product(&product)?;

    Ok(product)
}
