//! # Cart Planning
//!
//! Validates carts and stock updates against a snapshot of current stock
//! before any statement is written.
//!
//! ## Validate First, Write Second
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Submission (one transaction)                    │
//! │                                                                         │
//! │  1. ims-db reads stock for every product id in the cart                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. plan_cart(lines, stock) ← THIS MODULE (pure)                       │
//! │       │                                                                 │
//! │       ├── empty?             → CoreError::EmptyCart                     │
//! │       ├── quantity <= 0?     → ValidationError::MustBePositive          │
//! │       ├── unknown product?   → CoreError::ProductNotFound(id)           │
//! │       ├── not enough stock?  → CoreError::InsufficientStock             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Vec<PlannedLine> → ims-db writes every line, then COMMIT            │
//! │                                                                         │
//! │  Any error in step 2 means no write was ever issued.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are checked in submission order, and the first failing line
//! decides the error. Repeated product ids draw on the same stock, so two
//! lines of 3 against a stock of 5 fail on the second line.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartLine, StockLine, StockUpdatePolicy};
use crate::validation::validate_quantity;
use crate::MAX_CART_LINES;

/// A cart line that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub quantity: i64,

    /// Stock left for this product once this line (and every earlier line
    /// for the same product) is shipped.
    pub remaining_stock: i64,
}

/// Rejects empty carts and carts over [`MAX_CART_LINES`] lines.
///
/// Needs no stock snapshot, so callers run it before touching the store.
pub fn check_cart_size(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if lines.len() > MAX_CART_LINES {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    Ok(())
}

/// Validates a cart against current stock levels.
///
/// ## Arguments
/// * `lines` - Cart lines in submission order
/// * `stock` - Current stock per product id; ids absent from the map are
///   unknown products
///
/// ## Returns
/// One [`PlannedLine`] per cart line, in submission order.
pub fn plan_cart(lines: &[CartLine], stock: &HashMap<i64, i64>) -> CoreResult<Vec<PlannedLine>> {
    check_cart_size(lines)?;

    let mut remaining: HashMap<i64, i64> = HashMap::with_capacity(lines.len());
    let mut planned = Vec::with_capacity(lines.len());

    for line in lines {
        validate_quantity(line.quantity)?;

        let available = match remaining.get(&line.id) {
            Some(left) => *left,
            None => *stock
                .get(&line.id)
                .ok_or(CoreError::ProductNotFound(line.id))?,
        };

        if line.quantity > available {
            return Err(CoreError::InsufficientStock {
                product_id: line.id,
                available,
                requested: line.quantity,
            });
        }

        let left = available - line.quantity;
        remaining.insert(line.id, left);

        planned.push(PlannedLine {
            product_id: line.id,
            quantity: line.quantity,
            remaining_stock: left,
        });
    }

    Ok(planned)
}

// =============================================================================
// Stock Updates
// =============================================================================

/// A stock update line that will be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAdjustment {
    pub product_id: i64,
    pub quantity: i64,
}

/// The lines of a stock update that survive the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    pub apply: Vec<PlannedAdjustment>,
    pub skipped: usize,
}

/// Sorts stock update lines into applied and skipped according to `policy`.
///
/// ## Rules
/// | line                         | Lenient | Strict                |
/// |------------------------------|---------|-----------------------|
/// | quantity missing or <= 0     | skip    | `MustBePositive`      |
/// | product_id missing           | skip    | `Required`            |
/// | product_id not in `known`    | skip    | `ProductNotFound(id)` |
///
/// Stock is not floored at zero: applying a valid line may drive a
/// product negative.
pub fn plan_stock_updates<F>(
    lines: &[StockLine],
    policy: StockUpdatePolicy,
    is_known: F,
) -> CoreResult<StockPlan>
where
    F: Fn(i64) -> bool,
{
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let strict = policy == StockUpdatePolicy::Strict;
    let mut plan = StockPlan::default();

    for line in lines {
        let quantity = match line.quantity {
            Some(q) if q > 0 => q,
            _ if strict => return Err(ValidationError::must_be_positive("quantity").into()),
            _ => {
                plan.skipped += 1;
                continue;
            }
        };

        let product_id = match line.product_id {
            Some(id) => id,
            None if strict => return Err(ValidationError::required("product_id").into()),
            None => {
                plan.skipped += 1;
                continue;
            }
        };

        if !is_known(product_id) {
            if strict {
                return Err(CoreError::ProductNotFound(product_id));
            }
            plan.skipped += 1;
            continue;
        }

        plan.apply.push(PlannedAdjustment {
            product_id,
            quantity,
        });
    }

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================
