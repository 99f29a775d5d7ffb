//! # Cost Engine Rules
//!
//! Keeps a product's cost consistent with its bill of materials and rejects
//! price configurations that are unprofitable by construction.
//!
//! ## Cost Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product "Remera" (price $50.00)                                       │
//! │                                                                         │
//! │  components                        material cost    quantity   cost    │
//! │  ──────────                        ─────────────    ────────   ────    │
//! │  Tela                              $10.00 / m       2 m        $20.00  │
//! │  Hilo                              $0.05 / m        30 m       $1.50   │
//! │                                                               ──────   │
//! │  cost floor (Σ, always recomputed from every row)              $21.50   │
//! │                                                                         │
//! │  add component → floor' = floor + new line     must stay < price       │
//! │  remove component → floor' = Σ remaining        clamped at $0.00        │
//! │  manual cost → floor <= cost < price                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored cost is never adjusted by deltas: every change sums the full
//! component list again, so a stale stored value cannot leak into the result.

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::BomLine;
use crate::validation::validate_component_quantity;

/// Cost of `quantity` units of a material costing `material_cost` per unit.
#[inline]
pub fn component_cost(material_cost: Money, quantity: f64) -> Money {
    material_cost.scale(quantity)
}

/// Sum of the costs of all component lines (the product's cost floor).
pub fn cost_floor(lines: &[BomLine]) -> Money {
    lines.iter().map(BomLine::cost).sum::<Money>().clamp_non_negative()
}

/// Ensures `cost < price`.
pub fn ensure_below_price(cost: Money, price: Money) -> Result<(), ValidationError> {
    if cost >= price {
        return Err(ValidationError::CostNotBelowPrice {
            cost_cents: cost.cents(),
            price_cents: price.cents(),
        });
    }
    Ok(())
}

/// Computes the product cost after adding a component.
///
/// ## Arguments
/// * `existing` - Components the product already has
/// * `material_cost` - Current unit cost of the material being added
/// * `quantity` - How much of it the product consumes (> 0)
/// * `price` - Product sale price
///
/// ## Returns
/// The new cost (fresh sum over all components including the new one).
///
/// ## Errors
/// `ValidationError::CostNotBelowPrice` when the new cost reaches the price.
///
/// ## Example
/// ```rust
/// use kiosko_core::costing::cost_after_addition;
/// use kiosko_core::money::Money;
///
/// let cost = cost_after_addition(&[], Money::from_cents(1000), 2.0, Money::from_cents(5000));
/// assert_eq!(cost.unwrap().cents(), 2000);
/// ```
pub fn cost_after_addition(
    existing: &[BomLine],
    material_cost: Money,
    quantity: f64,
    price: Money,
) -> CoreResult<Money> {
    validate_component_quantity(quantity)?;

    // saturates: a cost too large for i64 is still >= price
    let new_cost = cost_floor(existing).saturating_add(component_cost(material_cost, quantity));
    ensure_below_price(new_cost, price)?;

    Ok(new_cost)
}

/// Computes the product cost after a component was removed.
///
/// `remaining` is the component list without the removed row. Never
/// negative. Removing cost can never break `cost < price`.
pub fn cost_after_removal(remaining: &[BomLine]) -> Money {
    cost_floor(remaining)
}

/// Checks a manually entered cost against the components and the price.
///
/// ## Rules
/// - with components: `cost >= cost_floor(lines)`
/// - always: `cost < price`
pub fn check_manual_cost(cost: Money, price: Money, lines: &[BomLine]) -> CoreResult<()> {
    if !lines.is_empty() {
        let floor = cost_floor(lines);
        if cost < floor {
            return Err(ValidationError::CostBelowComponentFloor {
                cost_cents: cost.cents(),
                floor_cents: floor.cents(),
            }
            .into());
        }
    }

    ensure_below_price(cost, price)?;
    Ok(())
}

/// Recomputes a product's cost after one of its materials changed price.
///
/// Returns the fresh floor, or `CostNotBelowPrice` if the product would no
/// longer be profitable.
pub fn cost_after_material_change(lines: &[BomLine], price: Money) -> CoreResult<Money> {
    let cost = cost_floor(lines);
    ensure_below_price(cost, price)?;
    Ok(cost)
}

// =============================================================================
// Unit Tests
// =============================================================================
