//! # Sale Assembly
//!
//! Turns sale line requests plus the catalog rows read at commit time into
//! an immutable [`Sale`] with per-line and aggregate profit.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request: Remera × 3                                                    │
//! │       │                                                                 │
//! │       ▼  product row read inside the sale transaction                   │
//! │  price $100.00, cost $60.00                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleLine { unit_price: 10000, unit_cost: 6000, qty: 3,                 │
//! │             profit: (10000 - 6000) × 3 = 12000 }   ← frozen             │
//! │                                                                         │
//! │  Sale { total_units: 3, total: 30000, profit: 12000 }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests naming the same `(product, variant)` twice are checked against
//! stock by their combined quantity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pending::{item_label, resolve_variant};
use crate::types::{Product, Sale, SaleLine, SaleLineRequest};
use crate::validation::validate_sale_quantity;

/// Stock decrement the recorder must apply for one sale line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockTarget {
    Product { product_id: String },
    Variant { variant_id: String },
}

/// A sale ready to persist plus the stock effects that go with it.
#[derive(Debug, Clone)]
pub struct AssembledSale {
    pub sale: Sale,
    /// One entry per line, in line order.
    pub decrements: Vec<(StockTarget, i64)>,
}

/// Builds a sale from line requests and freshly read products.
///
/// ## Arguments
/// * `sale_id` - ID for the new sale (line IDs are derived from `new_id`)
/// * `requests` - What is being sold, in display order
/// * `catalog` - Products referenced by the requests, with their variants
/// * `at` - Sale timestamp
/// * `new_id` - Generates line IDs
///
/// ## Errors
/// * `EmptySale` - no requests
/// * `NotFound` - a product or variant is missing from `catalog`
/// * `VariantRequired` - bare product with variants
/// * `InsufficientStock` - combined quantity above the current stock
/// * `InvalidFormat` - a line or sale amount does not fit in `i64` cents
pub fn assemble_sale<F>(
    sale_id: &str,
    requests: &[SaleLineRequest],
    catalog: &[Product],
    at: DateTime<Utc>,
    mut new_id: F,
) -> CoreResult<AssembledSale>
where
    F: FnMut() -> String,
{
    if requests.is_empty() {
        return Err(ValidationError::EmptySale.into());
    }

    let mut requested: HashMap<(&str, Option<&str>), i64> = HashMap::new();
    let mut lines = Vec::with_capacity(requests.len());
    let mut decrements = Vec::with_capacity(requests.len());

    for (position, request) in requests.iter().enumerate() {
        validate_sale_quantity(request.quantity)?;

        let product = catalog
            .iter()
            .find(|p| p.id == request.product_id)
            .ok_or_else(|| CoreError::not_found("Product", &request.product_id))?;
        let variant = resolve_variant(product, request.variant_id.as_deref())?;

        let key = (product.id.as_str(), variant.map(|v| v.id.as_str()));
        // saturating: an absurd combined quantity still fails the stock check
        let total = requested.entry(key).or_insert(0);
        *total = total.saturating_add(request.quantity);

        let available = variant.map_or(product.stock, |v| v.stock);
        if *total > available {
            return Err(CoreError::InsufficientStock {
                item: item_label(product, variant),
                available,
                requested: *total,
            });
        }

        Money::from_cents(product.price_cents)
            .checked_multiply_quantity(request.quantity)
            .ok_or_else(|| amount_out_of_range("total"))?;
        let profit = product
            .unit_margin()
            .checked_multiply_quantity(request.quantity)
            .ok_or_else(|| amount_out_of_range("profit"))?;
        lines.push(SaleLine {
            id: new_id(),
            sale_id: sale_id.to_string(),
            position: position as i64,
            product_id: product.id.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            name_snapshot: product.name.clone(),
            variant_name_snapshot: variant.map(|v| v.name.clone()),
            quantity: request.quantity,
            unit_price_cents: product.price_cents,
            unit_cost_cents: product.cost_cents,
            profit_cents: profit.cents(),
        });

        let target = match variant {
            Some(v) => StockTarget::Variant {
                variant_id: v.id.clone(),
            },
            None => StockTarget::Product {
                product_id: product.id.clone(),
            },
        };
        decrements.push((target, request.quantity));
    }

    let mut total_units: i64 = 0;
    let mut total = Money::zero();
    let mut profit = Money::zero();
    for line in &lines {
        total_units = total_units
            .checked_add(line.quantity)
            .ok_or_else(|| amount_out_of_range("total_units"))?;
        total = total
            .checked_add(line.line_total())
            .ok_or_else(|| amount_out_of_range("total"))?;
        profit = profit
            .checked_add(Money::from_cents(line.profit_cents))
            .ok_or_else(|| amount_out_of_range("profit"))?;
    }

    Ok(AssembledSale {
        sale: Sale {
            id: sale_id.to_string(),
            created_at: at,
            total_units,
            total_cents: total.cents(),
            profit_cents: profit.cents(),
            lines,
        },
        decrements,
    })
}

fn amount_out_of_range(field: &str) -> CoreError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "amount does not fit in cents".to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variant;

    fn product(id: &str, price_cents: i64, cost_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            cost_cents,
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
            variants: Vec::new(),
            components: Vec::new(),
        }
    }

    fn request(product_id: &str, variant_id: Option<&str>, quantity: i64) -> SaleLineRequest {
        SaleLineRequest {
            product_id: product_id.to_string(),
            variant_id: variant_id.map(str::to_string),
            quantity,
        }
    }

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("line-{}", n)
        }
    }

    /// price 100, cost 60, qty 3 → total 300, profit 120.
    #[test]
    fn test_scenario_c_totals_and_profit() {
        let catalog = vec![product("p", 10000, 6000, 10)];
        let assembled =
            assemble_sale("s", &[request("p", None, 3)], &catalog, Utc::now(), ids()).unwrap();

        let sale = &assembled.sale;
        assert_eq!(sale.total_units, 3);
        assert_eq!(sale.total_cents, 30000);
        assert_eq!(sale.profit_cents, 12000);
        assert_eq!(sale.lines[0].unit_price_cents, 10000);
        assert_eq!(sale.lines[0].profit_cents, 12000);
        assert_eq!(
            assembled.decrements,
            vec![(
                StockTarget::Product {
                    product_id: "p".to_string()
                },
                3
            )]
        );
    }

    #[test]
    fn test_multiple_lines_aggregate() {
        let catalog = vec![product("a", 1000, 400, 10), product("b", 2500, 2000, 10)];
        let requests = vec![request("a", None, 2), request("b", None, 1)];
        let sale = assemble_sale("s", &requests, &catalog, Utc::now(), ids())
            .unwrap()
            .sale;

        assert_eq!(sale.total_units, 3);
        assert_eq!(sale.total_cents, 4500);
        assert_eq!(sale.profit_cents, 1200 + 500);
        assert_eq!(sale.lines[1].position, 1);
        assert_eq!(sale.lines[1].id, "line-2");
    }

    #[test]
    fn test_empty_sale_rejected() {
        let err = assemble_sale("s", &[], &[], Utc::now(), ids()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptySale)));
    }

    #[test]
    fn test_duplicate_requests_checked_together() {
        let catalog = vec![product("p", 1000, 500, 3)];
        let requests = vec![request("p", None, 2), request("p", None, 2)];
        let err = assemble_sale("s", &requests, &catalog, Utc::now(), ids()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_combined_quantity_near_i64_max_is_insufficient_stock() {
        let catalog = vec![product("p", 1000, 500, 5)];
        let requests = vec![request("p", None, 2), request("p", None, i64::MAX)];
        let err = assemble_sale("s", &requests, &catalog, Utc::now(), ids()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: i64::MAX,
                ..
            }
        ));
    }

    #[test]
    fn test_amounts_beyond_i64_are_rejected() {
        let catalog = vec![product("p", i64::MAX / 2, 0, i64::MAX)];
        let err = assemble_sale("s", &[request("p", None, 3)], &catalog, Utc::now(), ids())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));

        // each line fits, their sum does not
        let catalog = vec![
            product("a", i64::MAX / 2, 0, 10),
            product("b", i64::MAX / 2, 0, 10),
            product("c", i64::MAX / 2, 0, 10),
        ];
        let requests = vec![request("a", None, 1), request("b", None, 1), request("c", None, 1)];
        let err = assemble_sale("s", &requests, &catalog, Utc::now(), ids()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_variant_line_targets_variant_stock() {
        let now = Utc::now();
        let mut p = product("p", 1000, 500, 0);
        p.variants.push(Variant {
            id: "v".to_string(),
            product_id: "p".to_string(),
            name: "Rojo".to_string(),
            stock: 5,
            created_at: now,
            updated_at: now,
        });
        let catalog = vec![p];

        let bare = assemble_sale("s", &[request("p", None, 1)], &catalog, now, ids());
        assert!(matches!(
            bare,
            Err(CoreError::Validation(ValidationError::VariantRequired { .. }))
        ));

        let assembled =
            assemble_sale("s", &[request("p", Some("v"), 2)], &catalog, now, ids()).unwrap();
        assert_eq!(assembled.sale.lines[0].variant_name_snapshot.as_deref(), Some("Rojo"));
        assert_eq!(
            assembled.decrements[0].0,
            StockTarget::Variant {
                variant_id: "v".to_string()
            }
        );
    }

    #[test]
    fn test_missing_product_is_not_found() {
        let err = assemble_sale("s", &[request("x", None, 1)], &[], Utc::now(), ids()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
