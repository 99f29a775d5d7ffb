//! # Pending Sale
//!
//! The in-memory sale being assembled before it is recorded, and the stock
//! rules that guard it.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌───────┐  add_line   ┌──────────┐  add / update / remove            │
//! │   │ Empty │────────────►│ Building │◄──────────────┐                   │
//! │   └───────┘             └────┬─────┘───────────────┘                   │
//! │       ▲                      │                                          │
//! │       │   discard / last     │ record (kiosko-db SaleRecorder)          │
//! │       └──── line removed ────┤                                          │
//! │                              ▼                                          │
//! │                        Committed → cleared back to Empty                │
//! │                                                                         │
//! │  Nothing here is persisted: killing the app loses the pending sale.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Rules
//! - A product with variants is only sellable through one of its variants.
//! - Lines are identified by `(product_id, variant_id)`; `None` only matches `None`.
//! - The cumulative quantity of a line never exceeds the stock seen when the
//!   line was first added. A rejected call leaves the pending sale untouched.
//!
//! Stock here is advisory; the authoritative check runs again inside the
//! sale transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleLineRequest, Variant};
use crate::validation::validate_sale_quantity;
use crate::MAX_PENDING_LINES;

// =============================================================================
// Sellable Item Resolution
// =============================================================================

/// Picks the stock bucket a sale line draws from.
///
/// ## Returns
/// * `Ok(None)` - product has no variants, sell against `product.stock`
/// * `Ok(Some(variant))` - sell against the variant's stock
///
/// ## Errors
/// * `VariantRequired` - product has variants but none was selected
/// * `NotFound` - the variant does not belong to this product
pub fn resolve_variant<'a>(
    product: &'a Product,
    variant_id: Option<&str>,
) -> CoreResult<Option<&'a Variant>> {
    match variant_id {
        None if product.has_variants() => Err(ValidationError::VariantRequired {
            product: product.name.clone(),
        }
        .into()),
        None => Ok(None),
        Some(id) => product
            .variant(id)
            .map(Some)
            .ok_or_else(|| CoreError::not_found("Variant", id)),
    }
}

/// Display label for stock errors: "Remera" or "Remera (Rojo)".
pub fn item_label(product: &Product, variant: Option<&Variant>) -> String {
    match variant {
        Some(v) => format!("{} ({})", product.name, v.name),
        None => product.name.clone(),
    }
}

// =============================================================================
// Pending Line
// =============================================================================

/// A line in the pending sale.
///
/// Product data is copied when the line is first added so the UI shows
/// consistent figures even if the catalog changes meanwhile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingLine {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub name: String,
    pub variant_name: Option<String>,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// Stock of the product/variant when the line was added.
    pub available: i64,
    pub quantity: i64,
}

impl PendingLine {
    fn new(product: &Product, variant: Option<&Variant>, quantity: i64) -> Self {
        PendingLine {
            product_id: product.id.clone(),
            variant_id: variant.map(|v| v.id.clone()),
            name: product.name.clone(),
            variant_name: variant.map(|v| v.name.clone()),
            unit_price_cents: product.price_cents,
            unit_cost_cents: product.cost_cents,
            available: variant.map_or(product.stock, |v| v.stock),
            quantity,
        }
    }

    /// Whether this line is the `(product_id, variant_id)` pair.
    pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }

    fn label(&self) -> String {
        match &self.variant_name {
            Some(v) => format!("{} ({})", self.name, v),
            None => self.name.clone(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// (Unit price − unit cost) × quantity.
    pub fn line_profit(&self) -> Money {
        (Money::from_cents(self.unit_price_cents) - Money::from_cents(self.unit_cost_cents))
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Pending Sale
// =============================================================================

/// Observable state of a pending sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    /// No lines yet.
    Empty,
    /// At least one line.
    Building,
}

/// The sale being assembled in a "new sale" session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingSale {
    lines: Vec<PendingLine>,
    #[ts(as = "String")]
    opened_at: DateTime<Utc>,
}

impl PendingSale {
    /// Creates a new empty pending sale.
    pub fn new() -> Self {
        PendingSale {
            lines: Vec::new(),
            opened_at: Utc::now(),
        }
    }

    /// Adds units of a product (or variant) or grows the matching line.
    ///
    /// ## Behavior
    /// ```text
    /// validate qty > 0
    ///      │
    /// resolve variant ── product has variants, none given ──► VariantRequired
    ///      │
    /// available = variant.stock or product.stock
    ///      │
    /// available == 0 ─────────────────────────────────────► InsufficientStock
    ///      │
    /// line exists? ── existing + qty > available ─────────► InsufficientStock
    ///      │       └─ else grow line, refresh its stock snapshot
    /// new line ───── qty > available ─────────────────────► InsufficientStock
    /// ```
    pub fn add_line(
        &mut self,
        product: &Product,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        validate_sale_quantity(quantity)?;

        let variant = resolve_variant(product, variant_id)?;
        let available = variant.map_or(product.stock, |v| v.stock);
        let label = item_label(product, variant);

        if available <= 0 {
            return Err(CoreError::InsufficientStock {
                item: label,
                available: 0,
                requested: quantity,
            });
        }

        let variant_id = variant.map(|v| v.id.as_str());
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&product.id, variant_id))
        {
            // saturating: an absurd total still fails the stock check
            let requested = line.quantity.saturating_add(quantity);
            if requested > available {
                return Err(CoreError::InsufficientStock {
                    item: label,
                    available,
                    requested,
                });
            }
            line.quantity = requested;
            line.available = available;
            return Ok(());
        }

        if quantity > available {
            return Err(CoreError::InsufficientStock {
                item: label,
                available,
                requested: quantity,
            });
        }

        if self.lines.len() >= MAX_PENDING_LINES {
            return Err(CoreError::PendingSaleFull {
                max: MAX_PENDING_LINES,
            });
        }

        self.lines.push(PendingLine::new(product, variant, quantity));
        Ok(())
    }

    /// Sets the quantity of an existing line.
    ///
    /// ## Behavior
    /// - quantity < 1: the line is removed
    /// - quantity above the line's stock: `InsufficientStock`, nothing changes
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity < 1 {
            return self.remove_line(product_id, variant_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, variant_id))
            .ok_or_else(|| CoreError::not_found("Sale line", product_id))?;

        if quantity > line.available {
            return Err(CoreError::InsufficientStock {
                item: line.label(),
                available: line.available,
                requested: quantity,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by its `(product_id, variant_id)` identity.
    pub fn remove_line(&mut self, product_id: &str, variant_id: Option<&str>) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| !l.matches(product_id, variant_id));

        if self.lines.len() == initial_len {
            Err(CoreError::not_found("Sale line", product_id))
        } else {
            Ok(())
        }
    }

    /// Drops every line; the session starts over.
    pub fn discard(&mut self) {
        self.lines.clear();
        self.opened_at = Utc::now();
    }

    pub fn state(&self) -> PendingState {
        if self.lines.is_empty() {
            PendingState::Empty
        } else {
            PendingState::Building
        }
    }

    pub fn lines(&self) -> &[PendingLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Quantity of a given line, 0 when absent.
    pub fn quantity_of(&self, product_id: &str, variant_id: Option<&str>) -> i64 {
        self.lines
            .iter()
            .find(|l| l.matches(product_id, variant_id))
            .map_or(0, |l| l.quantity)
    }

    /// Σ quantities.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().fold(0i64, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Σ line totals at the prices captured in the lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(PendingLine::line_total).sum()
    }

    /// Σ line profits at the prices captured in the lines.
    pub fn profit(&self) -> Money {
        self.lines.iter().map(PendingLine::line_profit).sum()
    }

    /// The lines as requests for the sale recorder.
    pub fn requests(&self) -> Vec<SaleLineRequest> {
        self.lines
            .iter()
            .map(|l| SaleLineRequest {
                product_id: l.product_id.clone(),
                variant_id: l.variant_id.clone(),
                quantity: l.quantity,
            })
            .collect()
    }
}

impl Default for PendingSale {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
