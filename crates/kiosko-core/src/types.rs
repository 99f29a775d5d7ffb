//! # Domain Types
//!
//! Core domain types used throughout Kiosko.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                         │
//! │  │    Material     │◄───────│    Component    │  (weak reference)       │
//! │  │  cost_cents     │        │  quantity (f64) │                         │
//! │  │  unit, stock    │        └────────┬────────┘                         │
//! │  └─────────────────┘                 │ owned by                         │
//! │                             ┌────────▼────────┐      ┌──────────────┐   │
//! │                             │     Product     │─────►│   Variant    │   │
//! │                             │  cost < price   │ owns │  own stock   │   │
//! │                             └────────┬────────┘      └──────────────┘   │
//! │                                      │ snapshot at sale time            │
//! │                             ┌────────▼────────┐      ┌──────────────┐   │
//! │                             │      Sale       │─────►│   SaleLine   │   │
//! │                             │   immutable     │ owns │  profit      │   │
//! │                             └─────────────────┘      └──────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write-side inputs are the `*Draft` structs: `id: None` creates,
//! `id: Some(..)` edits an existing row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Material
// =============================================================================

/// A raw input consumed by products (fabric, thread, resin...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Material {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique by convention only.
    pub name: String,

    /// Cost of one `unit` of this material, in cents.
    pub cost_cents: i64,

    /// Unit-of-measure label ("m", "g", "u").
    pub unit: String,

    /// Quantity on hand, in `unit`s. Edited directly, never decremented by sales.
    pub stock: f64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Returns the unit cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

/// Input for creating or editing a material.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialDraft {
    pub id: Option<String>,
    pub name: String,
    pub cost_cents: i64,
    pub unit: String,
    pub stock: f64,
}

// =============================================================================
// Product
// =============================================================================

/// A sellable catalog entry.
///
/// ## Invariants
/// - `cost_cents < price_cents` (checked on every write)
/// - with components: `cost_cents >= Σ component cost`; the stored cost is
///   overwritten with the live component total whenever a component changes
/// - with variants: stock is tracked per variant and the bare product is not sellable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    pub name: String,

    /// Cost in cents, derived from components when any exist.
    pub cost_cents: i64,

    /// Sale price in cents. Variants share it.
    pub price_cents: i64,

    /// Units on hand when the product has no variants.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Variants (loaded separately).
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub variants: Vec<Variant>,

    /// Bill of materials (loaded separately).
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub components: Vec<BomLine>,
}

impl Product {
    /// Returns the cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Profit on a single unit at the current price and cost.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.price() - self.cost()
    }

    /// Whether sales must target a specific variant.
    #[inline]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Finds one of this product's variants by ID.
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// Input for creating or editing a product.
///
/// Variants and components are managed through their own operations.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub name: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub stock: i64,
}

// =============================================================================
// Variant
// =============================================================================

/// A named sub-SKU ("Rojo", "XL") with its own stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Variant {
    pub id: String,
    /// Owning product (exclusive).
    pub product_id: String,
    pub name: String,
    pub stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or editing a variant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantDraft {
    pub id: Option<String>,
    pub product_id: String,
    pub name: String,
    pub stock: i64,
}

// =============================================================================
// Components
// =============================================================================

/// One bill-of-materials row: the product consumes `quantity` units of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Component {
    pub id: String,
    pub product_id: String,
    pub material_id: String,
    /// Always > 0.
    pub quantity: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A component joined with the material it references.
///
/// This is the shape cost computations work on: the material's current
/// cost is read alongside the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BomLine {
    /// Component ID.
    pub id: String,
    pub product_id: String,
    pub material_id: String,
    pub material_name: String,
    pub unit: String,
    /// Current unit cost of the material.
    pub material_cost_cents: i64,
    pub quantity: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl BomLine {
    /// Cost this line contributes to the product: `material cost × quantity`,
    /// rounded to cents.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.material_cost_cents).scale(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable, completed sale.
///
/// Every figure is a snapshot taken when the sale was recorded; later
/// price or cost changes never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// When the sale was recorded (`fecha`).
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Σ line quantities.
    pub total_units: i64,
    /// Σ unit price × quantity.
    pub total_cents: i64,
    /// Σ line profit.
    pub profit_cents: i64,
    /// Lines in the order they were added (loaded separately).
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<SaleLine>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    /// Zero-based position within the sale.
    pub position: i64,
    pub product_id: String,
    pub variant_id: Option<String>,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Variant name at time of sale (frozen).
    pub variant_name_snapshot: Option<String>,
    pub quantity: i64,
    /// Sale price per unit at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Cost per unit at time of sale (frozen).
    pub unit_cost_cents: i64,
    /// (unit price − unit cost) × quantity.
    pub profit_cents: i64,
}

impl SaleLine {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A request to sell `quantity` units of a product (or one of its variants).
///
/// This is what `record_sale` consumes; prices are looked up at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
