//! # Validation Module
//!
//! Input validation for everything that writes to the entity store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile UI (TypeScript)                                       │
//! │  └── Immediate feedback on empty fields                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + costing/pending                                │
//! │  ├── Field rules (names, non-negative numbers, UUIDs)                  │
//! │  └── Business rules (cost < price, cost floor, stock)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite CHECK / FOREIGN KEY constraints                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kiosko_core::validation::{validate_name, validate_sale_quantity};
//!
//! validate_name("name", "Remera").unwrap();
//! assert!(validate_sale_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{MaterialDraft, ProductDraft, VariantDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name accepted for any catalog entry.
pub const MAX_NAME_LEN: usize = 120;

/// Longest unit-of-measure label.
pub const MAX_UNIT_LEN: usize = 16;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (material, product, variant).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a unit-of-measure label ("m", "kg", "u").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::required("unit"));
    }

    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: MAX_UNIT_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount in cents (cost or price).
///
/// ## Example
/// ```rust
/// use kiosko_core::validation::validate_cents;
///
/// assert!(validate_cents("price", 1099).is_ok());
/// assert!(validate_cents("price", 0).is_ok());
/// assert!(validate_cents("price", -100).is_err());
/// ```
pub fn validate_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::negative(field));
    }

    Ok(())
}

/// Validates a whole-unit stock level (products, variants).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::negative("stock"));
    }

    Ok(())
}

/// Validates a fractional stock level (materials).
///
/// NaN and infinities are rejected as malformed.
pub fn validate_material_stock(stock: f64) -> ValidationResult<()> {
    if !stock.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "stock".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if stock < 0.0 {
        return Err(ValidationError::negative("stock"));
    }

    Ok(())
}

/// Validates how much of a material a component consumes.
///
/// ## Rules
/// - Finite and strictly positive
pub fn validate_component_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if quantity <= 0.0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

/// Validates a sale line quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  New sale: add product                                                  │
/// │                                                                         │
/// │  User enters quantity: 2                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_sale_quantity(2) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock check in PendingSale::add_line                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use kiosko_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a material before it is written.
pub fn validate_material(draft: &MaterialDraft) -> ValidationResult<()> {
    validate_name("name", &draft.name)?;
    validate_cents("cost", draft.cost_cents)?;
    validate_unit(&draft.unit)?;
    validate_material_stock(draft.stock)?;
    Ok(())
}

/// Validates the plain fields of a product.
///
/// The cost/price relationship is checked by [`crate::costing`] because it
/// also depends on the product's components.
pub fn validate_product(draft: &ProductDraft) -> ValidationResult<()> {
    validate_name("name", &draft.name)?;
    validate_cents("cost", draft.cost_cents)?;
    validate_cents("price", draft.price_cents)?;
    validate_stock(draft.stock)?;
    Ok(())
}

/// Validates a variant before it is written.
///
/// ## Rules
/// - Owning product ID must be present
/// - Stock must be strictly positive when creating or editing a variant
pub fn validate_variant(draft: &VariantDraft) -> ValidationResult<()> {
    if draft.product_id.trim().is_empty() {
        return Err(ValidationError::required("product_id"));
    }
    validate_name("name", &draft.name)?;
    if draft.stock <= 0 {
        return Err(ValidationError::must_be_positive("stock"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
