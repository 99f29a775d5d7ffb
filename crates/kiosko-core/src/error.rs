//! # Error Types
//!
//! Domain-specific error types for kiosko-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosko-core errors (this file)                                        │
//! │  ├── CoreError        - Stock, lookup and pending-sale failures        │
//! │  └── ValidationError  - Input and cost/price rule violations           │
//! │                                                                         │
//! │  kiosko-db errors (separate crate)                                     │
//! │  ├── DbError          - Storage failures                               │
//! │  └── StoreError       - What the UI layer receives                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → UI                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the stock of a product or variant.
    ///
    /// ## User Workflow
    /// ```text
    /// Add line "Remera" (qty: 2)  → pending: 2 of 3   ✓
    /// Add line "Remera" (qty: 2)  → would be 4 of 3
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Remera", available: 3, requested: 4 }
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// A referenced product, variant, material, component or sale is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The pending sale already holds the maximum number of distinct lines.
    #[error("A sale cannot have more than {max} lines")]
    PendingSaleFull { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation and business rule errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, unreadable QR payload).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Cost would reach or exceed the sale price.
    #[error("cost would reach or exceed sale price (cost {cost_cents}, price {price_cents})")]
    CostNotBelowPrice { cost_cents: i64, price_cents: i64 },

    /// Manual cost is lower than what the components already cost.
    #[error("cost {cost_cents} is below the component cost {floor_cents}")]
    CostBelowComponentFloor { cost_cents: i64, floor_cents: i64 },

    /// Product has variants, so a sale line must name one.
    #[error("must select a variant of {product}")]
    VariantRequired { product: String },

    /// A sale needs at least one line.
    #[error("at least one product required")]
    EmptySale,

    /// Entity is still referenced and cannot be deleted.
    #[error("{entity} {id} is used by {references} component(s)")]
    InUse {
        entity: String,
        id: String,
        references: i64,
    },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item: "Remera".to_string(),
            available: 3,
            requested: 4,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Remera: available 3, requested 4"
        );

        let err = CoreError::not_found("Product", "abc");
        assert_eq!(err.to_string(), "Product not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");
        assert_eq!(
            ValidationError::EmptySale.to_string(),
            "at least one product required"
        );
        let err = ValidationError::VariantRequired {
            product: "Remera".to_string(),
        };
        assert_eq!(err.to_string(), "must select a variant of Remera");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptySale.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptySale)));
    }
}
