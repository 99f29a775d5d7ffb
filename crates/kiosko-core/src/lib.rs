//! # kiosko-core: Pure Business Logic for Kiosko
//!
//! Costing, stock and sale rules for a small shop that manufactures what it
//! sells. Everything here is deterministic and free of I/O; the SQLite layer
//! in `kiosko-db` reads rows, calls into this crate, and writes the result.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kiosko Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile UI (React Native)                        │   │
//! │  │   Materials ──► Products ──► Scan/New Sale ──► Dashboard        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ generated TS bindings                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ kiosko-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ costing  │ │ pending  │ │   sale   │ │   statistics     │  │   │
//! │  │   │ BOM cost │ │ stock    │ │ snapshot │ │   dashboard      │  │   │
//! │  │   │ < price  │ │ checks   │ │ + profit │ │   aggregation    │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kiosko-db (Entity Store)                        │   │
//! │  │        SQLite, migrations, repositories, transactional services │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Material, Product, Variant, Component, Sale)
//! - [`money`] - Integer-cent money type
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules applied before every write
//! - [`costing`] - Cost floor derived from components, `cost < price`
//! - [`pending`] - In-progress sale with stock checks per line
//! - [`sale`] - Assembly of an immutable sale with frozen prices and profit
//! - [`statistics`] - Dashboard aggregation
//! - [`scan`] - QR label payloads
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosko_core::costing::cost_after_addition;
//! use kiosko_core::money::Money;
//!
//! // 2 m of fabric at $10.00/m on a $50.00 shirt
//! let cost = cost_after_addition(&[], Money::from_cents(1000), 2.0, Money::from_cents(5000));
//! assert_eq!(cost.unwrap().cents(), 2000);
//!
//! // 7 m would cost $70.00 and is rejected
//! let too_much = cost_after_addition(&[], Money::from_cents(1000), 7.0, Money::from_cents(5000));
//! assert!(too_much.is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod money;
pub mod pending;
pub mod sale;
pub mod scan;
pub mod statistics;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pending::{PendingLine, PendingSale, PendingState};
pub use scan::ScanPayload;
pub use statistics::{DailySales, DateRange, ProductSales, Statistics};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in one pending sale.
pub const MAX_PENDING_LINES: usize = 100;

/// Best sellers shown on the dashboard when the caller does not say.
pub const DEFAULT_TOP_N: usize = 5;
