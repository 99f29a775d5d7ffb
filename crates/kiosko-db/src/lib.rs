//! # kiosko-db: Entity Store for Kiosko
//!
//! SQLite storage plus the transactional services the UI calls. Business
//! rules live in `kiosko-core`; this crate reads rows, applies those rules
//! and commits, one transaction per logical operation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosko Data Flow                                 │
//! │                                                                         │
//! │  UI action (add component, record sale, open dashboard)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kiosko-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │   │
//! │  │   │   Database    │   │    Services    │   │ Repositories │    │   │
//! │  │   │   (pool.rs)   │──►│ CatalogService │──►│ material     │    │   │
//! │  │   │  DbConfig     │   │ SaleRecorder   │   │ product      │    │   │
//! │  │   │  SqlitePool   │   │ ReportService  │   │ variant ...  │    │   │
//! │  │   └───────────────┘   └───────┬────────┘   └──────────────┘    │   │
//! │  │                               │ rules                           │   │
//! │  │                               ▼                                 │   │
//! │  │                         kiosko-core                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (KIOSKO_DB_PATH, default ./kiosko.db)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and service error types
//! - [`repository`] - SQL per table group
//! - [`service`] - Catalog, checkout and reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosko_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let component = db.catalog().add_component(&product_id, &material_id, 2.0).await?;
//! let sale = db.checkout().record_sale(&requests).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, DbError, ErrorKind, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use service::{CatalogService, ReportService, SaleRecorder, ScanMatch};
