//! # Repository Module
//!
//! SQL for every table, one module per table group.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (one logical operation)                                        │
//! │       │                                                                 │
//! │       │  let mut tx = pool.begin().await?;                              │
//! │       │                                                                 │
//! │       ├──► product::get(&mut tx, id)                                   │
//! │       ├──► component::load_bom(&mut tx, id)                            │
//! │       ├──► component::insert(&mut tx, &row)                            │
//! │       └──► product::set_cost(&mut tx, id, cost, now)                   │
//! │       │                                                                 │
//! │       │  tx.commit().await?;   (drop = rollback)                        │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions take `&mut SqliteConnection` so the same statement runs on a
//! pooled connection or inside a transaction. None of them commit.
//!
//! ## Available Repositories
//!
//! - [`material`] - Materials and their references from components
//! - [`product`] - Products, guarded stock decrement
//! - [`variant`] - Variants, guarded stock decrement
//! - [`component`] - Component rows and BOM lines joined with materials
//! - [`sale`] - Sale headers and lines

pub mod component;
pub mod material;
pub mod product;
pub mod sale;
pub mod variant;

/// Fresh UUID v4 string for a new row.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
