//! # Product Repository
//!
//! Product rows plus loaders that attach variants and BOM lines.
//!
//! ## Stock Decrement
//! ```text
//! UPDATE products SET stock = stock - :qty
//! WHERE id = :id AND stock >= :qty        ← guard
//!
//! rows_affected = 0  →  missing product or not enough stock
//! ```
//! The guard is the last line of defense against overselling; the sale
//! recorder has already checked stock against the rows it read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kiosko_core::{BomLine, Product, Variant};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{component, variant};

const COLUMNS: &str = "id, name, cost_cents, price_cents, stock, created_at, updated_at";

/// Product rows only (no variants or components), by name.
pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let sql = format!("SELECT {} FROM products ORDER BY name COLLATE NOCASE, id", COLUMNS);
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

/// Product row only.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", COLUMNS);
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Product with its variants and BOM lines.
pub async fn get_full(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let Some(mut product) = get(&mut *conn, id).await? else {
        return Ok(None);
    };

    product.variants = variant::list_for_product(&mut *conn, id).await?;
    product.components = component::load_bom(&mut *conn, id).await?;

    Ok(Some(product))
}

/// Every product with its variants and BOM lines, in three queries.
pub async fn list_full(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let mut products = list(&mut *conn).await?;

    let mut variants: HashMap<String, Vec<Variant>> = HashMap::new();
    for v in variant::list_all(&mut *conn).await? {
        variants.entry(v.product_id.clone()).or_default().push(v);
    }

    let mut lines: HashMap<String, Vec<BomLine>> = HashMap::new();
    for line in component::load_all_bom(&mut *conn).await? {
        lines.entry(line.product_id.clone()).or_default().push(line);
    }

    for product in &mut products {
        product.variants = variants.remove(&product.id).unwrap_or_default();
        product.components = lines.remove(&product.id).unwrap_or_default();
    }

    Ok(products)
}

pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, name = %product.name, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (id, name, cost_cents, price_cents, stock, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.cost_cents)
    .bind(product.price_cents)
    .bind(product.stock)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrites the editable fields. Returns whether the row existed.
pub async fn update(conn: &mut SqliteConnection, product: &Product) -> DbResult<bool> {
    debug!(
        id = %product.id,
        cost_cents = product.cost_cents,
        price_cents = product.price_cents,
        "Updating product"
    );

    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = ?2, cost_cents = ?3, price_cents = ?4, stock = ?5, updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.cost_cents)
    .bind(product.price_cents)
    .bind(product.stock)
    .bind(product.updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Writes a recomputed or manual cost.
pub async fn set_cost(
    conn: &mut SqliteConnection,
    id: &str,
    cost_cents: i64,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, cost_cents, "Setting product cost");

    let result = sqlx::query("UPDATE products SET cost_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(cost_cents)
        .bind(at)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Removes `quantity` units if at least that many are in stock.
///
/// Returns `false` (and changes nothing) otherwise.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, quantity, "Decrementing product stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Deletes the product together with its variants and components.
///
/// Returns `(variants_deleted, components_deleted)`, or `None` when the
/// product did not exist.
pub async fn delete_cascade(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<(u64, u64)>> {
    debug!(id = %id, "Deleting product with variants and components");

    let variants = sqlx::query("DELETE FROM variants WHERE product_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let components = sqlx::query("DELETE FROM components WHERE product_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok((deleted == 1).then_some((variants, components)))
}
