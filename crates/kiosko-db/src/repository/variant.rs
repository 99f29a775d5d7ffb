//! # Variant Repository

use chrono::{DateTime, Utc};
use kiosko_core::Variant;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const COLUMNS: &str = "id, product_id, name, stock, created_at, updated_at";

pub async fn list_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<Variant>> {
    let sql = format!(
        "SELECT {} FROM variants WHERE product_id = ?1 ORDER BY name COLLATE NOCASE, id",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, Variant>(&sql)
        .bind(product_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn list_all(conn: &mut SqliteConnection) -> DbResult<Vec<Variant>> {
    let sql = format!(
        "SELECT {} FROM variants ORDER BY product_id, name COLLATE NOCASE, id",
        COLUMNS
    );
    let rows = sqlx::query_as::<_, Variant>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Variant>> {
    let sql = format!("SELECT {} FROM variants WHERE id = ?1", COLUMNS);
    let row = sqlx::query_as::<_, Variant>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn insert(conn: &mut SqliteConnection, variant: &Variant) -> DbResult<()> {
    debug!(id = %variant.id, product_id = %variant.product_id, "Inserting variant");

    sqlx::query(
        r#"
        INSERT INTO variants (id, product_id, name, stock, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&variant.id)
    .bind(&variant.product_id)
    .bind(&variant.name)
    .bind(variant.stock)
    .bind(variant.created_at)
    .bind(variant.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, variant: &Variant) -> DbResult<bool> {
    debug!(id = %variant.id, stock = variant.stock, "Updating variant");

    let result = sqlx::query(
        "UPDATE variants SET name = ?2, stock = ?3, updated_at = ?4 WHERE id = ?1",
    )
    .bind(&variant.id)
    .bind(&variant.name)
    .bind(variant.stock)
    .bind(variant.updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    debug!(id = %id, "Deleting variant");

    let result = sqlx::query("DELETE FROM variants WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Guarded decrement, see [`crate::repository::product::decrement_stock`].
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, quantity, "Decrementing variant stock");

    let result = sqlx::query(
        r#"
        UPDATE variants
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
