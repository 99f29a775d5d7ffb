//! # Material Repository
//!
//! Raw materials. A material referenced by components cannot be deleted
//! (the FK is `ON DELETE RESTRICT`); callers check
//! [`count_references`] first to report a readable error.

use kiosko_core::Material;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const COLUMNS: &str = "id, name, cost_cents, unit, stock, created_at, updated_at";

/// All materials, by name.
pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Material>> {
    let sql = format!("SELECT {} FROM materials ORDER BY name COLLATE NOCASE, id", COLUMNS);
    let rows = sqlx::query_as::<_, Material>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Material>> {
    let sql = format!("SELECT {} FROM materials WHERE id = ?1", COLUMNS);
    let row = sqlx::query_as::<_, Material>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn insert(conn: &mut SqliteConnection, material: &Material) -> DbResult<()> {
    debug!(id = %material.id, name = %material.name, "Inserting material");

    sqlx::query(
        r#"
        INSERT INTO materials (id, name, cost_cents, unit, stock, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&material.id)
    .bind(&material.name)
    .bind(material.cost_cents)
    .bind(&material.unit)
    .bind(material.stock)
    .bind(material.created_at)
    .bind(material.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrites the editable fields. Returns whether the row existed.
pub async fn update(conn: &mut SqliteConnection, material: &Material) -> DbResult<bool> {
    debug!(id = %material.id, cost_cents = material.cost_cents, "Updating material");

    let result = sqlx::query(
        r#"
        UPDATE materials
        SET name = ?2, cost_cents = ?3, unit = ?4, stock = ?5, updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&material.id)
    .bind(&material.name)
    .bind(material.cost_cents)
    .bind(&material.unit)
    .bind(material.stock)
    .bind(material.updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Returns whether a row was deleted.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    debug!(id = %id, "Deleting material");

    let result = sqlx::query("DELETE FROM materials WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Number of component rows that use the material.
pub async fn count_references(conn: &mut SqliteConnection, id: &str) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM components WHERE material_id = ?1")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// IDs of the products whose BOM includes the material.
pub async fn products_using(conn: &mut SqliteConnection, id: &str) -> DbResult<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT product_id FROM components WHERE material_id = ?1 ORDER BY product_id",
    )
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}
