//! # Component Repository
//!
//! Component rows and their BOM view (component joined with the material's
//! current name, unit and cost). Cost recomputation always reads the BOM
//! view, never the stored product cost.

use kiosko_core::{BomLine, Component};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const BOM_SELECT: &str = r#"
    SELECT
        c.id,
        c.product_id,
        c.material_id,
        m.name AS material_name,
        m.unit,
        m.cost_cents AS material_cost_cents,
        c.quantity,
        c.created_at
    FROM components c
    JOIN materials m ON m.id = c.material_id
"#;

pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Component>> {
    let row = sqlx::query_as::<_, Component>(
        "SELECT id, product_id, material_id, quantity, created_at FROM components WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn insert(conn: &mut SqliteConnection, component: &Component) -> DbResult<()> {
    debug!(
        id = %component.id,
        product_id = %component.product_id,
        material_id = %component.material_id,
        quantity = component.quantity,
        "Inserting component"
    );

    sqlx::query(
        r#"
        INSERT INTO components (id, product_id, material_id, quantity, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&component.id)
    .bind(&component.product_id)
    .bind(&component.material_id)
    .bind(component.quantity)
    .bind(component.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    debug!(id = %id, "Deleting component");

    let result = sqlx::query("DELETE FROM components WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Current BOM of one product, oldest component first.
pub async fn load_bom(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Vec<BomLine>> {
    let sql = format!("{} WHERE c.product_id = ?1 ORDER BY c.created_at, c.id", BOM_SELECT);
    let rows = sqlx::query_as::<_, BomLine>(&sql)
        .bind(product_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// BOM lines of every product.
pub async fn load_all_bom(conn: &mut SqliteConnection) -> DbResult<Vec<BomLine>> {
    let sql = format!("{} ORDER BY c.product_id, c.created_at, c.id", BOM_SELECT);
    let rows = sqlx::query_as::<_, BomLine>(&sql).fetch_all(conn).await?;
    Ok(rows)
}
