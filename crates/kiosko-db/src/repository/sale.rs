//! # Sale Repository
//!
//! Sales are append-only: there is no update statement in this module.
//!
//! ## Sale Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales                          sale_lines                              │
//! │  ──────────────────             ────────────────────────────────        │
//! │  id                    ◄─────── sale_id                                 │
//! │  created_at                     position                                │
//! │  total_units                    product_id / variant_id   (snapshot)    │
//! │  total_cents                    name_snapshot / variant_name_snapshot   │
//! │  profit_cents                   quantity                                │
//! │                                 unit_price_cents / unit_cost_cents      │
//! │                                 profit_cents                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use kiosko_core::{DateRange, Sale, SaleLine};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const SALE_COLUMNS: &str = "id, created_at, total_units, total_cents, profit_cents";

const LINE_COLUMNS: &str = "l.id, l.sale_id, l.position, l.product_id, l.variant_id, \
     l.name_snapshot, l.variant_name_snapshot, l.quantity, l.unit_price_cents, \
     l.unit_cost_cents, l.profit_cents";

const RANGE_FILTER: &str = "(?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2)";

/// Inserts the header only.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, total_cents = sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (id, created_at, total_units, total_cents, profit_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&sale.id)
    .bind(sale.created_at)
    .bind(sale.total_units)
    .bind(sale.total_cents)
    .bind(sale.profit_cents)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn insert_line(conn: &mut SqliteConnection, line: &SaleLine) -> DbResult<()> {
    debug!(
        sale_id = %line.sale_id,
        product_id = %line.product_id,
        quantity = line.quantity,
        "Inserting sale line"
    );

    sqlx::query(
        r#"
        INSERT INTO sale_lines (
            id, sale_id, position, product_id, variant_id,
            name_snapshot, variant_name_snapshot, quantity,
            unit_price_cents, unit_cost_cents, profit_cents
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(line.position)
    .bind(&line.product_id)
    .bind(&line.variant_id)
    .bind(&line.name_snapshot)
    .bind(&line.variant_name_snapshot)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.unit_cost_cents)
    .bind(line.profit_cents)
    .execute(conn)
    .await?;

    Ok(())
}

/// Sale with its lines.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
    let Some(mut sale) = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {} FROM sale_lines l WHERE l.sale_id = ?1 ORDER BY l.position",
        LINE_COLUMNS
    );
    sale.lines = sqlx::query_as::<_, SaleLine>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Some(sale))
}

/// Sales in the range with their lines, newest first.
pub async fn list(conn: &mut SqliteConnection, range: DateRange) -> DbResult<Vec<Sale>> {
    let sql = format!(
        "SELECT {} FROM sales WHERE {} ORDER BY created_at DESC, id",
        SALE_COLUMNS, RANGE_FILTER
    );
    let mut sales = sqlx::query_as::<_, Sale>(&sql)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&mut *conn)
        .await?;

    let sql = format!(
        "SELECT {} FROM sale_lines l JOIN sales s ON s.id = l.sale_id \
         WHERE (?1 IS NULL OR s.created_at >= ?1) AND (?2 IS NULL OR s.created_at < ?2) \
         ORDER BY l.sale_id, l.position",
        LINE_COLUMNS
    );
    let lines = sqlx::query_as::<_, SaleLine>(&sql)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&mut *conn)
        .await?;

    let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
    for line in lines {
        by_sale.entry(line.sale_id.clone()).or_default().push(line);
    }
    for sale in &mut sales {
        sale.lines = by_sale.remove(&sale.id).unwrap_or_default();
    }

    debug!(count = sales.len(), "Loaded sales");
    Ok(sales)
}
