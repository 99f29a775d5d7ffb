//! # Sale Recorder
//!
//! Turns line requests into a persisted sale. Header, lines and stock
//! decrements commit together or not at all.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(requests)                                                  │
//! │       │                                                                 │
//! │       ├── empty? ───────────────────────────────► Validation(EmptySale) │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  read products + variants named by the requests                        │
//! │       │                                                                 │
//! │  assemble_sale (kiosko-core): variant rules, stock, price snapshot      │
//! │       │                                                                 │
//! │  INSERT sales, INSERT sale_lines                                        │
//! │       │                                                                 │
//! │  UPDATE stock = stock - qty WHERE stock >= qty   (per line)             │
//! │       │                                                                 │
//! │  COMMIT ──► Sale                                                        │
//! │                                                                         │
//! │  any error before COMMIT: transaction dropped, nothing written          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::Utc;
use kiosko_core::sale::{assemble_sale, StockTarget};
use kiosko_core::{PendingSale, Product, Sale, SaleLineRequest, ValidationError};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::repository::{new_id, product, sale, variant};
use crate::service::with_timeout;

/// Records sales. Obtain with [`crate::Database::checkout`].
#[derive(Debug, Clone)]
pub struct SaleRecorder {
    pool: SqlitePool,
    timeout: Duration,
}

impl SaleRecorder {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Records a sale priced at the current catalog values.
    ///
    /// ## Errors
    /// * `Validation` - empty request list, non-positive quantity, missing variant
    /// * `NotFound` - unknown product or variant
    /// * `InsufficientStock` - not enough stock (duplicate lines are summed)
    /// * `Transient` - storage failure or timeout; nothing was written
    pub async fn record_sale(&self, requests: &[SaleLineRequest]) -> StoreResult<Sale> {
        with_timeout(self.timeout, "record_sale", async {
            if requests.is_empty() {
                return Err(ValidationError::EmptySale.into());
            }

            let now = Utc::now();
            let mut tx = self.pool.begin().await?;

            let mut catalog: Vec<Product> = Vec::new();
            for request in requests {
                if catalog.iter().any(|p| p.id == request.product_id) {
                    continue;
                }
                let mut found = product::get(&mut tx, &request.product_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("Product", &request.product_id))?;
                found.variants = variant::list_for_product(&mut tx, &found.id).await?;
                catalog.push(found);
            }

            let sale_id = new_id();
            let assembled = assemble_sale(&sale_id, requests, &catalog, now, new_id)?;

            sale::insert_sale(&mut tx, &assembled.sale).await?;
            for line in &assembled.sale.lines {
                sale::insert_line(&mut tx, line).await?;
            }

            for (target, quantity) in &assembled.decrements {
                let applied = match target {
                    StockTarget::Product { product_id } => {
                        product::decrement_stock(&mut tx, product_id, *quantity, now).await?
                    }
                    StockTarget::Variant { variant_id } => {
                        variant::decrement_stock(&mut tx, variant_id, *quantity, now).await?
                    }
                };

                if !applied {
                    return Err(stock_race(target, *quantity));
                }
            }

            tx.commit().await?;

            let recorded = assembled.sale;
            info!(
                sale_id = %recorded.id,
                lines = recorded.lines.len(),
                total_units = recorded.total_units,
                total_cents = recorded.total_cents,
                profit_cents = recorded.profit_cents,
                "Sale recorded"
            );
            Ok(recorded)
        })
        .await
    }

    /// Records the pending sale and clears it.
    ///
    /// On failure the pending sale is left exactly as it was so the user can
    /// fix the problem and retry.
    pub async fn record_pending(&self, pending: &mut PendingSale) -> StoreResult<Sale> {
        let recorded = self.record_sale(&pending.requests()).await?;
        pending.discard();
        Ok(recorded)
    }
}

/// A guarded decrement matched no row although the stock check passed.
fn stock_race(target: &StockTarget, quantity: i64) -> StoreError {
    let item = match target {
        StockTarget::Product { product_id } => product_id.clone(),
        StockTarget::Variant { variant_id } => variant_id.clone(),
    };
    StoreError::InsufficientStock {
        item,
        available: 0,
        requested: quantity,
    }
}
