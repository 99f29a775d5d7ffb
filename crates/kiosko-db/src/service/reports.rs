//! # Report Service
//!
//! Read-only views over recorded sales. Statistics always come back in the
//! single [`Statistics`] shape, whatever the range.

use std::time::Duration;

use kiosko_core::statistics::aggregate;
use kiosko_core::{DateRange, Sale, Statistics};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::sale;
use crate::service::with_timeout;

/// Statistics and sale history. Obtain with [`crate::Database::reports`].
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
    timeout: Duration,
}

impl ReportService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Dashboard figures for the sales in `range`.
    pub async fn get_statistics(&self, range: DateRange, top_n: usize) -> StoreResult<Statistics> {
        with_timeout(self.timeout, "get_statistics", async {
            let mut conn = self.pool.acquire().await?;
            let sales = sale::list(&mut conn, range).await?;

            let stats = aggregate(&sales, top_n);
            debug!(
                total_sales = stats.total_sales,
                total_profit_cents = stats.total_profit_cents,
                "Statistics computed"
            );
            Ok(stats)
        })
        .await
    }

    /// Sales in `range`, newest first, with their lines.
    pub async fn list_sales(&self, range: DateRange) -> StoreResult<Vec<Sale>> {
        with_timeout(self.timeout, "list_sales", async {
            let mut conn = self.pool.acquire().await?;
            Ok(sale::list(&mut conn, range).await?)
        })
        .await
    }

    pub async fn get_sale(&self, id: &str) -> StoreResult<Sale> {
        with_timeout(self.timeout, "get_sale", async {
            let mut conn = self.pool.acquire().await?;
            sale::get(&mut conn, id)
                .await?
                .ok_or_else(|| StoreError::not_found("Sale", id))
        })
        .await
    }
}
