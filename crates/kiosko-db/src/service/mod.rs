//! # Services
//!
//! The public surface the UI calls. Each method is one logical operation:
//! one transaction, one timeout, one typed [`StoreError`] on failure.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  with_timeout(operation_timeout, "add_component", async {              │
//! │      let mut tx = pool.begin().await?;                                 │
//! │      ... repository calls + kiosko_core rules ...                      │
//! │      tx.commit().await?;                                               │
//! │  })                                                                     │
//! │                                                                         │
//! │  Ok         → committed                                                 │
//! │  Err(rule)  → tx dropped, rolled back, Validation/NotFound/Stock       │
//! │  elapsed    → future dropped, rolled back, Transient                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
mod checkout;
mod reports;

pub use catalog::{CatalogService, ScanMatch};
pub use checkout::SaleRecorder;
pub use reports::ReportService;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{DbError, StoreResult};

/// Runs one operation under the configured timeout.
///
/// Failures are logged here so every service reports rejections the same way.
pub(crate) async fn with_timeout<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let result = match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(DbError::Timeout(limit.as_millis() as u64).into()),
    };

    if let Err(err) = &result {
        warn!(operation, kind = ?err.kind(), error = %err, "Operation failed");
    }

    result
}
