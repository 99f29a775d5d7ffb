//! # Sales Statistics
//!
//! One aggregation function, one result shape. The dashboard reads every
//! field from [`Statistics`]; nothing is optional or omitted per screen.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Sale;

/// Half-open `[from, to)` window over sale timestamps. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// No bounds: every sale.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at < to)
    }
}

/// Units, revenue and profit of one product across the aggregated sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_id: String,
    /// Name recorded on the most recent line for this product.
    pub name: String,
    pub units: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
}

/// Totals for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub sales: i64,
    pub units: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
}

/// Dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Statistics {
    pub total_sales: i64,
    pub total_units_sold: i64,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
    /// Revenue / sales, truncated; 0 without sales.
    pub average_ticket_cents: i64,
    /// Best sellers: units desc, revenue desc, product id asc.
    pub best_sellers: Vec<ProductSales>,
    /// Ascending by date.
    pub daily: Vec<DailySales>,
}

/// Aggregates sales (with their lines loaded) into [`Statistics`].
///
/// ## Arguments
/// * `sales` - Sales to aggregate, any order
/// * `top_n` - Maximum entries in `best_sellers`
pub fn aggregate(sales: &[Sale], top_n: usize) -> Statistics {
    let mut stats = Statistics::default();
    let mut per_product: HashMap<&str, ProductSales> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();

    let mut ordered: Vec<&Sale> = sales.iter().collect();
    ordered.sort_by_key(|s| s.created_at);

    for sale in ordered {
        stats.total_sales += 1;
        stats.total_units_sold += sale.total_units;
        stats.total_revenue_cents += sale.total_cents;
        stats.total_profit_cents += sale.profit_cents;

        let date = sale.created_at.date_naive();
        let day = per_day.entry(date).or_insert_with(|| DailySales {
            date,
            sales: 0,
            units: 0,
            revenue_cents: 0,
            profit_cents: 0,
        });
        day.sales += 1;
        day.units += sale.total_units;
        day.revenue_cents += sale.total_cents;
        day.profit_cents += sale.profit_cents;

        for line in &sale.lines {
            let entry = per_product
                .entry(line.product_id.as_str())
                .or_insert_with(|| ProductSales {
                    product_id: line.product_id.clone(),
                    name: line.name_snapshot.clone(),
                    units: 0,
                    revenue_cents: 0,
                    profit_cents: 0,
                });
            entry.name = line.name_snapshot.clone();
            entry.units += line.quantity;
            entry.revenue_cents += line.line_total().cents();
            entry.profit_cents += line.profit_cents;
        }
    }

    if stats.total_sales > 0 {
        stats.average_ticket_cents = stats.total_revenue_cents / stats.total_sales;
    }

    let mut best: Vec<ProductSales> = per_product.into_values().collect();
    best.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then(b.revenue_cents.cmp(&a.revenue_cents))
            .then(a.product_id.cmp(&b.product_id))
    });
    best.truncate(top_n);

    stats.best_sellers = best;
    stats.daily = per_day.into_values().collect();
    stats
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;
    use chrono::{TimeZone, Utc};

    fn line(product_id: &str, name: &str, qty: i64, price: i64, cost: i64) -> SaleLine {
        SaleLine {
            id: format!("{}-{}", product_id, qty),
            sale_id: "s".to_string(),
            position: 0,
            product_id: product_id.to_string(),
            variant_id: None,
            name_snapshot: name.to_string(),
            variant_name_snapshot: None,
            quantity: qty,
            unit_price_cents: price,
            unit_cost_cents: cost,
            profit_cents: (price - cost) * qty,
        }
    }

    fn sale(id: &str, day: u32, lines: Vec<SaleLine>) -> Sale {
        Sale {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
            total_units: lines.iter().map(|l| l.quantity).sum(),
            total_cents: lines.iter().map(|l| l.line_total().cents()).sum(),
            profit_cents: lines.iter().map(|l| l.profit_cents).sum(),
            lines,
        }
    }

    #[test]
    fn test_date_range_is_half_open() {
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let range = DateRange::between(from, to);

        assert!(range.contains(from));
        assert!(!range.contains(to));
        assert!(DateRange::all().contains(to));
    }

    #[test]
    fn test_empty_statistics() {
        let stats = aggregate(&[], 5);
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.average_ticket_cents, 0);
    }

    #[test]
    fn test_totals_best_sellers_and_daily() {
        let sales = vec![
            sale("1", 1, vec![line("a", "Remera", 3, 10000, 6000)]),
            sale(
                "2",
                1,
                vec![line("b", "Gorra", 1, 4000, 1000), line("a", "Remera", 1, 10000, 6000)],
            ),
            sale("3", 2, vec![line("b", "Gorra", 2, 4000, 1000)]),
        ];

        let stats = aggregate(&sales, 10);

        assert_eq!(stats.total_sales, 3);
        assert_eq!(stats.total_units_sold, 7);
        assert_eq!(stats.total_revenue_cents, 30000 + 14000 + 8000);
        assert_eq!(stats.total_profit_cents, 12000 + 3000 + 4000 + 6000);
        assert_eq!(stats.average_ticket_cents, 52000 / 3);

        assert_eq!(stats.best_sellers.len(), 2);
        assert_eq!(stats.best_sellers[0].product_id, "a");
        assert_eq!(stats.best_sellers[0].units, 4);
        assert_eq!(stats.best_sellers[1].units, 3);

        assert_eq!(stats.daily.len(), 2);
        assert_eq!(stats.daily[0].sales, 2);
        assert_eq!(stats.daily[1].revenue_cents, 8000);
    }

    #[test]
    fn test_best_sellers_truncated_and_tie_broken() {
        let sales = vec![sale(
            "1",
            1,
            vec![
                line("x", "X", 1, 100, 50),
                line("y", "Y", 1, 300, 50),
                line("z", "Z", 1, 300, 50),
            ],
        )];

        let stats = aggregate(&sales, 2);
        let ids: Vec<&str> = stats
            .best_sellers
            .iter()
            .map(|p| p.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["y", "z"]);
    }
}
