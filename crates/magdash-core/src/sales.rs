//! Sales aggregation used when the pre-aggregated `daily_sales` table is
//! unavailable, plus metric-card summaries.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AvailableMonth, DailySales};

/// The transaction columns needed to derive daily sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAmount {
    pub store_id: String,
    pub transaction_date: DateTime<Utc>,
    pub amount: Decimal,
}

struct DayBucket {
    date: NaiveDate,
    store_id: String,
    total: Decimal,
    orders: HashSet<DateTime<Utc>>,
}

/// Group transactions into one [`DailySales`] row per `(date, store)`.
///
/// Orders are counted as distinct transaction timestamps. Totals and
/// averages are rounded to two decimals. Rows come out in first-seen order.
#[must_use]
pub fn aggregate_daily_sales(rows: &[TransactionAmount], now: DateTime<Utc>) -> Vec<DailySales> {
    let mut index: HashMap<(NaiveDate, &str), usize> = HashMap::new();
    let mut buckets: Vec<DayBucket> = Vec::new();

    for row in rows {
        let date = row.transaction_date.date_naive();
        let key = (date, row.store_id.as_str());
        let i = *index.entry(key).or_insert_with(|| {
            buckets.push(DayBucket {
                date,
                store_id: row.store_id.clone(),
                total: Decimal::ZERO,
                orders: HashSet::new(),
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[i];
        bucket.total += row.amount;
        bucket.orders.insert(row.transaction_date);
    }

    buckets
        .into_iter()
        .map(|b| {
            let order_count = b.orders.len();
            let average_order_value = (order_count > 0)
                .then(|| (b.total / Decimal::from(order_count)).round_dp(2));
            DailySales {
                id: format!("fallback-{}-{}", b.date.format("%Y-%m-%d"), b.store_id),
                store_id: b.store_id,
                date: b.date,
                total_sales: b.total.round_dp(2),
                order_count: i64::try_from(order_count).unwrap_or(i64::MAX),
                average_order_value,
                created_at: Some(now),
                updated_at: Some(now),
            }
        })
        .collect()
}

/// Distinct `(month, year)` pairs in first-seen order.
#[must_use]
pub fn distinct_months<I>(dates: I) -> Vec<AvailableMonth>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut seen = HashSet::new();
    dates
        .into_iter()
        .map(AvailableMonth::from_date)
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// Headline numbers for the sales metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub order_count: i64,
    pub average_order_value: Decimal,
    pub days: usize,
}

#[must_use]
pub fn summarize_sales(rows: &[DailySales]) -> SalesSummary {
    let total_sales: Decimal = rows.iter().map(|r| r.total_sales).sum();
    let order_count: i64 = rows.iter().map(|r| r.order_count).sum();
    let average_order_value = if order_count > 0 {
        (total_sales / Decimal::from(order_count)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    let days = rows.iter().map(|r| r.date).collect::<HashSet<_>>().len();
    SalesSummary {
        total_sales,
        order_count,
        average_order_value,
        days,
    }
}
