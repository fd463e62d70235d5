//! Repeat-purchase analytics over raw transactions.

use std::collections::HashMap;

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::app_config::DisplayLocale;
use crate::types::Transaction;

const UNKNOWN_CUSTOMER: &str = "unknown";
const GUEST_LABEL: &str = "Guest Customer";
const TOP_CUSTOMER_LIMIT: usize = 10;
const LOYAL_THRESHOLD: u32 = 3;
const MIN_HISTORY_MONTHS: i64 = 3;
const MAX_TREND_POINTS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub email: String,
    pub purchases: u32,
    pub total_spent: Decimal,
    pub average_order_value: Decimal,
    pub first_purchase: DateTime<Utc>,
    pub last_purchase: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatPurchaseSummary {
    pub period_months: u32,
    pub total_customers: usize,
    pub repeat_customers: usize,
    /// Customers with three or more purchases.
    pub loyal_customers: usize,
    pub repeat_rate: f64,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRepeatRate {
    /// `yyyy-MM` of the window's end.
    pub month: String,
    pub display_month: String,
    pub repeat_rate: f64,
}

struct CustomerStats {
    key: String,
    purchases: u32,
    total_spent: Decimal,
    first_purchase: DateTime<Utc>,
    last_purchase: DateTime<Utc>,
}

fn customer_key(tx: &Transaction) -> &str {
    tx.customer_key().unwrap_or(UNKNOWN_CUSTOMER)
}

/// Per-customer stats in first-seen order.
fn group_by_customer(transactions: &[Transaction]) -> Vec<CustomerStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<CustomerStats> = Vec::new();
    for tx in transactions {
        let key = customer_key(tx);
        if let Some(&i) = index.get(key) {
            let entry = &mut stats[i];
            entry.purchases += 1;
            entry.total_spent += tx.amount;
            entry.first_purchase = entry.first_purchase.min(tx.transaction_date);
            entry.last_purchase = entry.last_purchase.max(tx.transaction_date);
        } else {
            index.insert(key, stats.len());
            stats.push(CustomerStats {
                key: key.to_string(),
                purchases: 1,
                total_spent: tx.amount,
                first_purchase: tx.transaction_date,
                last_purchase: tx.transaction_date,
            });
        }
    }
    stats
}

#[allow(clippy::cast_precision_loss)]
fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Repeat-purchase rate over `transactions`, labelled with `months`.
///
/// Customers are identified by resolved email, then customer id; anonymous
/// purchases share one guest bucket.
#[must_use]
pub fn calculate_repeat_purchase_rate(
    transactions: &[Transaction],
    months: u32,
) -> RepeatPurchaseSummary {
    let stats = group_by_customer(transactions);
    let repeat_customers = stats.iter().filter(|c| c.purchases > 1).count();
    let loyal_customers = stats
        .iter()
        .filter(|c| c.purchases >= LOYAL_THRESHOLD)
        .count();

    let mut repeaters: Vec<&CustomerStats> = stats.iter().filter(|c| c.purchases > 1).collect();
    repeaters.sort_by(|a, b| b.purchases.cmp(&a.purchases));
    let top_customers = repeaters
        .into_iter()
        .take(TOP_CUSTOMER_LIMIT)
        .map(|c| TopCustomer {
            email: if c.key == UNKNOWN_CUSTOMER {
                GUEST_LABEL.to_string()
            } else {
                c.key.clone()
            },
            purchases: c.purchases,
            total_spent: c.total_spent,
            average_order_value: (c.total_spent / Decimal::from(c.purchases)).round_dp(2),
            first_purchase: c.first_purchase,
            last_purchase: c.last_purchase,
        })
        .collect();

    RepeatPurchaseSummary {
        period_months: months,
        total_customers: stats.len(),
        repeat_customers,
        loyal_customers,
        repeat_rate: rate(repeat_customers, stats.len()),
        top_customers,
    }
}

/// Trailing repeat rates, one point per month, oldest first.
///
/// Each point covers `window_months` months ending `i` months before the
/// newest transaction. Needs at least three 30-day months of history and
/// yields at most 24 points.
#[must_use]
pub fn calculate_monthly_repeat_rates(
    transactions: &[Transaction],
    window_months: u32,
    locale: DisplayLocale,
) -> Vec<MonthlyRepeatRate> {
    let (Some(oldest), Some(newest)) = (
        transactions.iter().map(|t| t.transaction_date).min(),
        transactions.iter().map(|t| t.transaction_date).max(),
    ) else {
        return Vec::new();
    };

    let months_available = (newest - oldest).num_days() / 30;
    if months_available < MIN_HISTORY_MONTHS {
        tracing::debug!(months_available, "not enough history for monthly repeat rates");
        return Vec::new();
    }

    let points = months_available.min(MAX_TREND_POINTS);
    let mut results = Vec::new();
    for i in 0..points {
        let Some(end) = u32::try_from(i)
            .ok()
            .and_then(|i| newest.checked_sub_months(Months::new(i)))
        else {
            continue;
        };
        let Some(start) = end.checked_sub_months(Months::new(window_months)) else {
            continue;
        };

        let mut purchases: HashMap<&str, u32> = HashMap::new();
        for tx in transactions
            .iter()
            .filter(|t| t.transaction_date >= start && t.transaction_date <= end)
        {
            *purchases.entry(customer_key(tx)).or_default() += 1;
        }
        if purchases.is_empty() {
            continue;
        }

        let repeaters = purchases.values().filter(|n| **n > 1).count();
        results.push(MonthlyRepeatRate {
            month: end.format("%Y-%m").to_string(),
            display_month: end
                .format_localized("%b %Y", locale.chrono_locale())
                .to_string(),
            repeat_rate: rate(repeaters, purchases.len()),
        });
    }
    results.reverse();
    results
}
