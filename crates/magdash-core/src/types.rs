//! Row types shared by the data-access layer, the API and the CLI.
//!
//! Field names follow the hosted tables' column names so rows deserialize
//! straight from REST responses.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Mutable fields of a store. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MagentoConnection {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub store_id: Option<String>,
    pub store_name: String,
    pub store_url: String,
    pub access_token: String,
    pub status: String,
    #[serde(default)]
    pub order_statuses: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MagentoConnection {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl std::fmt::Debug for MagentoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagentoConnection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("store_id", &self.store_id)
            .field("store_name", &self.store_name)
            .field("store_url", &self.store_url)
            .field("access_token", &"[redacted]")
            .field("status", &self.status)
            .field("order_statuses", &self.order_statuses)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Serialize)]
pub struct NewMagentoConnection {
    pub user_id: String,
    pub store_id: Option<String>,
    pub store_name: String,
    pub store_url: String,
    pub access_token: String,
    pub status: String,
}

impl std::fmt::Debug for NewMagentoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewMagentoConnection")
            .field("user_id", &self.user_id)
            .field("store_id", &self.store_id)
            .field("store_name", &self.store_name)
            .field("store_url", &self.store_url)
            .field("access_token", &"[redacted]")
            .field("status", &self.status)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub id: String,
    pub store_id: String,
    pub date: NaiveDate,
    pub total_sales: Decimal,
    pub order_count: i64,
    #[serde(default)]
    pub average_order_value: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub store_id: String,
    pub transaction_date: DateTime<Utc>,
    pub amount: Decimal,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Best available customer email.
    ///
    /// Order: `metadata.customer_email`, then a `customer_id` that looks like
    /// an email address, then the row's own `email` column.
    #[must_use]
    pub fn resolved_email(&self) -> Option<&str> {
        if let Some(email) = self
            .metadata
            .get("customer_email")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
        {
            return Some(email);
        }
        if let Some(id) = self.customer_id.as_deref().filter(|id| id.contains('@')) {
            return Some(id);
        }
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// Key identifying the purchasing customer, preferring email over id.
    #[must_use]
    pub fn customer_key(&self) -> Option<&str> {
        self.resolved_email()
            .or_else(|| self.customer_id.as_deref().filter(|id| !id.is_empty()))
    }

    /// Magento order status recorded in the transaction metadata.
    #[must_use]
    pub fn order_status(&self) -> Option<&str> {
        self.metadata.get("status").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub invoice_address: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile fields a merchant may change. `id` and timestamps are not writable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRunStatus {
    InProgress,
    Completed,
    Error,
    Failed,
    #[serde(other)]
    Unknown,
}

impl SyncRunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncRunStatus::InProgress => "in_progress",
            SyncRunStatus::Completed => "completed",
            SyncRunStatus::Error => "error",
            SyncRunStatus::Failed => "failed",
            SyncRunStatus::Unknown => "unknown",
        }
    }
}

/// A row of the `sync_progress` table, written by the external sync process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub id: String,
    pub store_id: String,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub current_page: i64,
    #[serde(default)]
    pub total_pages: Option<i64>,
    #[serde(default)]
    pub orders_processed: u64,
    #[serde(default)]
    pub total_orders: Option<u64>,
    pub status: SyncRunStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub skipped_orders: Option<u64>,
    #[serde(default)]
    pub warning_message: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketOpenerProduct {
    pub product_id: String,
    pub product_name: String,
    pub opener_score: f64,
    pub opener_count: i64,
    pub total_appearances: i64,
}

/// A month known to contain sales data, as reported by the backend.
///
/// `month` is 1-based. Both fields are kept as received so malformed values
/// can be detected instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailableMonth {
    #[serde(deserialize_with = "string_or_number")]
    pub month: String,
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
}

impl AvailableMonth {
    #[must_use]
    pub fn new(month: u32, year: i32) -> Self {
        Self {
            month: month.to_string(),
            year: year.to_string(),
        }
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.month(), date.year())
    }

    /// `(month, year)` when both fields are numeric and the month is 1..=12.
    #[must_use]
    pub fn parsed(&self) -> Option<(u32, i32)> {
        let month = self.month.trim().parse::<u32>().ok()?;
        let year = self.year.trim().parse::<i32>().ok()?;
        (1..=12).contains(&month).then_some((month, year))
    }

    /// First day of the month, when the entry is well formed.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        let (month, year) = self.parsed()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(metadata: Value, customer_id: Option<&str>, email: Option<&str>) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            store_id: "s1".to_string(),
            transaction_date: "2024-05-01T10:00:00Z".parse().unwrap(),
            amount: Decimal::new(10_000, 2),
            customer_id: customer_id.map(str::to_string),
            product_id: None,
            external_id: None,
            metadata,
            email: email.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn resolved_email_prefers_metadata() {
        let tx = transaction(
            serde_json::json!({"customer_email": "meta@example.com"}),
            Some("id@example.com"),
            Some("column@example.com"),
        );
        assert_eq!(tx.resolved_email(), Some("meta@example.com"));
    }

    #[test]
    fn resolved_email_uses_email_like_customer_id() {
        let tx = transaction(Value::Null, Some("id@example.com"), Some("column@example.com"));
        assert_eq!(tx.resolved_email(), Some("id@example.com"));
    }

    #[test]
    fn customer_key_falls_back_to_plain_customer_id() {
        let tx = transaction(Value::Null, Some("10042"), None);
        assert_eq!(tx.resolved_email(), None);
        assert_eq!(tx.customer_key(), Some("10042"));
    }

    #[test]
    fn available_month_accepts_numeric_and_string_fields() {
        let month: AvailableMonth =
            serde_json::from_value(serde_json::json!({"month": "5", "year": 2024})).unwrap();
        assert_eq!(month.parsed(), Some((5, 2024)));

        let numeric: AvailableMonth =
            serde_json::from_value(serde_json::json!({"month": 12, "year": "2023"})).unwrap();
        assert_eq!(numeric.parsed(), Some((12, 2023)));
    }

    #[test]
    fn available_month_rejects_malformed_values() {
        let bad_month = AvailableMonth {
            month: "May".to_string(),
            year: "2024".to_string(),
        };
        let bad_year = AvailableMonth {
            month: "5".to_string(),
            year: "twenty".to_string(),
        };
        let out_of_range = AvailableMonth::new(13, 2024);
        assert_eq!(bad_month.parsed(), None);
        assert_eq!(bad_year.parsed(), None);
        assert_eq!(out_of_range.first_day(), None);
    }

    #[test]
    fn sync_progress_tolerates_unknown_status() {
        let row: SyncProgress = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "store_id": "s1",
            "status": "paused",
            "updated_at": "2024-06-15T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(row.status, SyncRunStatus::Unknown);
        assert_eq!(row.orders_processed, 0);
        assert_eq!(row.total_orders, None);
    }

    #[test]
    fn connection_debug_redacts_access_token() {
        let conn = MagentoConnection {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            store_id: None,
            store_name: "Shop".to_string(),
            store_url: "https://shop.example.com".to_string(),
            access_token: "secret-token".to_string(),
            status: "active".to_string(),
            order_statuses: vec![],
            created_at: None,
            updated_at: None,
        };
        let rendered = format!("{conn:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(conn.is_active());
    }
}
