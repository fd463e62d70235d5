use thiserror::Error;

pub mod basket;
pub mod client;
pub mod connections;
pub mod diagnostics;
pub mod products;
pub mod profiles;
pub mod sales;
pub mod stores;
pub mod sync_progress;
pub mod transactions;
pub mod trends;

pub use basket::{fetch_basket_opener_products, BasketOpenerQuery};
pub use client::{HostedClient, Query};
pub use connections::{
    add_magento_connection, delete_magento_connection, fetch_active_magento_connections,
    fetch_magento_connections, fetch_order_statuses, trigger_magento_sync,
};
pub use diagnostics::run_diagnostics;
pub use products::{fetch_product_data, fetch_products_with_images};
pub use profiles::{fetch_user_profile, is_user_admin, update_user_profile};
pub use sales::{check_table_exists, fetch_available_data_months, fetch_daily_sales_data, SalesQuery};
pub use stores::{create_store, delete_store, get_stores_for_user, update_store};
pub use sync_progress::{get_sync_progress, SyncProgressStatus, STALE_AFTER_MINUTES};
pub use transactions::{fetch_transaction_data, get_transaction_count, test_database_connection};
pub use trends::fetch_trends_data;

/// PostgREST error codes meaning the relation does not exist.
const MISSING_RELATION_CODES: [&str; 2] = ["42P01", "PGRST205"];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("hosted backend is not configured (MAGDASH_HOSTED_URL is unset)")]
    NotConfigured,
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hosted API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("record not found")]
    NotFound,
    #[error("refusing to {0} without a row filter")]
    UnscopedMutation(&'static str),
    #[error("{0}")]
    Validation(String),
}

impl DbError {
    /// Whether the backend reported that the queried table does not exist.
    #[must_use]
    pub fn is_missing_relation(&self) -> bool {
        match self {
            DbError::Api { status, code, .. } => {
                *status == 404
                    || code
                        .as_deref()
                        .is_some_and(|c| MISSING_RELATION_CODES.contains(&c))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_relation_is_detected_by_code_or_status() {
        let by_code = DbError::Api {
            status: 400,
            code: Some("42P01".to_string()),
            message: "relation does not exist".to_string(),
        };
        let by_status = DbError::Api {
            status: 404,
            code: None,
            message: "not found".to_string(),
        };
        let other = DbError::Api {
            status: 401,
            code: Some("PGRST301".to_string()),
            message: "JWT expired".to_string(),
        };
        assert!(by_code.is_missing_relation());
        assert!(by_status.is_missing_relation());
        assert!(!other.is_missing_relation());
        assert!(!DbError::NotFound.is_missing_relation());
    }
}
