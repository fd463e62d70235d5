pub mod app_config;
pub mod config;
pub mod diagnostics;
pub mod filters;
pub mod formatters;
pub mod generation;
pub mod progress;
pub mod repeat_purchase;
pub mod sales;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, DisplayLocale, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use diagnostics::{TestResult, TestStatus};
pub use filters::{
    has_data_for_month, latest_month, month_bounds, month_filter, period_range, split_list,
    CustomerGroup, DateFilter, FilterSelection, SalesFilterState, StoreView, TimeRange,
};
pub use formatters::{
    format_currency, format_day, format_long_date, format_month, format_percentage, format_time,
};
pub use generation::{RequestGeneration, Ticket};
pub use progress::{progress_percentage, EntityStatus, ProgressSource, SyncBoard, SyncEntity};
pub use repeat_purchase::{
    calculate_monthly_repeat_rates, calculate_repeat_purchase_rate, MonthlyRepeatRate,
    RepeatPurchaseSummary, TopCustomer,
};
pub use sales::{
    aggregate_daily_sales, distinct_months, summarize_sales, SalesSummary, TransactionAmount,
};
pub use types::{
    AvailableMonth, BasketOpenerProduct, DailySales, MagentoConnection, NewMagentoConnection,
    Product, Profile, ProfileUpdate, Store, StoreUpdate, SyncProgress, SyncRunStatus, Transaction,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),
    #[error("invalid customer group: {0}")]
    InvalidCustomerGroup(String),
    #[error("invalid store view: {0}")]
    InvalidStoreView(String),
}
