//! Connectivity checks behind the diagnostics page and `magdash diagnose`.

use serde_json::Value;

use magdash_core::TestResult;

use crate::transactions::{get_transaction_count, test_database_connection};
use crate::{DbError, HostedClient};

/// Tables this workspace reads.
pub const CHECKED_TABLES: [&str; 7] = [
    "products",
    "profiles",
    "stores",
    "magento_connections",
    "daily_sales",
    "transactions",
    "sync_progress",
];

/// Run every check in order. Failures become `error` results; the run never
/// stops early.
pub async fn run_diagnostics(client: &HostedClient) -> Vec<TestResult> {
    let mut results = Vec::with_capacity(CHECKED_TABLES.len() + 2);

    results.push(match get_transaction_count(client).await {
        Ok(count) => TestResult::success("Raw Query Test", "Raw query successful")
            .with_details(format!("transactions rows: {count}")),
        Err(e) => error_result("Raw Query Test", &e),
    });

    results.push(match test_database_connection(client).await {
        Ok(()) => TestResult::success("Database Connection Test", "Successfully connected to the hosted backend"),
        Err(e) => error_result("Database Connection Test", &e),
    });

    for table in CHECKED_TABLES {
        results.push(check_table(client, table).await);
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    tracing::info!(checks = results.len(), failed, "diagnostics: run complete");
    results
}

async fn check_table(client: &HostedClient, table: &str) -> TestResult {
    let name = format!("Table Existence Test: {table}");
    match client.table(table).select("*").limit(1).fetch::<Value>().await {
        Ok(_) => TestResult::success(name, format!("Table {table} exists")),
        Err(e) if e.is_missing_relation() => {
            TestResult::error(name, format!("Table {table} not found")).with_details(e.to_string())
        }
        Err(e) => error_result(&name, &e),
    }
}

fn error_result(name: &str, error: &DbError) -> TestResult {
    let result = TestResult::error(name, format!("Error: {error}"));
    match error {
        DbError::Api {
            status,
            code: Some(code),
            ..
        } => result.with_details(format!("Code: {code}, Status: {status}")),
        DbError::Api { status, .. } => result.with_details(format!("Status: {status}")),
        _ => result,
    }
}
