//! Latest sync run of a store, with detection of abandoned runs.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;

use magdash_core::{SyncProgress, SyncRunStatus};

use crate::sales::check_table_exists;
use crate::{DbError, HostedClient};

/// An `in_progress` run not updated for longer than this is abandoned.
pub const STALE_AFTER_MINUTES: i64 = 15;

const STALE_NOTE: &str = "Sync timed out after 15 minutes of inactivity";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncProgressStatus {
    pub in_progress: bool,
    pub is_stale: bool,
    /// Latest run, if any. For a stale run this is the row as it was before
    /// being marked failed.
    pub progress: Option<SyncProgress>,
}

impl SyncProgressStatus {
    fn idle() -> Self {
        Self {
            in_progress: false,
            is_stale: false,
            progress: None,
        }
    }
}

/// Progress of the latest sync run of `store_id` as of `now`.
///
/// A run still `in_progress` but idle for more than
/// [`STALE_AFTER_MINUTES`] is marked `failed` and reported as stale.
///
/// # Errors
///
/// Returns [`DbError`] if the table check or the progress lookup fails.
pub async fn get_sync_progress(
    client: &HostedClient,
    store_id: &str,
    now: DateTime<Utc>,
) -> Result<SyncProgressStatus, DbError> {
    if !check_table_exists(client, "sync_progress").await? {
        tracing::debug!(store_id, "sync_progress: table does not exist yet");
        return Ok(SyncProgressStatus::idle());
    }

    let latest: Option<SyncProgress> = client
        .table("sync_progress")
        .select("*")
        .eq("store_id", store_id)
        .order("updated_at", false)
        .fetch_optional()
        .await
        .inspect_err(|e| tracing::error!(error = %e, store_id, "sync_progress: fetch failed"))?;

    let Some(run) = latest else {
        return Ok(SyncProgressStatus::idle());
    };

    let in_progress = run.status == SyncRunStatus::InProgress;
    if in_progress && now - run.updated_at > Duration::minutes(STALE_AFTER_MINUTES) {
        let idle_minutes = (now - run.updated_at).num_minutes();
        tracing::warn!(store_id, run_id = %run.id, idle_minutes, "sync_progress: stale run, marking failed");
        mark_failed(client, &run.id, now).await;
        return Ok(SyncProgressStatus {
            in_progress: false,
            is_stale: true,
            progress: Some(run),
        });
    }

    Ok(SyncProgressStatus {
        in_progress,
        is_stale: false,
        progress: Some(run),
    })
}

async fn mark_failed(client: &HostedClient, run_id: &str, now: DateTime<Utc>) {
    let body = json!({
        "status": SyncRunStatus::Failed.as_str(),
        "updated_at": now,
        "notes": STALE_NOTE,
    });
    let result: Result<Vec<serde_json::Value>, DbError> = client
        .table("sync_progress")
        .eq("id", run_id)
        .update(&body)
        .await;
    if let Err(e) = result {
        tracing::warn!(error = %e, run_id, "sync_progress: could not mark stale run failed");
    }
}
