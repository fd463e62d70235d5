//! Merchant profile reads and updates.

use serde::Deserialize;

use magdash_core::{Profile, ProfileUpdate};

use crate::{DbError, HostedClient};

/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile has `user_id`, or the query
/// error.
pub async fn fetch_user_profile(client: &HostedClient, user_id: &str) -> Result<Profile, DbError> {
    client
        .table("profiles")
        .select("*")
        .eq("id", user_id)
        .fetch_optional()
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "profiles: fetch failed"))?
        .ok_or(DbError::NotFound)
}

/// Apply `update` to the profile of `user_id` only and return the row as
/// persisted.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for an empty update, [`DbError::NotFound`]
/// when no row matched, or the query error.
pub async fn update_user_profile(
    client: &HostedClient,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Profile, DbError> {
    if user_id.trim().is_empty() {
        return Err(DbError::Validation("user id is required".to_string()));
    }
    if update.is_empty() {
        return Err(DbError::Validation("profile update has no fields".to_string()));
    }

    let rows: Vec<Profile> = client
        .table("profiles")
        .eq("id", user_id)
        .update(update)
        .await
        .inspect_err(|e| tracing::error!(error = %e, user_id, "profiles: update failed"))?;

    tracing::info!(user_id, "profiles: updated");
    rows.into_iter().next().ok_or(DbError::NotFound)
}

#[derive(Debug, Deserialize)]
struct TierRow {
    tier: Option<String>,
}

/// Whether the user's profile tier is `admin`. Lookup failures count as
/// not admin.
pub async fn is_user_admin(client: &HostedClient, user_id: &str) -> bool {
    match client
        .table("profiles")
        .select("tier")
        .eq("id", user_id)
        .fetch_optional::<TierRow>()
        .await
    {
        Ok(row) => row.and_then(|r| r.tier).as_deref() == Some("admin"),
        Err(e) => {
            tracing::warn!(error = %e, user_id, "profiles: admin check failed");
            false
        }
    }
}
