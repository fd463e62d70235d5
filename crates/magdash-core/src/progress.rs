//! Sync progress computation and per-entity status tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app_config::DisplayLocale;
use crate::types::{SyncProgress, SyncRunStatus};

/// Where a progress value comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressSource {
    /// Counters from a persisted sync run.
    Counts {
        orders_processed: u64,
        total_orders: Option<u64>,
    },
    /// A synthetic percentage, e.g. from the connect flow.
    Percent(f64),
}

impl From<&SyncProgress> for ProgressSource {
    fn from(run: &SyncProgress) -> Self {
        ProgressSource::Counts {
            orders_processed: run.orders_processed,
            total_orders: run.total_orders,
        }
    }
}

/// Progress as a whole percentage in `0..=100`.
///
/// A missing or zero total counts as 1. NaN becomes 0.
#[must_use]
pub fn progress_percentage(source: ProgressSource) -> u8 {
    #[allow(clippy::cast_precision_loss)]
    let raw = match source {
        ProgressSource::Counts {
            orders_processed,
            total_orders,
        } => {
            let total = total_orders.filter(|t| *t > 0).unwrap_or(1);
            orders_processed as f64 / total as f64 * 100.0
        }
        ProgressSource::Percent(p) => p,
    };
    if raw.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = raw.round().clamp(0.0, 100.0) as u8;
    clamped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncEntity {
    Products,
    Orders,
    Customers,
    Statistics,
}

impl SyncEntity {
    /// Entities in sync order.
    pub const ALL: [SyncEntity; 4] = [
        SyncEntity::Products,
        SyncEntity::Orders,
        SyncEntity::Customers,
        SyncEntity::Statistics,
    ];

    #[must_use]
    pub fn label(self, locale: DisplayLocale) -> &'static str {
        match (self, locale) {
            (SyncEntity::Products, DisplayLocale::Danish) => "Produkter",
            (SyncEntity::Orders, DisplayLocale::Danish) => "Ordrer",
            (SyncEntity::Customers, DisplayLocale::Danish) => "Kunder",
            (SyncEntity::Statistics, DisplayLocale::Danish) => "Salgsstatistikker",
            (SyncEntity::Products, DisplayLocale::English) => "Products",
            (SyncEntity::Orders, DisplayLocale::English) => "Orders",
            (SyncEntity::Customers, DisplayLocale::English) => "Customers",
            (SyncEntity::Statistics, DisplayLocale::English) => "Sales statistics",
        }
    }

    fn index(self) -> usize {
        match self {
            SyncEntity::Products => 0,
            SyncEntity::Orders => 1,
            SyncEntity::Customers => 2,
            SyncEntity::Statistics => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    #[default]
    Waiting,
    Syncing,
    Completed,
}

impl EntityStatus {
    #[must_use]
    pub fn label(self, locale: DisplayLocale) -> &'static str {
        match (self, locale) {
            (EntityStatus::Waiting, DisplayLocale::Danish) => "Venter...",
            (EntityStatus::Syncing, DisplayLocale::Danish) => "Synkroniserer...",
            (EntityStatus::Completed, DisplayLocale::Danish) => "Fuldført",
            (EntityStatus::Waiting, DisplayLocale::English) => "Waiting...",
            (EntityStatus::Syncing, DisplayLocale::English) => "Syncing...",
            (EntityStatus::Completed, DisplayLocale::English) => "Completed",
        }
    }
}

// Overall percentage after each connect-flow stage.
const STAGE_PERCENT: [u8; 5] = [0, 10, 30, 60, 80];

/// Status of every synced entity plus the overall percentage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncBoard {
    statuses: [EntityStatus; 4],
    percent: u8,
}

impl SyncBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Board reflecting a persisted sync run.
    #[must_use]
    pub fn from_run(run: &SyncProgress) -> Self {
        match run.status {
            SyncRunStatus::Completed => Self {
                statuses: [EntityStatus::Completed; 4],
                percent: 100,
            },
            SyncRunStatus::InProgress => Self {
                statuses: [
                    EntityStatus::Completed,
                    EntityStatus::Syncing,
                    EntityStatus::Waiting,
                    EntityStatus::Waiting,
                ],
                percent: progress_percentage(ProgressSource::from(run)),
            },
            SyncRunStatus::Error | SyncRunStatus::Failed | SyncRunStatus::Unknown => Self::new(),
        }
    }

    #[must_use]
    pub fn status(&self, entity: SyncEntity) -> EntityStatus {
        self.statuses[entity.index()]
    }

    /// Set one entity's status; the overall percentage follows.
    pub fn set(&mut self, entity: SyncEntity, status: EntityStatus) {
        self.statuses[entity.index()] = status;
        self.percent = self.stage_percent();
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.statuses.iter().all(|s| *s == EntityStatus::Completed)
    }

    /// Move to the next connect-flow stage.
    ///
    /// The first waiting entity starts syncing; a syncing entity completes and
    /// hands over to the next one. Returns `false` once everything is done.
    pub fn advance(&mut self) -> bool {
        let Some(idx) = self
            .statuses
            .iter()
            .position(|s| *s != EntityStatus::Completed)
        else {
            return false;
        };
        match self.statuses[idx] {
            EntityStatus::Waiting => self.statuses[idx] = EntityStatus::Syncing,
            EntityStatus::Syncing | EntityStatus::Completed => {
                self.statuses[idx] = EntityStatus::Completed;
                if let Some(next) = self.statuses.get_mut(idx + 1) {
                    *next = EntityStatus::Syncing;
                }
            }
        }
        self.percent = self.stage_percent();
        true
    }

    /// Entities with their status, in sync order.
    pub fn entries(&self) -> impl Iterator<Item = (SyncEntity, EntityStatus)> + '_ {
        SyncEntity::ALL.iter().map(|e| (*e, self.status(*e)))
    }

    /// Progress text shown under the bar, e.g. `30% fuldført`.
    #[must_use]
    pub fn progress_text(&self, locale: DisplayLocale) -> String {
        match locale {
            DisplayLocale::Danish => format!("{}% fuldført", self.percent),
            DisplayLocale::English => format!("{}% complete", self.percent),
        }
    }

    fn stage_percent(&self) -> u8 {
        if self.is_complete() {
            return 100;
        }
        let completed = self
            .statuses
            .iter()
            .filter(|s| **s == EntityStatus::Completed)
            .count();
        let syncing = usize::from(self.statuses.contains(&EntityStatus::Syncing));
        STAGE_PERCENT[(completed + syncing).min(STAGE_PERCENT.len() - 1)]
    }
}

impl fmt::Display for SyncBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (entity, status) in self.entries() {
            writeln!(
                f,
                "{:<20} {}",
                entity.label(DisplayLocale::English),
                status.label(DisplayLocale::English)
            )?;
        }
        write!(f, "{}", self.progress_text(DisplayLocale::English))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(processed: u64, total: Option<u64>) -> ProgressSource {
        ProgressSource::Counts {
            orders_processed: processed,
            total_orders: total,
        }
    }

    #[test]
    fn percentage_from_counts() {
        assert_eq!(progress_percentage(counts(50, Some(200))), 25);
        assert_eq!(progress_percentage(counts(1, Some(3))), 33);
        assert_eq!(progress_percentage(counts(2, Some(3))), 67);
    }

    #[test]
    fn zero_or_missing_total_uses_denominator_one() {
        assert_eq!(progress_percentage(counts(0, Some(0))), 0);
        assert_eq!(progress_percentage(counts(0, None)), 0);
        assert_eq!(progress_percentage(counts(5, None)), 100);
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(progress_percentage(counts(300, Some(200))), 100);
        assert_eq!(progress_percentage(ProgressSource::Percent(-4.0)), 0);
        assert_eq!(progress_percentage(ProgressSource::Percent(140.0)), 100);
        assert_eq!(progress_percentage(ProgressSource::Percent(f64::NAN)), 0);
        assert_eq!(progress_percentage(ProgressSource::Percent(42.4)), 42);
    }

    #[test]
    fn advance_walks_connect_flow_stages() {
        let mut board = SyncBoard::new();
        let mut seen = vec![board.percent()];
        while board.advance() {
            seen.push(board.percent());
        }
        assert_eq!(seen, vec![0, 10, 30, 60, 80, 100]);
        assert!(board.is_complete());
        assert!(!board.advance());
    }

    #[test]
    fn advance_hands_over_to_next_entity() {
        let mut board = SyncBoard::new();
        board.advance();
        board.advance();
        assert_eq!(board.status(SyncEntity::Products), EntityStatus::Completed);
        assert_eq!(board.status(SyncEntity::Orders), EntityStatus::Syncing);
        assert_eq!(board.status(SyncEntity::Customers), EntityStatus::Waiting);
        assert_eq!(board.progress_text(DisplayLocale::Danish), "30% fuldført");
    }

    #[test]
    fn entity_statuses_are_independent() {
        let mut board = SyncBoard::new();
        board.set(SyncEntity::Customers, EntityStatus::Completed);
        assert_eq!(board.status(SyncEntity::Customers), EntityStatus::Completed);
        assert_eq!(board.status(SyncEntity::Products), EntityStatus::Waiting);
        assert!(!board.is_complete());
    }

    #[test]
    fn setting_statuses_keeps_percent_in_step() {
        let mut board = SyncBoard::new();
        board.set(SyncEntity::Products, EntityStatus::Syncing);
        assert_eq!(board.percent(), 10);

        for entity in SyncEntity::ALL {
            board.set(entity, EntityStatus::Completed);
        }
        assert!(board.is_complete());
        assert_eq!(board.percent(), 100);
        assert_eq!(board.progress_text(DisplayLocale::English), "100% complete");
    }

    #[test]
    fn labels_per_locale() {
        assert_eq!(EntityStatus::Waiting.label(DisplayLocale::Danish), "Venter...");
        assert_eq!(EntityStatus::Completed.label(DisplayLocale::English), "Completed");
        assert_eq!(
            SyncEntity::Statistics.label(DisplayLocale::Danish),
            "Salgsstatistikker"
        );
    }

    fn run(status: SyncRunStatus, processed: u64, total: Option<u64>) -> SyncProgress {
        SyncProgress {
            id: "p1".to_string(),
            store_id: "s1".to_string(),
            connection_id: None,
            current_page: 1,
            total_pages: None,
            orders_processed: processed,
            total_orders: total,
            status,
            started_at: None,
            updated_at: "2024-06-15T12:00:00Z".parse().unwrap(),
            error_message: None,
            skipped_orders: None,
            warning_message: None,
            notes: None,
        }
    }

    #[test]
    fn board_from_runs() {
        let done = SyncBoard::from_run(&run(SyncRunStatus::Completed, 10, Some(10)));
        assert!(done.is_complete());
        assert_eq!(done.percent(), 100);

        let active = SyncBoard::from_run(&run(SyncRunStatus::InProgress, 50, Some(200)));
        assert_eq!(active.percent(), 25);
        assert_eq!(active.status(SyncEntity::Orders), EntityStatus::Syncing);

        let failed = SyncBoard::from_run(&run(SyncRunStatus::Failed, 50, Some(200)));
        assert_eq!(failed, SyncBoard::new());
    }
}
