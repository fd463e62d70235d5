//! Derivation of query filters from dashboard selection state.

mod month;
mod range;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub use month::{has_data_for_month, latest_month, month_bounds, month_filter, SalesFilterState};
pub use range::{period_range, TimeRange};

pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

/// Concrete date bounds for a query plus a label for display.
///
/// `from_date` and `to_date` are ISO `yyyy-MM-dd` strings and
/// `from_date <= to_date` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    pub from_date: String,
    pub to_date: String,
    pub display_text: String,
}

impl DateFilter {
    pub(crate) fn new(from: NaiveDate, to: NaiveDate, display_text: String) -> Self {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        Self {
            from_date: from.format(ISO_DATE).to_string(),
            to_date: to.format(ISO_DATE).to_string(),
            display_text,
        }
    }

    /// Parsed bounds. `None` only if the strings were edited by hand.
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let from = NaiveDate::parse_from_str(&self.from_date, ISO_DATE).ok()?;
        let to = NaiveDate::parse_from_str(&self.to_date, ISO_DATE).ok()?;
        Some((from, to))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreView {
    #[default]
    Alle,
    Dk,
    Se,
    No,
    Fi,
}

impl StoreView {
    /// Filter value to send to the backend, `None` when every view is wanted.
    #[must_use]
    pub fn as_filter(self) -> Option<&'static str> {
        match self {
            StoreView::Alle => None,
            other => Some(other.as_str()),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreView::Alle => "alle",
            StoreView::Dk => "dk",
            StoreView::Se => "se",
            StoreView::No => "no",
            StoreView::Fi => "fi",
        }
    }
}

impl FromStr for StoreView {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "alle" => Ok(StoreView::Alle),
            "dk" => Ok(StoreView::Dk),
            "se" => Ok(StoreView::Se),
            "no" => Ok(StoreView::No),
            "fi" => Ok(StoreView::Fi),
            _ => Err(CoreError::InvalidStoreView(s.to_string())),
        }
    }
}

impl fmt::Display for StoreView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerGroup {
    #[default]
    Alle,
    Retail,
    Wholesale,
    Vip,
}

impl CustomerGroup {
    #[must_use]
    pub fn as_filter(self) -> Option<&'static str> {
        match self {
            CustomerGroup::Alle => None,
            other => Some(other.as_str()),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerGroup::Alle => "alle",
            CustomerGroup::Retail => "retail",
            CustomerGroup::Wholesale => "wholesale",
            CustomerGroup::Vip => "vip",
        }
    }
}

impl FromStr for CustomerGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "alle" => Ok(CustomerGroup::Alle),
            "retail" => Ok(CustomerGroup::Retail),
            "wholesale" => Ok(CustomerGroup::Wholesale),
            "vip" => Ok(CustomerGroup::Vip),
            _ => Err(CoreError::InvalidCustomerGroup(s.to_string())),
        }
    }
}

impl fmt::Display for CustomerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store and segment filters shared by the analytics views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub store_ids: Vec<String>,
    #[serde(default)]
    pub store_view: StoreView,
    #[serde(default)]
    pub customer_group: CustomerGroup,
    #[serde(default)]
    pub order_statuses: Vec<String>,
}

impl FilterSelection {
    #[must_use]
    pub fn for_stores(store_ids: Vec<String>) -> Self {
        Self {
            store_ids,
            ..Self::default()
        }
    }

    /// Store ids to scope a query with, `None` when the query stays unscoped.
    #[must_use]
    pub fn store_scope(&self) -> Option<&[String]> {
        (!self.store_ids.is_empty()).then_some(self.store_ids.as_slice())
    }

    #[must_use]
    pub fn status_scope(&self) -> Option<&[String]> {
        (!self.order_statuses.is_empty()).then_some(self.order_statuses.as_slice())
    }
}

/// Split a comma-separated query parameter, dropping blanks.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_filter_orders_bounds() {
        let a = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let filter = DateFilter::new(a, b, "x".to_string());
        assert_eq!(filter.from_date, "2024-06-01");
        assert_eq!(filter.to_date, "2024-06-30");
        assert_eq!(filter.bounds(), Some((b, a)));
    }

    #[test]
    fn alle_means_no_filter() {
        assert_eq!(StoreView::Alle.as_filter(), None);
        assert_eq!(CustomerGroup::Alle.as_filter(), None);
        assert_eq!("DK".parse::<StoreView>().unwrap().as_filter(), Some("dk"));
        assert_eq!(
            "vip".parse::<CustomerGroup>().unwrap().as_filter(),
            Some("vip")
        );
    }

    #[test]
    fn unknown_segments_are_rejected() {
        assert_eq!(
            "de".parse::<StoreView>(),
            Err(CoreError::InvalidStoreView("de".to_string()))
        );
        assert!("premium".parse::<CustomerGroup>().is_err());
    }

    #[test]
    fn empty_store_list_leaves_query_unscoped() {
        assert!(FilterSelection::default().store_scope().is_none());
        let scoped = FilterSelection::for_stores(vec!["s1".to_string()]);
        assert_eq!(scoped.store_scope(), Some(&["s1".to_string()][..]));
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" a, ,b,"), vec!["a".to_string(), "b".to_string()]);
        assert!(split_list("").is_empty());
    }
}
