use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::DateFilter;
use crate::app_config::DisplayLocale;
use crate::CoreError;

/// Range selector on the trends view.
///
/// The month offsets are approximations: `7d` looks back one month and `30d`
/// three months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "1y")]
    #[default]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
        TimeRange::All,
    ];

    #[must_use]
    pub fn months_back(self) -> u32 {
        match self {
            TimeRange::Week => 1,
            TimeRange::Month => 3,
            TimeRange::Year => 12,
            TimeRange::All => 36,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Year => "1y",
            TimeRange::All => "all",
        }
    }

    #[must_use]
    pub fn label(self, locale: DisplayLocale) -> &'static str {
        match (self, locale) {
            (TimeRange::Week, DisplayLocale::Danish) => "7 dage",
            (TimeRange::Month, DisplayLocale::Danish) => "30 dage",
            (TimeRange::Year, DisplayLocale::Danish) => "1 år",
            (TimeRange::All, DisplayLocale::Danish) => "Alle",
            (TimeRange::Week, DisplayLocale::English) => "7 days",
            (TimeRange::Month, DisplayLocale::English) => "30 days",
            (TimeRange::Year, DisplayLocale::English) => "1 year",
            (TimeRange::All, DisplayLocale::English) => "All",
        }
    }

    /// Range ending at `today`. Pure in `(today, self, locale)`.
    #[must_use]
    pub fn date_range(self, today: NaiveDate, locale: DisplayLocale) -> DateFilter {
        DateFilter::new(
            months_before(today, self.months_back()),
            today,
            self.label(locale).to_string(),
        )
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            "1y" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            other => Err(CoreError::InvalidTimeRange(other.to_string())),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing period of `months` months ending at `today`, as used by the
/// repeat-purchase and basket-opener period pickers.
#[must_use]
pub fn period_range(months: u32, today: NaiveDate, locale: DisplayLocale) -> DateFilter {
    let label = match locale {
        DisplayLocale::Danish => format!("Sidste {months} måneder"),
        DisplayLocale::English => format!("Last {months} months"),
    };
    DateFilter::new(months_before(today, months), today, label)
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_range_looks_back_one_month() {
        let range = TimeRange::Week.date_range(date(2024, 6, 15), DisplayLocale::Danish);
        assert_eq!(range.from_date, "2024-05-15");
        assert_eq!(range.to_date, "2024-06-15");
        assert_eq!(range.display_text, "7 dage");
    }

    #[test]
    fn offsets_per_selector() {
        let today = date(2024, 6, 15);
        let from = |r: TimeRange| r.date_range(today, DisplayLocale::English).from_date;
        assert_eq!(from(TimeRange::Month), "2024-03-15");
        assert_eq!(from(TimeRange::Year), "2023-06-15");
        assert_eq!(from(TimeRange::All), "2021-06-15");
    }

    #[test]
    fn month_subtraction_clamps_to_month_end() {
        let range = TimeRange::Week.date_range(date(2024, 3, 31), DisplayLocale::English);
        assert_eq!(range.from_date, "2024-02-29");
    }

    #[test]
    fn date_range_is_pure() {
        let today = date(2024, 6, 15);
        for range in TimeRange::ALL {
            assert_eq!(
                range.date_range(today, DisplayLocale::Danish),
                range.date_range(today, DisplayLocale::Danish)
            );
        }
    }

    #[test]
    fn parse_and_display_round_trip_selector_names() {
        for range in TimeRange::ALL {
            assert_eq!(range.as_str().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!(TimeRange::default(), TimeRange::Year);
        assert!(matches!(
            "90d".parse::<TimeRange>(),
            Err(CoreError::InvalidTimeRange(_))
        ));
    }

    #[test]
    fn period_range_labels_by_locale() {
        let range = period_range(6, date(2024, 6, 15), DisplayLocale::Danish);
        assert_eq!(range.from_date, "2023-12-15");
        assert_eq!(range.display_text, "Sidste 6 måneder");
        let english = period_range(3, date(2024, 6, 15), DisplayLocale::English);
        assert_eq!(english.display_text, "Last 3 months");
    }
}
