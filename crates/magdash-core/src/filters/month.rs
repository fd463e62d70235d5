use chrono::{Datelike, Months, NaiveDate};

use super::DateFilter;
use crate::app_config::DisplayLocale;
use crate::formatters::format_month;
use crate::generation::{RequestGeneration, Ticket};
use crate::types::AvailableMonth;

/// First and last calendar day of `date`'s month.
#[must_use]
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Filter covering the whole month containing `date`.
#[must_use]
pub fn month_filter(date: NaiveDate, locale: DisplayLocale) -> DateFilter {
    let (first, last) = month_bounds(date);
    DateFilter::new(first, last, format_month(first, locale))
}

/// Whether any known data month matches `day`'s month and year.
///
/// Malformed entries never match.
#[must_use]
pub fn has_data_for_month(day: NaiveDate, months: &[AvailableMonth]) -> bool {
    months
        .iter()
        .filter_map(AvailableMonth::parsed)
        .any(|(month, year)| month == day.month() && year == day.year())
}

/// Chronologically latest valid data month, as the first day of that month.
#[must_use]
pub fn latest_month(months: &[AvailableMonth]) -> Option<NaiveDate> {
    months.iter().filter_map(AvailableMonth::first_day).max()
}

/// Selection state behind the sales month picker.
///
/// Month availability is loaded asynchronously. Each load takes a ticket from
/// [`SalesFilterState::begin_months_request`]; results carrying a superseded
/// ticket are dropped so the most recent request always wins.
#[derive(Debug)]
pub struct SalesFilterState {
    locale: DisplayLocale,
    selected: Option<NaiveDate>,
    months: Vec<AvailableMonth>,
    months_loaded: bool,
    months_error: Option<String>,
    generation: RequestGeneration,
}

impl SalesFilterState {
    #[must_use]
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            locale,
            selected: None,
            months: Vec::new(),
            months_loaded: false,
            months_error: None,
            generation: RequestGeneration::new(),
        }
    }

    pub fn begin_months_request(&self) -> Ticket {
        self.generation.next()
    }

    /// Apply the outcome of a month-availability request.
    ///
    /// Returns `false` when the ticket is stale and the result was ignored.
    pub fn apply_months(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<AvailableMonth>, String>,
        today: NaiveDate,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        match result {
            Ok(months) => {
                self.months = months;
                self.months_loaded = true;
                self.months_error = None;
                if self.selected.is_none() {
                    self.selected = Some(self.default_date(today));
                }
            }
            Err(message) => {
                self.months.clear();
                self.months_loaded = false;
                self.months_error = Some(message);
            }
        }
        true
    }

    /// Change the selected date. Clearing it re-applies the default once
    /// months are known.
    pub fn select_date(&mut self, date: Option<NaiveDate>, today: NaiveDate) {
        self.selected = match date {
            Some(d) => Some(d),
            None if self.months_loaded => Some(self.default_date(today)),
            None => None,
        };
    }

    #[must_use]
    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected
    }

    #[must_use]
    pub fn months(&self) -> &[AvailableMonth] {
        &self.months
    }

    #[must_use]
    pub fn months_error(&self) -> Option<&str> {
        self.months_error.as_deref()
    }

    #[must_use]
    pub fn has_data_for(&self, day: NaiveDate) -> bool {
        has_data_for_month(day, &self.months)
    }

    /// Current filter. Falls back to `today`'s month until a date is selected.
    #[must_use]
    pub fn date_filter(&self, today: NaiveDate) -> DateFilter {
        month_filter(self.selected.unwrap_or(today), self.locale)
    }

    fn default_date(&self, today: NaiveDate) -> NaiveDate {
        latest_month(&self.months).unwrap_or(today)
    }
}
