//! Display formatting for amounts, percentages and dates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::app_config::DisplayLocale;

/// Whole-unit currency amount in Danish style: `1.234.567 kr.`.
#[must_use]
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let whole = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .unwrap_or_default();
    let symbol = match currency {
        "DKK" => "kr.",
        "EUR" => "€",
        "USD" => "US$",
        other => other,
    };
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{} {symbol}", group_thousands(whole.unsigned_abs()))
}

/// Percentage with one decimal: `12.5%`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

#[must_use]
pub fn format_long_date(date: NaiveDate, locale: DisplayLocale) -> String {
    let pattern = match locale {
        DisplayLocale::Danish => "%-d. %B %Y",
        DisplayLocale::English => "%B %-d, %Y",
    };
    localized(date, pattern, locale)
}

/// Month and year, e.g. `juni 2024` or `June 2024`.
#[must_use]
pub fn format_month(date: NaiveDate, locale: DisplayLocale) -> String {
    localized(date, "%B %Y", locale)
}

/// Weekday name.
#[must_use]
pub fn format_day(date: NaiveDate, locale: DisplayLocale) -> String {
    localized(date, "%A", locale)
}

#[must_use]
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

fn localized(date: NaiveDate, pattern: &str, locale: DisplayLocale) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .format_localized(pattern, locale.chrono_locale())
        .to_string()
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
