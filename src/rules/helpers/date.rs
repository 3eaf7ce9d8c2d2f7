//! End-date resolution.
//!
//! Turns the expression after "until"/"through"/... into a calendar date.
//! Explicit numeric and month-name forms are handled here; anything else is
//! handed to `chrono-english` relative to the reference time.
//!
//! ```text
//! "2024-01-31"            -> 2024-01-31
//! "1/31/24"               -> 2024-01-31   (US order)
//! "december 31, 2023"     -> 2023-12-31
//! "5 march"               -> next March 5 on/after the reference date
//! "december"              -> last day of the next December
//! "next friday"           -> chrono-english
//! ```

use super::MONTH_PATTERN;
use crate::error::MatchError;
use crate::lexicon::month_from_name;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_english::{Dialect, parse_date_string};
use once_cell::sync::Lazy;
use regex::Regex;

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^({MONTH_PATTERN})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?$")).unwrap()
});

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_PATTERN})\.?(?:,?\s+(\d{{4}}))?$"))
        .unwrap()
});

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)^({MONTH_PATTERN})\.?(?:,?\s+(\d{{4}}))?$")).unwrap());

/// How many years ahead a year-less date may roll (enough to reach a Feb 29).
const MAX_YEAR_ROLL: i32 = 8;

/// Resolve `expression` to a date, relative to `reference` when it carries no year.
pub(crate) fn resolve_date_expression(expression: &str, reference: NaiveDateTime) -> Result<NaiveDate, MatchError> {
    let expr = clean_expression(expression);
    let invalid = || MatchError::InvalidDate { expression: expression.trim().to_string() };

    if let Some(caps) = regex!(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").captures(&expr) {
        let year: Option<i32> = caps[1].parse().ok();
        let month: Option<u32> = caps[2].parse().ok();
        let day: Option<u32> = caps[3].parse().ok();
        return match (year, month, day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid),
            _ => Err(invalid()),
        };
    }

    if let Some(caps) = regex!(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").captures(&expr) {
        let month: Option<u32> = caps[1].parse().ok();
        let day: Option<u32> = caps[2].parse().ok();
        let year: Option<i32> = caps[3].parse().ok().map(|y: i32| if caps[3].len() == 2 { 2000 + y } else { y });
        return match (year, month, day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid),
            _ => Err(invalid()),
        };
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(&expr) {
        let month = month_from_name(&caps[1]).ok_or_else(invalid)?;
        let day: u32 = caps[2].parse().map_err(|_| invalid())?;
        return match caps.get(3) {
            Some(year) => {
                let year: i32 = year.as_str().parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
            }
            None => next_occurrence(month, day, reference).ok_or_else(invalid),
        };
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(&expr) {
        let day: u32 = caps[1].parse().map_err(|_| invalid())?;
        let month = month_from_name(&caps[2]).ok_or_else(invalid)?;
        return match caps.get(3) {
            Some(year) => {
                let year: i32 = year.as_str().parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
            }
            None => next_occurrence(month, day, reference).ok_or_else(invalid),
        };
    }

    if let Some(caps) = MONTH_YEAR.captures(&expr) {
        let month = month_from_name(&caps[1]).ok_or_else(invalid)?;
        return match caps.get(2) {
            Some(year) => {
                let year: i32 = year.as_str().parse().map_err(|_| invalid())?;
                last_day_of_month(year, month).ok_or_else(invalid)
            }
            None => {
                let this_year = last_day_of_month(reference.year(), month).ok_or_else(invalid)?;
                if this_year >= reference.date() {
                    Ok(this_year)
                } else {
                    last_day_of_month(reference.year() + 1, month).ok_or_else(invalid)
                }
            }
        };
    }

    let now = Utc.from_utc_datetime(&reference);
    parse_date_string(&expr, now, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|_| MatchError::UnresolvedDate { expression: expression.trim().to_string() })
}

/// Strip fillers that do not change the date: "the", "end of", "on", trailing
/// punctuation.
fn clean_expression(expression: &str) -> String {
    let mut expr = expression.trim().trim_end_matches(['.', ',', ';', '!', '?']).trim().to_lowercase();
    for prefix in ["on ", "the end of ", "end of ", "the "] {
        if let Some(rest) = expr.strip_prefix(prefix) {
            expr = rest.trim_start().to_string();
        }
    }
    expr
}

/// First `month`/`day` on or after the reference date.
fn next_occurrence(month: u32, day: u32, reference: NaiveDateTime) -> Option<NaiveDate> {
    let today = reference.date();
    (0..=MAX_YEAR_ROLL)
        .filter_map(|offset| NaiveDate::from_ymd_opt(reference.year() + offset, month, day))
        .find(|date| *date >= today)
}

pub(crate) fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Largest day number `month` can have in any year (February counts 29).
pub(crate) fn max_days_in_month(month: u32) -> Option<u32> {
    match month {
        2 => Some(29),
        4 | 6 | 9 | 11 => Some(30),
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        _ => None,
    }
}
