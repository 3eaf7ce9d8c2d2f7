//! Month-day: positions within a month or a year.
//!
//! ```text
//! "first monday of every month"  -> NthWeekday { MO, 1 }
//! "last day of the month"        -> MonthDays {-1}
//! "every march 5"                -> YearlyDate { 3, 5 }
//! "on the 1 and 15"              -> MonthDays {1, 15}
//! "in june and july"             -> Months {6, 7}
//! ```
//!
//! Matchers are tried in that order; the ordinal-weekday form must win over
//! the plain day list because "the 2 tuesday" would otherwise read as day 2.

use crate::document::{Found, Scope, TaggedDocument, Tags};
use crate::engine::Handler;
use crate::error::MatchError;
use crate::lexicon::{month_from_name, weekday_from_name};
use crate::rules::helpers::date::max_days_in_month;
use crate::rules::helpers::{
    LIST_SEPARATOR, MONTH_PATTERN, ORDINAL_PATTERN, WEEKDAY_ABBREV_PATTERN, WEEKDAY_PATTERN, ordinal_position,
    pattern_match,
};
use crate::{Category, Frequency, MatchValue, PatternMatch, RecurrenceOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// "first monday of every month", "the last friday of the month".
static NTH_OF_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:the\s+)?({ORDINAL_PATTERN})\s+({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})\s+of\s+(?:the|every|each)\s+month\b"
    ))
    .unwrap()
});

/// "monthly on the 2 tuesday", "on the last sunday".
static ON_THE_NTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:on\s+)?the\s+({ORDINAL_PATTERN})\s+({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})\b"
    ))
    .unwrap()
});

/// "every first monday". "second" is left out: "every second monday" is an
/// interval.
static EVERY_NTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bevery\s+(first|third|fourth|fifth|last)\s+({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})\b"
    ))
    .unwrap()
});

static MONTH_THEN_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:every|each|yearly|annually|on)\s+(?:on\s+)?({MONTH_PATTERN})\.?\s+(?:the\s+)?(\d{{1,2}})\b"
    ))
    .unwrap()
});

static DAY_THEN_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:every|each|yearly|annually|on)\s+(?:on\s+)?(?:the\s+)?(\d{{1,2}})\s+(?:of\s+)?({MONTH_PATTERN})\b"
    ))
    .unwrap()
});

static DAY_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:on\s+the|on|the)\s+(\d{{1,2}}(?:{LIST_SEPARATOR}(?:the\s+)?\d{{1,2}})*)\b(?:\s+of\s+(?:the|every|each)\s+month\b)?"
    ))
    .unwrap()
});

static NAMED_MONTH_FOLLOWS: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)^\s+(?:of\s+)?(?:{MONTH_PATTERN})\b")).unwrap());

static MONTH_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bin\s+((?:{MONTH_PATTERN})(?:{LIST_SEPARATOR}(?:{MONTH_PATTERN}))*)\b"
    ))
    .unwrap()
});

pub(crate) fn handler() -> Handler {
    handler! {
        name: "month_day",
        category: Category::MonthDay,
        priority: 40,
        description: "days of the month, ordinal weekdays, yearly dates",
        matchers: [nth_weekday, last_day, yearly_date, day_list, in_months],
        processor: apply_month_day,
    }
}

fn nth_weekday(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::WEEKDAYISH) {
        return Ok(None);
    }
    if !doc.contains(Scope::Body, regex!(r"(?i)\b(?:first|second|third|fourth|fifth|last|[1-5](?:st|nd|rd|th)?)\b")) {
        return Ok(None);
    }
    for (pattern, confidence) in [(&*NTH_OF_MONTH, 0.95), (&*ON_THE_NTH, 0.85), (&*EVERY_NTH, 0.85)] {
        let Some(found) = doc.find(Scope::Body, pattern) else {
            continue;
        };
        let position = found.group(1).and_then(ordinal_position);
        let weekday = found.group(2).and_then(weekday_from_name);
        if let (Some(position), Some(weekday)) = (position, weekday) {
            let value = MatchValue::NthWeekday { weekday, position };
            return Ok(Some(pattern_match(Category::MonthDay, value, doc, &found, confidence)));
        }
    }
    Ok(None)
}

/// "last day of the month", "on the last day".
fn last_day(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::ORDINALISH) {
        return Ok(None);
    }
    let Some(found) = doc.find(
        Scope::Body,
        regex!(r"(?i)\b(?:on\s+)?(?:the\s+)?last\s+day(?:\s+of\s+(?:the|every|each)\s+month)?\b"),
    ) else {
        return Ok(None);
    };
    Ok(Some(pattern_match(Category::MonthDay, MatchValue::MonthDays(BTreeSet::from([-1])), doc, &found, 0.9)))
}

/// "every march 5", "annually on the 25 of december". A trailing year makes
/// it a single date, not a recurrence.
fn yearly_date(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::MONTHISH) || !doc.has_tag(Tags::HAS_DIGITS) {
        return Ok(None);
    }

    let candidates = [(&*MONTH_THEN_DAY, 1, 2), (&*DAY_THEN_MONTH, 2, 1)];
    for (pattern, month_group, day_group) in candidates {
        let Some(found) = doc.find(Scope::Body, pattern) else {
            continue;
        };
        if followed_by_year(doc, &found) {
            continue;
        }
        let month = found.group(month_group).and_then(month_from_name);
        let day = found.group(day_group).and_then(|d| d.parse::<u32>().ok());
        let (Some(month), Some(day)) = (month, day) else {
            continue;
        };
        // Feb 29 is accepted: it recurs in leap years.
        if day == 0 || max_days_in_month(month).is_none_or(|max| day > max) {
            continue;
        }
        let value = MatchValue::YearlyDate { month, day: day as i32 };
        return Ok(Some(pattern_match(Category::MonthDay, value, doc, &found, 0.9)));
    }
    Ok(None)
}

/// "on the 15", "the 1, 2 and 3 of every month". Any day outside 1..=31
/// rejects the whole list.
fn day_list(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::HAS_DIGITS) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, &DAY_LIST) else {
        return Ok(None);
    };
    // "the 2 weeks" is a duration, not a day.
    let rest = doc.text().get(found.range.end..).unwrap_or("");
    if regex!(r"(?i)^\s+(?:days?|weeks?|months?|years?)\b").is_match(rest) {
        return Ok(None);
    }
    // "the 31 of february" names one month; that is a yearly date or nothing.
    if NAMED_MONTH_FOLLOWS.is_match(rest) {
        return Ok(None);
    }

    let list = found.group(1).unwrap_or("");
    let mut days = BTreeSet::new();
    for number in regex!(r"\d+").find_iter(list) {
        match number.as_str().parse::<i32>() {
            Ok(day) if (1..=31).contains(&day) => {
                days.insert(day);
            }
            _ => return Ok(None),
        }
    }
    if days.is_empty() {
        return Ok(None);
    }
    Ok(Some(pattern_match(Category::MonthDay, MatchValue::MonthDays(days), doc, &found, 0.9)))
}

/// "in june", "in march, june and september".
fn in_months(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::MONTHISH) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, &MONTH_LIST) else {
        return Ok(None);
    };
    let list = found.group(1).unwrap_or("");
    let months: BTreeSet<u32> =
        regex!(r"[A-Za-z]+").find_iter(list).filter_map(|m| month_from_name(m.as_str())).collect();
    if months.is_empty() {
        return Ok(None);
    }
    Ok(Some(pattern_match(Category::MonthDay, MatchValue::Months(months), doc, &found, 0.8)))
}

fn followed_by_year(doc: &TaggedDocument, found: &Found) -> bool {
    let rest = doc.text().get(found.range.end..).unwrap_or("");
    regex!(r"^\s*,?\s*\d{4}\b").is_match(rest)
}

fn apply_month_day(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
    match &found.value {
        MatchValue::NthWeekday { weekday, position } => {
            options.by_weekday = Some(BTreeSet::from([*weekday]));
            options.by_set_pos.get_or_insert_with(BTreeSet::new).insert(*position);
            options.frequency = Some(Frequency::Monthly);
        }
        MatchValue::MonthDays(days) => {
            options.by_month_day.get_or_insert_with(BTreeSet::new).extend(days.iter().copied());
            fill_frequency(&mut options, Frequency::Monthly);
        }
        MatchValue::YearlyDate { month, day } => {
            options.by_month.get_or_insert_with(BTreeSet::new).insert(*month);
            options.by_month_day.get_or_insert_with(BTreeSet::new).insert(*day);
            fill_frequency(&mut options, Frequency::Yearly);
        }
        MatchValue::Months(months) => {
            options.by_month.get_or_insert_with(BTreeSet::new).extend(months.iter().copied());
            fill_frequency(&mut options, Frequency::Yearly);
        }
        _ => {}
    }
    options
}

fn fill_frequency(options: &mut RecurrenceOptions, frequency: Frequency) {
    if options.frequency.is_none() {
        options.frequency = Some(frequency);
    }
}
