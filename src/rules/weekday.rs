//! Weekday: explicit day names and the weekday/weekend groups.

use crate::document::{Found, Scope, TaggedDocument, Tags};
use crate::engine::Handler;
use crate::error::MatchError;
use crate::lexicon::weekday_from_name;
use crate::rules::helpers::{WEEKDAY_ABBREV_PATTERN, WEEKDAY_PATTERN, WEEKDAY_RANGE};
use crate::{Category, Frequency, MatchValue, PatternMatch, Range, RecurrenceOptions, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static DAY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})s?\b")).unwrap());

static DAY_OR_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(weekday|weekend|{WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})s?\b")).unwrap()
});

pub(crate) fn handler() -> Handler {
    handler! {
        name: "weekday",
        category: Category::Weekday,
        priority: 30,
        description: "day names and the weekday/weekend groups",
        matchers: [ranges, groups, names],
        processor: union_weekdays,
    }
}

/// "monday through friday", "fri-mon" (wraps past Sunday). Days named
/// outside the range still count.
fn ranges(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::WEEKDAYISH) {
        return Ok(None);
    }
    let spans = doc.find_all(Scope::Body, &WEEKDAY_RANGE);
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return Ok(None);
    };

    let mut days: BTreeSet<Weekday> = spans.iter().flat_map(span_days).collect();
    let mut start = first.range.start;
    let mut end = last.range.end;
    for hit in doc.find_all(Scope::Body, &DAY_OR_GROUP) {
        days.extend(days_of(&hit));
        start = start.min(hit.range.start);
        end = end.max(hit.range.end);
    }
    Ok(Some(PatternMatch::new(Category::Weekday, MatchValue::Weekdays(days), doc, Range { start, end }, 0.95)))
}

fn span_days(found: &Found) -> Vec<Weekday> {
    const WEEK: [Weekday; 7] =
        [Weekday::Mo, Weekday::Tu, Weekday::We, Weekday::Th, Weekday::Fr, Weekday::Sa, Weekday::Su];
    let position = |idx| found.group(idx).and_then(weekday_from_name).and_then(|d| WEEK.iter().position(|w| *w == d));
    let (Some(from), Some(to)) = (position(1), position(2)) else {
        return Vec::new();
    };
    let len = (to + 7 - from) % 7 + 1;
    (0..len).map(|i| WEEK[(from + i) % 7]).collect()
}

/// "weekdays", "weekends and mondays". Explicit names next to a group are
/// collected too.
fn groups(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::WEEKDAY_GROUP) {
        return Ok(None);
    }
    Ok(collect(doc, &DAY_OR_GROUP, 0.95))
}

/// "monday", "tue and thu".
fn names(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::WEEKDAYISH) {
        return Ok(None);
    }
    Ok(collect(doc, &DAY_NAME, 0.9))
}

fn collect(doc: &TaggedDocument, pattern: &Regex, confidence: f64) -> Option<PatternMatch> {
    let hits = doc.find_all(Scope::Body, pattern);
    let days: BTreeSet<Weekday> = hits.iter().flat_map(days_of).collect();
    if days.is_empty() {
        return None;
    }

    let start = hits.first().map(|f| f.range.start)?;
    let end = hits.last().map(|f| f.range.end)?;
    Some(PatternMatch::new(Category::Weekday, MatchValue::Weekdays(days), doc, Range { start, end }, confidence))
}

fn days_of(found: &Found) -> Vec<Weekday> {
    let word = found.group(1).unwrap_or("").to_lowercase();
    match word.as_str() {
        "weekday" => Weekday::WORKWEEK.to_vec(),
        "weekend" => Weekday::WEEKEND.to_vec(),
        other => weekday_from_name(other).into_iter().collect(),
    }
}

/// Unions into the existing set. Fills an unset frequency with weekly but
/// never replaces a monthly/yearly one: "the first monday of every month"
/// qualifies months.
fn union_weekdays(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
    if let MatchValue::Weekdays(days) = &found.value {
        options.by_weekday.get_or_insert_with(BTreeSet::new).extend(days.iter().copied());
        if options.frequency.is_none() {
            options.frequency = Some(Frequency::Weekly);
        }
    }
    options
}
