//! Tagged document: the normalized text plus cheap capability queries.
//!
//! Built once per call and shared read-only by every matcher. The tag scan is
//! a heuristic pre-classification in the spirit of a trigger scan: matchers
//! check a tag first and skip their regexes entirely when it is absent. False
//! positives are fine, the regex still has to match.
//!
//! The text is split at the first end marker ("until", "through", ...) so
//! that a date inside the end bound ("until december 31") is never mistaken
//! for a month-day or yearly pattern.

use crate::Range;
use crate::lexicon::{DAY_OF_WEEK, MONTH_NAME};
use crate::rules::helpers::WEEKDAY_RANGE;
use chrono::NaiveDateTime;
use regex::Regex;
use tracing::trace;

bitflags::bitflags! {
    /// Coarse lexical categories present in the text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Tags: u16 {
        const HAS_DIGITS        = 1 << 0;
        const WEEKDAYISH        = 1 << 1;
        const WEEKDAY_GROUP     = 1 << 2;
        const MONTHISH          = 1 << 3;
        const ORDINALISH        = 1 << 4;
        const FREQUENCY_WORD    = 1 << 5;
        const RECURRENCE_MARKER = 1 << 6;
        const END_MARKER        = 1 << 7;
    }
}

/// Which part of the document a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Everything before the end marker.
    Body,
    /// From the end marker to the end of the text (empty when absent).
    EndClause,
}

/// A regex hit. Offsets are into the full document text.
#[derive(Debug, Clone)]
pub(crate) struct Found {
    pub range: Range,
    groups: Vec<Option<String>>,
}

impl Found {
    /// Capture group `idx` (0 is the whole match).
    pub(crate) fn group(&self, idx: usize) -> Option<&str> {
        self.groups.get(idx).and_then(|g| g.as_deref())
    }

    pub(crate) fn text(&self) -> &str {
        self.group(0).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TaggedDocument {
    text: String,
    tags: Tags,
    end_clause: Option<usize>,
    reference_time: NaiveDateTime,
}

impl TaggedDocument {
    pub(crate) fn new(text: impl Into<String>, reference_time: NaiveDateTime) -> Self {
        let text = text.into();
        let end_clause = end_marker(&text);
        let mut tags = scan(&text);
        if end_clause.is_some() {
            tags |= Tags::END_MARKER;
        }

        trace!(text = %text, ?tags, ?end_clause, "tagged document");
        TaggedDocument { text, tags, end_clause, reference_time }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
    }

    pub(crate) fn has_tag(&self, tag: Tags) -> bool {
        self.tags.contains(tag)
    }

    pub(crate) fn contains(&self, scope: Scope, pattern: &Regex) -> bool {
        let (_, slice) = self.slice(scope);
        pattern.is_match(slice)
    }

    /// First match of `pattern` within `scope`.
    pub(crate) fn find(&self, scope: Scope, pattern: &Regex) -> Option<Found> {
        let (offset, slice) = self.slice(scope);
        pattern.captures(slice).map(|caps| found_from(offset, &caps))
    }

    /// Every non-overlapping match of `pattern` within `scope`, left to right.
    pub(crate) fn find_all(&self, scope: Scope, pattern: &Regex) -> Vec<Found> {
        let (offset, slice) = self.slice(scope);
        pattern.captures_iter(slice).map(|caps| found_from(offset, &caps)).collect()
    }

    fn slice(&self, scope: Scope) -> (usize, &str) {
        let split = self.end_clause.unwrap_or(self.text.len());
        match scope {
            Scope::Body => (0, &self.text[..split]),
            Scope::EndClause => (split, &self.text[split..]),
        }
    }
}

/// Start of the first end marker. A "through" joining two day names is a
/// weekday range, not an end bound.
fn end_marker(text: &str) -> Option<usize> {
    let ranges: Vec<Range> =
        WEEKDAY_RANGE.find_iter(text).map(|m| Range { start: m.start(), end: m.end() }).collect();
    regex!(r"(?i)\b(?:until|till|til|through|thru|ending|ends|up\s+to)\b")
        .find_iter(text)
        .map(|m| m.start())
        .find(|start| !ranges.iter().any(|r| r.start < *start && *start < r.end))
}

fn found_from(offset: usize, caps: &regex::Captures<'_>) -> Found {
    let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
    Found {
        range: Range { start: offset + whole.0, end: offset + whole.1 },
        groups: caps.iter().map(|g| g.map(|m| m.as_str().to_string())).collect(),
    }
}

fn scan(text: &str) -> Tags {
    let mut tags = Tags::empty();
    if text.bytes().any(|b| b.is_ascii_digit()) {
        tags |= Tags::HAS_DIGITS;
    }

    const ORDINALS: &[&str] = &["first", "second", "third", "fourth", "fifth", "last"];
    const FREQUENCY_WORDS: &[&str] = &[
        "daily",
        "weekly",
        "monthly",
        "yearly",
        "annually",
        "fortnightly",
        "biweekly",
        "bimonthly",
        "quarterly",
        "semiannually",
        "day",
        "days",
        "week",
        "weeks",
        "month",
        "months",
        "year",
        "years",
    ];
    const MARKERS: &[&str] = &["every", "each", "other", "per", "once", "alternate"];

    let lower = text.to_lowercase();
    for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let singular = word.strip_suffix('s').unwrap_or(word);
        if DAY_OF_WEEK.contains_key(word) || DAY_OF_WEEK.contains_key(singular) {
            tags |= Tags::WEEKDAYISH;
        }
        if matches!(singular, "weekday" | "weekend") {
            tags |= Tags::WEEKDAY_GROUP;
        }
        if MONTH_NAME.contains_key(word) {
            tags |= Tags::MONTHISH;
        }
        if ORDINALS.contains(&word) {
            tags |= Tags::ORDINALISH;
        }
        if FREQUENCY_WORDS.contains(&word) {
            tags |= Tags::FREQUENCY_WORD;
        }
        if MARKERS.contains(&word) {
            tags |= Tags::RECURRENCE_MARKER;
        }
    }
    tags
}
