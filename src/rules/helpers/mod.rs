pub mod date;
pub mod parse;

pub use parse::*;

use crate::document::{Found, TaggedDocument};
use crate::{Category, MatchValue, PatternMatch};
use once_cell::sync::Lazy;
use regex::Regex;

/// Alternation of month names and abbreviations, for building patterns.
pub(crate) const MONTH_PATTERN: &str = "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec";

/// Alternation of full weekday names.
pub(crate) const WEEKDAY_PATTERN: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

/// Weekday abbreviations, longest first so "thurs" is not cut at "thu".
pub(crate) const WEEKDAY_ABBREV_PATTERN: &str = "thurs|thur|thu|tues|tue|weds|wed|mon|fri|sat|sun";

/// Alternation of ordinal words, digits 1-5 (suffix optional) and "last".
pub(crate) const ORDINAL_PATTERN: &str = r"first|second|third|fourth|fifth|last|[1-5](?:st|nd|rd|th)?";

/// Separator between items of a spoken list: "1, 2 and 3", "june & july".
pub(crate) const LIST_SEPARATOR: &str = r"(?:\s*,\s*and\s+|\s*,\s*|\s+and\s+|\s*&\s*)";

/// "monday through friday", "mon-fri", "mondays to every friday". Groups 1
/// and 2 are the endpoints.
pub(crate) static WEEKDAY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})s?(?:\s+(?:through|thru|to)\s+|\s*-\s*)(?:every\s+)?({WEEKDAY_PATTERN}|{WEEKDAY_ABBREV_PATTERN})s?\b"
    ))
    .unwrap()
});

/// Wrap a regex hit as a match covering exactly the hit.
pub(crate) fn pattern_match(
    category: Category,
    value: MatchValue,
    doc: &TaggedDocument,
    found: &Found,
    confidence: f64,
) -> PatternMatch {
    let matched = PatternMatch::new(category, value, doc, found.range.clone(), confidence);
    debug_assert_eq!(matched.matched_text, found.text());
    matched
}
