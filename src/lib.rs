//! Natural-language recurrence phrases to RRULE-shaped structures.
//!
//! ```text
//! raw text ── normalize ──▶ TaggedDocument ──▶ handlers (frequency → interval
//!                                               → weekday → month_day → end_date)
//!                                                        │
//!                                                        v
//!                                              RecurrenceOptions ──▶ cache
//! ```
//!
//! The public surface lives in `api.rs`; the handler machinery in `engine.rs`;
//! one module per pattern category under `rules/`.

extern crate self as recurrent;

#[macro_use]
mod macros;
mod api;
mod document;
mod engine;
mod error;
mod lexicon;
mod normalize;
mod rules;

pub use api::{
    Context, Frequency, HandlerTrace, ProcessDetails, ProcessMetrics, ProcessorOptions, RecurrenceDefaults,
    RecurrenceOptions, Weekday, process, process_verbose_with, process_with,
};
pub use engine::{PatternProcessor, ResultCache};
pub use normalize::{NormalizerOptions, normalize};

use crate::document::TaggedDocument;
use crate::error::MatchError;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

// --- Internal types ---------------------------------------------------------

/// The five pattern categories, in the order their handlers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Category {
    Frequency,
    Interval,
    Weekday,
    MonthDay,
    EndDate,
}

impl Category {
    pub(crate) const ALL: [Category; 5] =
        [Category::Frequency, Category::Interval, Category::Weekday, Category::MonthDay, Category::EndDate];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Category::Frequency => "frequency",
            Category::Interval => "interval",
            Category::Weekday => "weekday",
            Category::MonthDay => "month_day",
            Category::EndDate => "end_date",
        }
    }
}

/// Category-specific payload carried by a [`PatternMatch`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MatchValue {
    Frequency(Frequency),
    Interval { frequency: Frequency, interval: u32 },
    Weekdays(BTreeSet<Weekday>),
    MonthDays(BTreeSet<i32>),
    /// "first monday of the month": position is 1..=5, or -1 for "last".
    NthWeekday { weekday: Weekday, position: i32 },
    /// "every march 5"
    YearlyDate { month: u32, day: i32 },
    Months(BTreeSet<u32>),
    Until(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

/// A recognised fragment. Produced by a matcher, consumed once by the
/// category's processor, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PatternMatch {
    pub category: Category,
    pub value: MatchValue,
    /// Slice of the normalized text that produced this match.
    pub matched_text: String,
    pub range: Range,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl PatternMatch {
    pub(crate) fn new(category: Category, value: MatchValue, doc: &TaggedDocument, range: Range, confidence: f64) -> Self {
        let matched_text = doc.text().get(range.start..range.end).unwrap_or("").to_string();
        PatternMatch { category, value, matched_text, range, confidence, warnings: Vec::new() }
    }
}

/// Detects one surface form of one category.
///
/// `Ok(None)` means "not here" (including values rejected as invalid);
/// `Err` means the category was recognised but could not be resolved and
/// should surface as a warning.
pub(crate) type Matcher = fn(&TaggedDocument) -> Result<Option<PatternMatch>, MatchError>;

/// Folds a match into the accumulator, returning the new accumulator.
pub(crate) type ProcessorFn = fn(RecurrenceOptions, &PatternMatch) -> RecurrenceOptions;
