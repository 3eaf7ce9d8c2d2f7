//! Frequency: "daily", "every week", "once a month".

use crate::document::{Scope, TaggedDocument, Tags};
use crate::engine::Handler;
use crate::error::MatchError;
use crate::rules::helpers::{frequency_from_adverb, frequency_from_unit, pattern_match};
use crate::{Category, MatchValue, PatternMatch, RecurrenceOptions};

pub(crate) fn handler() -> Handler {
    handler! {
        name: "frequency",
        category: Category::Frequency,
        priority: 10,
        description: "daily/weekly/monthly/yearly and their phrase forms",
        matchers: [adverb, every_unit, per_unit],
        processor: set_frequency,
    }
}

fn adverb(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::FREQUENCY_WORD) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, regex!(r"(?i)\b(daily|weekly|monthly|yearly|annually)\b")) else {
        return Ok(None);
    };
    Ok(found
        .group(1)
        .and_then(frequency_from_adverb)
        .map(|f| pattern_match(Category::Frequency, MatchValue::Frequency(f), doc, &found, 0.95)))
}

/// "every day", "every month". A count or "other" in between belongs to the
/// interval category.
fn every_unit(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::RECURRENCE_MARKER) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, regex!(r"(?i)\bevery\s+(day|week|month|year)\b")) else {
        return Ok(None);
    };
    Ok(found
        .group(1)
        .and_then(frequency_from_unit)
        .map(|f| pattern_match(Category::Frequency, MatchValue::Frequency(f), doc, &found, 0.9)))
}

/// "once a week", "per month", "a day".
fn per_unit(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::FREQUENCY_WORD) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, regex!(r"(?i)\b(?:once\s+)?(?:a|per)\s+(day|week|month|year)\b")) else {
        return Ok(None);
    };
    Ok(found
        .group(1)
        .and_then(frequency_from_unit)
        .map(|f| pattern_match(Category::Frequency, MatchValue::Frequency(f), doc, &found, 0.85)))
}

/// Only fills an unset frequency; interval patterns are the ones allowed to
/// overwrite.
fn set_frequency(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
    if let MatchValue::Frequency(frequency) = found.value {
        if options.frequency.is_none() {
            options.frequency = Some(frequency);
        }
    }
    options
}
