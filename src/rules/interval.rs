//! Interval: "every 3 days", "every other week", "biweekly".
//!
//! The unit decides the frequency, so this category always writes both
//! fields and may replace a frequency set earlier.

use crate::document::{Scope, TaggedDocument, Tags};
use crate::engine::Handler;
use crate::error::MatchError;
use crate::rules::helpers::{WEEKDAY_PATTERN, frequency_from_unit, parse_integer_text, pattern_match};
use crate::{Category, Frequency, MatchValue, PatternMatch, RecurrenceOptions};
use once_cell::sync::Lazy;
use regex::Regex;

static COUNTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bevery\s+(\d+|zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(days?|weeks?|months?|years?|weekdays?|weekends?|(?:{WEEKDAY_PATTERN})s?)\b"
    ))
    .unwrap()
});

static ALTERNATING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bevery\s+(?:other|second|alternate)\s+(days?|weeks?|months?|years?|weekdays?|weekends?|(?:{WEEKDAY_PATTERN})s?)\b"
    ))
    .unwrap()
});

pub(crate) fn handler() -> Handler {
    handler! {
        name: "interval",
        category: Category::Interval,
        priority: 20,
        description: "every N units, every other unit, named intervals",
        matchers: [counted, alternating, named],
        processor: set_interval,
    }
}

/// "every 3 weeks", "every two months". Zero is rejected.
fn counted(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::RECURRENCE_MARKER) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, &COUNTED) else {
        return Ok(None);
    };
    let interval = found.group(1).and_then(parse_integer_text).and_then(|n| u32::try_from(n).ok()).filter(|n| *n >= 1);
    let frequency = found.group(2).and_then(frequency_from_unit);

    Ok(match (frequency, interval) {
        (Some(frequency), Some(interval)) => {
            Some(pattern_match(Category::Interval, MatchValue::Interval { frequency, interval }, doc, &found, 0.95))
        }
        _ => None,
    })
}

/// "every other week", "every second month".
fn alternating(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::RECURRENCE_MARKER) {
        return Ok(None);
    }
    let Some(found) = doc.find(Scope::Body, &ALTERNATING) else {
        return Ok(None);
    };
    Ok(found.group(1).and_then(frequency_from_unit).map(|frequency| {
        pattern_match(Category::Interval, MatchValue::Interval { frequency, interval: 2 }, doc, &found, 0.9)
    }))
}

/// Single words that carry both unit and count. Normalization usually
/// rewrites these already; this catches them when synonyms are off.
fn named(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    let Some(found) = doc.find(
        Scope::Body,
        regex!(r"(?i)\b(fortnightly|bi[\s-]?weekly|bi[\s-]?monthly|quarterly|semi[\s-]?annually)\b"),
    ) else {
        return Ok(None);
    };
    let word = found.group(1).unwrap_or("").to_lowercase();
    let word: String = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    let (frequency, interval) = match word.as_str() {
        "fortnightly" | "biweekly" => (Frequency::Weekly, 2),
        "bimonthly" => (Frequency::Monthly, 2),
        "quarterly" => (Frequency::Monthly, 3),
        "semiannually" => (Frequency::Monthly, 6),
        _ => return Ok(None),
    };
    Ok(Some(pattern_match(Category::Interval, MatchValue::Interval { frequency, interval }, doc, &found, 0.9)))
}

fn set_interval(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
    if let MatchValue::Interval { frequency, interval } = found.value {
        options.frequency = Some(frequency);
        options.interval = interval.max(1);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;

    fn apply(text: &str, before: RecurrenceOptions) -> Option<RecurrenceOptions> {
        let doc = TaggedDocument::new(text, Context::default().reference_time);
        let result = handler().apply(&doc, before);
        result.matched.then_some(result.options)
    }

    fn interval_of(text: &str) -> Option<(Frequency, u32)> {
        apply(text, RecurrenceOptions::default()).and_then(|o| o.frequency.map(|f| (f, o.interval)))
    }

    #[test]
    fn counted_units() {
        assert_eq!(interval_of("every 2 weeks"), Some((Frequency::Weekly, 2)));
        assert_eq!(interval_of("every three days"), Some((Frequency::Daily, 3)));
        assert_eq!(interval_of("every 12 months"), Some((Frequency::Monthly, 12)));
        assert_eq!(interval_of("every 2 years"), Some((Frequency::Yearly, 2)));
        assert_eq!(interval_of("every 2 mondays"), Some((Frequency::Weekly, 2)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert_eq!(interval_of("every 0 days"), None);
        assert_eq!(interval_of("every zero weeks"), None);
    }

    #[test]
    fn alternating_units() {
        assert_eq!(interval_of("every other week"), Some((Frequency::Weekly, 2)));
        assert_eq!(interval_of("every second month"), Some((Frequency::Monthly, 2)));
        assert_eq!(interval_of("every other tuesday"), Some((Frequency::Weekly, 2)));
    }

    #[test]
    fn named_intervals() {
        assert_eq!(interval_of("biweekly"), Some((Frequency::Weekly, 2)));
        assert_eq!(interval_of("bi-monthly"), Some((Frequency::Monthly, 2)));
        assert_eq!(interval_of("quarterly"), Some((Frequency::Monthly, 3)));
        assert_eq!(interval_of("semi-annually"), Some((Frequency::Monthly, 6)));
    }

    #[test]
    fn overrides_earlier_frequency() {
        let before = RecurrenceOptions { frequency: Some(Frequency::Daily), ..RecurrenceOptions::default() };
        let after = apply("daily, actually every 2 weeks", before).unwrap();
        assert_eq!(after.frequency, Some(Frequency::Weekly));
        assert_eq!(after.interval, 2);
    }

    #[test]
    fn plain_every_is_not_an_interval() {
        assert_eq!(interval_of("every week"), None);
        assert_eq!(interval_of("every monday"), None);
    }
}
