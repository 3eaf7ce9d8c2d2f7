//! End date: "until december 31, 2023", "ending on 2024-01-31", "thru next friday".
//!
//! Only the end clause of the document is searched. Resolution failures do
//! not fail the run: the handler reports a warning and leaves `until` unset.

use crate::document::{Scope, TaggedDocument, Tags};
use crate::engine::Handler;
use crate::error::MatchError;
use crate::rules::helpers::date::resolve_date_expression;
use crate::rules::helpers::pattern_match;
use crate::{Category, Frequency, MatchValue, PatternMatch, RecurrenceOptions};

pub(crate) fn handler() -> Handler {
    handler! {
        name: "end_date",
        category: Category::EndDate,
        priority: 50,
        description: "until/through/ending <date>",
        matchers: [until],
        processor: set_until,
    }
}

fn until(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
    if !doc.has_tag(Tags::END_MARKER) {
        return Ok(None);
    }
    let Some(found) = doc.find(
        Scope::EndClause,
        regex!(r"(?i)^(?:until|till|til|through|thru|ending(?:\s+on)?|ends(?:\s+on)?|up\s+to)\s+(.+?)\s*$"),
    ) else {
        return Ok(None);
    };
    let expression = found.group(1).unwrap_or("");
    let date = resolve_date_expression(expression, doc.reference_time())?;

    // Inclusive bound: the whole final day counts.
    let until = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| MatchError::InvalidDate { expression: expression.to_string() })?;
    let value = MatchValue::Until(until);
    Ok(Some(pattern_match(Category::EndDate, value, doc, &found, 0.9)))
}

/// Sets the bound; a bare end date with nothing else implies daily.
fn set_until(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
    if let MatchValue::Until(until) = found.value {
        options.until = Some(until);
        if options.frequency.is_none() {
            options.frequency = Some(Frequency::Daily);
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use chrono::{NaiveDate, NaiveDateTime};

    fn apply(text: &str) -> (bool, RecurrenceOptions, Vec<String>) {
        let doc = TaggedDocument::new(text, Context::default().reference_time);
        let result = handler().apply(&doc, RecurrenceOptions::default());
        (result.matched, result.options, result.warnings)
    }

    fn end_of(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(23, 59, 59))
    }

    #[test]
    fn resolves_to_end_of_day() {
        let (matched, options, warnings) = apply("every monday until december 31, 2023");
        assert!(matched);
        assert_eq!(options.until, end_of(2023, 12, 31));
        assert!(warnings.is_empty());
    }

    #[test]
    fn marker_variants() {
        assert_eq!(apply("daily through 2024-01-31").1.until, end_of(2024, 1, 31));
        assert_eq!(apply("weekly ending on 3/15/2024").1.until, end_of(2024, 3, 15));
        assert_eq!(apply("every day up to march 3").1.until, end_of(2013, 3, 3));
        assert_eq!(apply("every day till the end of june").1.until, end_of(2013, 6, 30));
    }

    #[test]
    fn bare_end_date_defaults_to_daily() {
        let (_, options, _) = apply("until 2024-01-31");
        assert_eq!(options.frequency, Some(Frequency::Daily));
    }

    #[test]
    fn unresolvable_date_is_a_warning() {
        let (matched, options, warnings) = apply("every monday until someday maybe");
        assert!(!matched);
        assert!(options.until.is_none());
        assert_eq!(warnings, vec!["could not resolve end date \"someday maybe\"; ignoring end bound".to_string()]);
    }

    #[test]
    fn invalid_date_is_a_warning() {
        let (matched, _, warnings) = apply("daily until february 30, 2023");
        assert!(!matched);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not a valid calendar date"));
    }

    #[test]
    fn dangling_marker_is_not_a_match() {
        let (matched, _, warnings) = apply("every monday until");
        assert!(!matched);
        assert!(warnings.is_empty());
    }
}
