//! Handlers and the handler factory.
//!
//! A handler bundles the matchers for one category with the processor that
//! folds a match into the accumulator:
//!
//! ```text
//! doc ──▶ matcher[0] ──none──▶ matcher[1] ──none──▶ ... ──▶ unmatched, acc unchanged
//!             │ some                │ some
//!             └──────────┬──────────┘
//!                        v
//!              processor(acc, match) ──▶ new acc, matched = true
//! ```
//!
//! Handlers are built once and never mutated; all per-call state travels in
//! the accumulator that [`Handler::apply`] takes by value and hands back.

use crate::document::TaggedDocument;
use crate::{Category, Matcher, ProcessorFn, RecurrenceOptions};
use tracing::{debug, trace};

/// Descriptive metadata attached to a handler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HandlerMeta {
    pub category: Category,
    /// Lower runs earlier.
    pub priority: u16,
    pub description: &'static str,
}

pub(crate) struct Handler {
    pub name: &'static str,
    pub meta: HandlerMeta,
    matchers: Vec<Matcher>,
    processor: ProcessorFn,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("matchers", &self.matchers.len())
            .field("processor", &"<function>")
            .finish()
    }
}

/// What one handler did to the accumulator.
#[derive(Debug, Clone)]
pub(crate) struct HandlerResult {
    pub options: RecurrenceOptions,
    pub matched: bool,
    pub matched_text: Option<String>,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

/// Bind `matchers` and `processor` into a named handler.
pub(crate) fn create_handler(
    name: &'static str,
    matchers: Vec<Matcher>,
    processor: ProcessorFn,
    meta: HandlerMeta,
) -> Handler {
    Handler { name, meta, matchers, processor }
}

impl Handler {
    pub(crate) fn category(&self) -> Category {
        self.meta.category
    }

    /// Try each matcher in order; fold the first hit into `options`.
    ///
    /// Matcher errors become warnings and the next matcher is tried.
    pub(crate) fn apply(&self, doc: &TaggedDocument, options: RecurrenceOptions) -> HandlerResult {
        let mut warnings = Vec::new();

        for (idx, matcher) in self.matchers.iter().enumerate() {
            match matcher(doc) {
                Ok(Some(found)) => {
                    debug_assert_eq!(found.category, self.category());
                    debug!(
                        handler = self.name,
                        matcher = idx,
                        text = %found.matched_text,
                        start = found.range.start,
                        end = found.range.end,
                        confidence = found.confidence,
                        "matched"
                    );
                    let options = (self.processor)(options, &found);
                    warnings.extend(found.warnings.iter().cloned());
                    return HandlerResult {
                        options,
                        matched: true,
                        matched_text: Some(found.matched_text),
                        confidence: found.confidence,
                        warnings,
                    };
                }
                Ok(None) => trace!(handler = self.name, matcher = idx, "no match"),
                Err(err) => {
                    debug!(handler = self.name, matcher = idx, %err, "partial match");
                    warnings.push(err.to_string());
                }
            }
        }

        HandlerResult { options, matched: false, matched_text: None, confidence: 0.0, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::{Frequency, MatchValue, PatternMatch, Range};
    use chrono::NaiveDate;

    fn doc(text: &str) -> TaggedDocument {
        let reference = NaiveDate::from_ymd_opt(2013, 2, 12).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TaggedDocument::new(text, reference)
    }

    fn never(_: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
        Ok(None)
    }

    fn broken(_: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
        Err(MatchError::UnresolvedDate { expression: "soon-ish".to_string() })
    }

    fn always_weekly(doc: &TaggedDocument) -> Result<Option<PatternMatch>, MatchError> {
        let range = Range { start: 0, end: doc.text().len() };
        Ok(Some(PatternMatch::new(Category::Frequency, MatchValue::Frequency(Frequency::Weekly), doc, range, 0.7)))
    }

    fn set_frequency(mut options: RecurrenceOptions, found: &PatternMatch) -> RecurrenceOptions {
        if let MatchValue::Frequency(f) = found.value {
            options.frequency = Some(f);
        }
        options
    }

    fn meta() -> HandlerMeta {
        HandlerMeta { category: Category::Frequency, priority: 1, description: "test" }
    }

    #[test]
    fn first_successful_matcher_wins() {
        let handler = create_handler("test", vec![never as Matcher, broken, always_weekly], set_frequency, meta());
        let result = handler.apply(&doc("weekly"), RecurrenceOptions::default());

        assert!(result.matched);
        assert_eq!(result.options.frequency, Some(Frequency::Weekly));
        assert_eq!(result.matched_text.as_deref(), Some("weekly"));
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn unmatched_handler_leaves_accumulator_untouched() {
        let handler = create_handler("test", vec![never as Matcher, broken], set_frequency, meta());
        let before = RecurrenceOptions { interval: 3, ..RecurrenceOptions::default() };
        let result = handler.apply(&doc("whatever"), before.clone());

        assert!(!result.matched);
        assert_eq!(result.options, before);
        assert_eq!(result.warnings, vec!["could not resolve end date \"soon-ish\"; ignoring end bound".to_string()]);
    }
}
