//! The orchestrator.
//!
//! ```text
//! (0) cache lookup          -> copy of cached result
//! (1) fast path             "daily" / "weekly" / ... -> minimal result
//! (2) normalize + tag once  -> TaggedDocument
//! (3) fold handlers         frequency → interval → weekday → month_day → end_date
//! (4) nothing matched       -> None
//! (5) caller defaults       -> fill unset fields
//! (6) cache write
//! ```
//!
//! Precedence between categories is purely positional: each handler sees the
//! accumulator left by the ones before it, and the processors decide whether
//! they may overwrite (interval may replace frequency; weekday and month-day
//! only fill an unset frequency; the ordinal month form forces monthly).

use super::cache::{CacheEntry, CacheKey, ResultCache};
use super::handler::Handler;
use super::metrics::RunResult;
use crate::document::TaggedDocument;
use crate::normalize::{NormalizerOptions, normalize};
use crate::{Category, Context, Frequency, HandlerTrace, ProcessMetrics, ProcessorOptions, RecurrenceOptions};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

static DEFAULT_HANDLERS: Lazy<Vec<Handler>> = Lazy::new(crate::rules::get);

/// Runs registered handlers over normalized input and caches the results.
///
/// The cache is injected so its lifetime and sharing are decided by whoever
/// builds the processor.
#[derive(Debug)]
pub struct PatternProcessor {
    handlers: &'static [Handler],
    cache: Option<Arc<ResultCache>>,
}

impl Default for PatternProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternProcessor {
    /// Default handlers and a private cache of [`ResultCache::DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(ResultCache::default()))
    }

    /// Default handlers sharing `cache`.
    pub fn with_cache(cache: Arc<ResultCache>) -> Self {
        PatternProcessor { handlers: &DEFAULT_HANDLERS, cache: Some(cache) }
    }

    /// Default handlers, no caching regardless of `use_cache`.
    pub fn without_cache() -> Self {
        PatternProcessor { handlers: &DEFAULT_HANDLERS, cache: None }
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    /// Process `pattern`; `None` means no category was recognised.
    pub fn process(&self, pattern: &str, context: &Context, options: &ProcessorOptions) -> Option<RecurrenceOptions> {
        self.run(pattern, context, options).result
    }

    pub(crate) fn run(&self, pattern: &str, context: &Context, options: &ProcessorOptions) -> RunResult {
        let started = Instant::now();

        let key = match (&self.cache, options.use_cache) {
            (Some(_), true) => Some(CacheKey::new(pattern, context, options)),
            _ => None,
        };

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(entry) = cache.get(key) {
                debug!(pattern, fast_path = entry.fast_path, age = ?entry.inserted_at.elapsed(), "cache hit");
                let metrics = ProcessMetrics {
                    total: started.elapsed(),
                    fast_path: entry.fast_path,
                    cache_hit: true,
                    ..ProcessMetrics::default()
                };
                let result = entry.result.map(|r| with_metrics(r, options, &metrics));
                return RunResult::shortcut(result, metrics);
            }
            debug!(pattern, "cache miss");
        }

        let mut warnings = Vec::new();
        let handlers = self.select_handlers(options, &mut warnings);

        let run = match fast_path(pattern, &handlers) {
            Some(frequency) => {
                debug!(pattern, %frequency, "fast path");
                let result = RecurrenceOptions { frequency: Some(frequency), confidence: 1.0, ..RecurrenceOptions::default() };
                let result = options.defaults.apply(result, false);
                let metrics = ProcessMetrics { total: started.elapsed(), fast_path: true, ..ProcessMetrics::default() };
                let result = with_warnings(result, warnings);
                RunResult::shortcut(Some(with_metrics(result, options, &metrics)), metrics)
            }
            None => self.fold(pattern, context, options, &handlers, warnings, started),
        };

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            let entry = CacheEntry { result: run.result.clone(), inserted_at: Instant::now(), fast_path: run.metrics.fast_path };
            cache.insert(key, entry);
        }

        run
    }

    fn fold(
        &self,
        pattern: &str,
        context: &Context,
        options: &ProcessorOptions,
        handlers: &[&Handler],
        mut warnings: Vec<String>,
        started: Instant,
    ) -> RunResult {
        let normalizer = NormalizerOptions { correct_misspellings: options.correct_misspellings, ..NormalizerOptions::default() };
        let normalize_started = Instant::now();
        let normalized = normalize(pattern, &normalizer);
        let normalize_elapsed = normalize_started.elapsed();

        let doc = TaggedDocument::new(normalized.clone(), context.reference_time);

        let mut acc = RecurrenceOptions::default();
        let mut traces = Vec::with_capacity(handlers.len());
        let mut confidence: f64 = 0.0;
        let mut matched = 0;
        let mut interval_matched = false;

        for handler in handlers {
            let outcome = handler.apply(&doc, acc);
            acc = outcome.options;
            warnings.extend(outcome.warnings.iter().cloned());

            if outcome.matched {
                matched += 1;
                confidence = confidence.max(outcome.confidence);
                interval_matched |= handler.category() == Category::Interval;
            }

            traces.push(HandlerTrace {
                name: handler.name.to_string(),
                description: handler.meta.description.to_string(),
                matched: outcome.matched,
                matched_text: outcome.matched_text,
                confidence: outcome.confidence,
                warnings: outcome.warnings,
            });
        }

        let metrics = ProcessMetrics {
            total: started.elapsed(),
            normalize: normalize_elapsed,
            handlers_run: handlers.len(),
            handlers_matched: matched,
            fast_path: false,
            cache_hit: false,
        };

        let result = if matched == 0 {
            debug!(pattern, normalized = %normalized, "no handler matched");
            None
        } else {
            let acc = RecurrenceOptions { confidence, ..acc };
            let acc = options.defaults.apply(acc, interval_matched);
            Some(with_metrics(with_warnings(acc, warnings), options, &metrics))
        };

        RunResult { result, normalized: Some(normalized), handlers: traces, metrics }
    }

    /// Registered handlers in priority order, restricted to `force_handlers`
    /// when given. Unknown names become warnings.
    fn select_handlers(&self, options: &ProcessorOptions, warnings: &mut Vec<String>) -> Vec<&'static Handler> {
        let Some(forced) = &options.force_handlers else {
            return self.handlers.iter().collect();
        };

        for name in forced {
            let known = Category::ALL.iter().any(|c| c.as_str() == name.as_str())
                || self.handlers.iter().any(|h| h.name == name.as_str());
            if !known {
                warnings.push(format!("unknown handler \"{name}\" ignored"));
            }
        }

        self.handlers
            .iter()
            .filter(|h| forced.contains(h.name) || forced.contains(h.category().as_str()))
            .collect()
    }
}

/// Single-word inputs answered without normalizing or tagging.
fn fast_path(pattern: &str, handlers: &[&Handler]) -> Option<Frequency> {
    if !handlers.iter().any(|h| h.category() == Category::Frequency) {
        return None;
    }
    match pattern.trim().to_lowercase().as_str() {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "monthly" => Some(Frequency::Monthly),
        "yearly" | "annually" => Some(Frequency::Yearly),
        _ => None,
    }
}

fn with_warnings(mut result: RecurrenceOptions, warnings: Vec<String>) -> RecurrenceOptions {
    result.warnings.extend(warnings);
    result
}

fn with_metrics(mut result: RecurrenceOptions, options: &ProcessorOptions, metrics: &ProcessMetrics) -> RecurrenceOptions {
    result.metrics = options.collect_metrics.then(|| metrics.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecurrenceDefaults, Weekday};
    use std::collections::BTreeSet;

    fn uncached() -> ProcessorOptions {
        ProcessorOptions { use_cache: false, ..ProcessorOptions::default() }
    }

    #[test]
    fn handlers_are_registered_in_category_order() {
        let order: Vec<Category> = DEFAULT_HANDLERS.iter().map(|h| h.category()).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert!(DEFAULT_HANDLERS.windows(2).all(|w| w[0].meta.priority < w[1].meta.priority));
    }

    #[test]
    fn fast_path_skips_normalization() {
        let processor = PatternProcessor::without_cache();
        let run = processor.run("  Weekly ", &Context::default(), &uncached());
        assert!(run.metrics.fast_path);
        assert!(run.normalized.is_none());
        let result = run.result.unwrap();
        assert_eq!(result.frequency, Some(Frequency::Weekly));
        assert_eq!(result.interval, 1);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn fast_path_respects_forced_handlers() {
        let processor = PatternProcessor::without_cache();
        let options = ProcessorOptions {
            force_handlers: Some(BTreeSet::from(["weekday".to_string()])),
            ..uncached()
        };
        assert_eq!(processor.process("daily", &Context::default(), &options), None);
    }

    #[test]
    fn unknown_forced_handler_is_a_warning() {
        let processor = PatternProcessor::without_cache();
        let options = ProcessorOptions {
            force_handlers: Some(BTreeSet::from(["weekday".to_string(), "weekdya".to_string()])),
            ..uncached()
        };
        let result = processor.process("every 2 weeks on monday", &Context::default(), &options).unwrap();
        // Interval was not allowed to run.
        assert_eq!(result.interval, 1);
        assert_eq!(result.by_weekday, Some(BTreeSet::from([Weekday::Mo])));
        assert_eq!(result.warnings, vec!["unknown handler \"weekdya\" ignored".to_string()]);
    }

    #[test]
    fn misspelling_correction_follows_options() {
        let processor = PatternProcessor::without_cache();
        let ctx = Context::default();

        let corrected = processor.process("every wendesday", &ctx, &uncached()).unwrap();
        assert_eq!(corrected.by_weekday, Some(BTreeSet::from([Weekday::We])));

        let literal = ProcessorOptions { correct_misspellings: false, ..uncached() };
        assert_eq!(processor.process("every wendesday", &ctx, &literal), None);
    }

    #[test]
    fn correction_setting_is_part_of_the_cache_key() {
        let cache = Arc::new(ResultCache::new(8));
        let processor = PatternProcessor::with_cache(Arc::clone(&cache));
        let ctx = Context::default();

        assert!(processor.process("every wendesday", &ctx, &ProcessorOptions::default()).is_some());
        let literal = ProcessorOptions { correct_misspellings: false, ..ProcessorOptions::default() };
        assert_eq!(processor.process("every wendesday", &ctx, &literal), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_returns_equal_copies() {
        let cache = Arc::new(ResultCache::new(8));
        let processor = PatternProcessor::with_cache(Arc::clone(&cache));
        let ctx = Context::default();
        let options = ProcessorOptions::default();

        let mut first = processor.process("every monday and wednesday", &ctx, &options).unwrap();
        assert_eq!(cache.len(), 1);
        let second = processor.process("every monday and wednesday", &ctx, &options).unwrap();
        assert_eq!(first, second);

        // Mutating a returned value does not reach the cache.
        first.interval = 9;
        let third = processor.process("every monday and wednesday", &ctx, &options).unwrap();
        assert_eq!(third.interval, 1);

        let fresh = processor.process("every monday and wednesday", &ctx, &uncached()).unwrap();
        assert_eq!(fresh, second);
    }

    #[test]
    fn cache_remembers_unrecognised_input() {
        let cache = Arc::new(ResultCache::new(8));
        let processor = PatternProcessor::with_cache(Arc::clone(&cache));
        let ctx = Context::default();
        assert_eq!(processor.process("not a pattern", &ctx, &ProcessorOptions::default()), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(processor.process("not a pattern", &ctx, &ProcessorOptions::default()), None);
    }

    #[test]
    fn disabled_cache_is_not_written() {
        let cache = Arc::new(ResultCache::new(8));
        let processor = PatternProcessor::with_cache(Arc::clone(&cache));
        processor.process("daily", &Context::default(), &uncached());
        assert!(cache.is_empty());
    }

    #[test]
    fn metrics_attach_only_when_asked() {
        let processor = PatternProcessor::without_cache();
        let ctx = Context::default();
        let plain = processor.process("every other week", &ctx, &uncached()).unwrap();
        assert!(plain.metrics.is_none());

        let options = ProcessorOptions { collect_metrics: true, ..uncached() };
        let measured = processor.process("every other week", &ctx, &options).unwrap();
        let metrics = measured.metrics.unwrap();
        assert_eq!(metrics.handlers_run, 5);
        assert_eq!(metrics.handlers_matched, 1);
        assert!(!metrics.fast_path);
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let processor = PatternProcessor::without_cache();
        let options = ProcessorOptions {
            defaults: RecurrenceDefaults {
                interval: Some(4),
                by_month: Some(BTreeSet::from([1, 7])),
                ..RecurrenceDefaults::default()
            },
            ..uncached()
        };
        let result = processor.process("every monday", &Context::default(), &options).unwrap();
        assert_eq!(result.interval, 4);
        assert_eq!(result.by_month, Some(BTreeSet::from([1, 7])));

        let explicit = processor.process("every 2 weeks", &Context::default(), &options).unwrap();
        assert_eq!(explicit.interval, 2);
    }

    #[test]
    fn confidence_is_the_maximum_observed() {
        let processor = PatternProcessor::without_cache();
        let result = processor.process("every 2 weeks on monday", &Context::default(), &uncached()).unwrap();
        assert!(result.confidence >= 0.9 && result.confidence <= 1.0);
    }
}
