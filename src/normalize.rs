//! Text normalization.
//!
//! Turns raw user input into the canonical string the matchers expect. The
//! steps run in a fixed order; each one relies on what the previous ones left
//! behind:
//!
//! ```text
//! (1) misspelling correction   "wendesday" -> "wednesday"   (case preserved)
//! (2) whitespace/punctuation   "  daily. "  -> "daily"
//! (3) ordinal suffixes         "15th"       -> "15"
//! (4) plural weekdays          "mondays"    -> "every monday"
//! (5) synonyms                 "fortnightly" -> "every 2 weeks"
//! (6) case folding
//! ```
//!
//! Normalization is total: unknown tokens pass through untouched.
//! `normalize(normalize(s)) == normalize(s)` holds for the default options.

use crate::lexicon::{ALTERNATE_FORMS, CANONICAL_SORTED, CANONICAL_WORDS, PLURAL_WEEKDAYS, RECURRENCE_MARKERS, SYNONYMS};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Shortest token the fuzzy corrector will touch. Shorter words have too
/// little signal ("on", "the", "day").
const MIN_FUZZY_LEN: usize = 4;

/// Which normalization steps run, and with what parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerOptions {
    pub lowercase: bool,
    pub collapse_whitespace: bool,
    /// Keep "15th" as-is instead of stripping to "15".
    pub preserve_ordinal_suffixes: bool,
    pub expand_plural_weekdays: bool,
    /// How many preceding tokens to search for "every"/"each" before
    /// expanding a plural weekday.
    pub plural_lookback: usize,
    pub substitute_synonyms: bool,
    pub correct_misspellings: bool,
    /// Minimum normalized edit-distance similarity in [0, 1] for a fuzzy
    /// correction to be accepted.
    pub similarity_threshold: f64,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        NormalizerOptions {
            lowercase: true,
            collapse_whitespace: true,
            preserve_ordinal_suffixes: false,
            expand_plural_weekdays: true,
            plural_lookback: 2,
            substitute_synonyms: true,
            correct_misspellings: true,
            similarity_threshold: 0.85,
        }
    }
}

static SYNONYM_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let mut entries: Vec<(&str, &str)> = SYNONYMS.to_vec();
    // Longest phrase first so "every fortnight" wins over any shorter key
    // it contains.
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    entries
        .into_iter()
        .map(|(from, to)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(from))).unwrap();
            (re, to)
        })
        .collect()
});

/// Normalize `input` according to `options`.
pub fn normalize(input: &str, options: &NormalizerOptions) -> String {
    let mut text = if options.correct_misspellings {
        correct_misspellings(input, options.similarity_threshold.clamp(0.0, 1.0))
    } else {
        input.to_string()
    };

    text = canonicalize_whitespace(&text, options.collapse_whitespace);

    if !options.preserve_ordinal_suffixes {
        text = strip_ordinal_suffixes(&text);
    }

    if options.expand_plural_weekdays {
        text = expand_plural_weekdays(&text, options.plural_lookback);
    }

    if options.substitute_synonyms {
        text = substitute_synonyms(&text);
    }

    if options.lowercase {
        text = text.to_lowercase();
    }

    trace!(input, normalized = %text, "normalized");
    text
}

fn correct_misspellings(input: &str, threshold: f64) -> String {
    // Bare "mo" is Monday's code; only a count makes it a month.
    let input = regex!(r"(?i)\b(\d+)\s+mo\b").replace_all(input, "$1 month");
    regex!(r"[A-Za-z]+")
        .replace_all(&input, |caps: &Captures| {
            let word = &caps[0];
            match correction_for(word, threshold) {
                Some(fixed) => {
                    let fixed = match_case(word, fixed);
                    debug!(from = word, to = %fixed, "corrected spelling");
                    fixed
                }
                None => word.to_string(),
            }
        })
        .into_owned()
}

fn correction_for(word: &str, threshold: f64) -> Option<&'static str> {
    let lower = word.to_ascii_lowercase();
    if CANONICAL_WORDS.contains(lower.as_str()) {
        return None;
    }
    if let Some(fixed) = ALTERNATE_FORMS.get(lower.as_str()) {
        return Some(*fixed);
    }
    if lower.len() < MIN_FUZZY_LEN {
        return None;
    }

    let mut best: Option<(&'static str, f64)> = None;
    for candidate in CANONICAL_SORTED.iter() {
        let score = strsim::normalized_levenshtein(&lower, candidate);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((*candidate, score));
        }
    }

    best.filter(|(_, score)| *score >= threshold).map(|(word, _)| word)
}

/// Carry the casing of `original` over onto `replacement`.
fn match_case(original: &str, replacement: &str) -> String {
    let mut letters = original.chars().filter(|c| c.is_alphabetic());
    let first_upper = letters.next().is_some_and(char::is_uppercase);
    let rest_upper = original.chars().filter(|c| c.is_alphabetic()).skip(1).all(char::is_uppercase);

    if first_upper && rest_upper && original.chars().count() > 1 {
        replacement.to_uppercase()
    } else if first_upper {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

fn canonicalize_whitespace(input: &str, collapse: bool) -> String {
    let text = if collapse { regex!(r"\s+").replace_all(input, " ").into_owned() } else { input.to_string() };
    strip_terminal_punctuation(text.trim()).to_string()
}

fn strip_terminal_punctuation(mut text: &str) -> &str {
    loop {
        let trimmed = text.trim_end();
        let Some(last) = trimmed.chars().last() else {
            return trimmed;
        };
        if !matches!(last, '.' | ',' | ';' | ':' | '!' | '?') {
            return trimmed;
        }
        // "until 31.12." keeps its dot: it belongs to the date.
        if last == '.' && regex!(r"\b\d{1,2}\.\d{1,2}\.$").is_match(trimmed) {
            return trimmed;
        }
        text = &trimmed[..trimmed.len() - last.len_utf8()];
    }
}

fn strip_ordinal_suffixes(input: &str) -> String {
    regex!(r"(?i)\b(\d+)(?:st|nd|rd|th)\b").replace_all(input, "$1").into_owned()
}

/// "mondays" -> "every monday", unless "every"/"each" is already within
/// `lookback` tokens, in which case the token is only depluralized.
fn expand_plural_weekdays(input: &str, lookback: usize) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut recent: VecDeque<String> = VecDeque::with_capacity(lookback + 1);
    let mut last_end = 0;

    for token in regex!(r"\S+").find_iter(input) {
        out.push_str(&input[last_end..token.start()]);
        last_end = token.end();

        let raw = token.as_str();
        let core_start = raw.find(|c: char| c.is_alphabetic()).unwrap_or(raw.len());
        let core_end = raw.rfind(|c: char| c.is_alphabetic()).map(|i| i + 1).unwrap_or(core_start);
        let core = &raw[core_start..core_end.max(core_start)];
        let lower = core.to_lowercase();

        match PLURAL_WEEKDAYS.iter().find(|(plural, _)| *plural == lower) {
            Some(_) => {
                let singular = &core[..core.len() - 1];
                let marked = recent.iter().any(|w| RECURRENCE_MARKERS.contains(&w.as_str()));
                out.push_str(&raw[..core_start]);
                if !marked {
                    out.push_str("every ");
                }
                out.push_str(singular);
                out.push_str(&raw[core_end.max(core_start)..]);
                debug!(token = raw, expanded = !marked, "plural weekday");
            }
            None => out.push_str(raw),
        }

        if lookback > 0 {
            if recent.len() == lookback {
                recent.pop_front();
            }
            recent.push_back(lower);
        }
    }
    out.push_str(&input[last_end..]);
    out
}

/// Repeats full passes until nothing changes: a late short key ("each")
/// can complete a longer one ("every single day") that was already tried.
/// Capped at one pass per synonym.
fn substitute_synonyms(input: &str) -> String {
    let mut text = input.to_string();
    for _ in 0..=SYNONYM_PATTERNS.len() {
        let mut changed = false;
        for (pattern, replacement) in SYNONYM_PATTERNS.iter() {
            if pattern.is_match(&text) {
                debug!(pattern = pattern.as_str(), replacement, "synonym");
                text = pattern.replace_all(&text, *replacement).into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    text
}
