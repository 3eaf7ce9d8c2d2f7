//! Parsing utilities for values captured by matcher regexes

use crate::Frequency;

/// Parse integer text like "3", "three", "twelve".
pub fn parse_integer_text(text: &str) -> Option<i64> {
    let normalized = text.trim().to_lowercase();
    if !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit()) {
        return normalized.parse().ok();
    }
    match normalized.as_str() {
        "zero" => Some(0),
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => None,
    }
}

/// Ordinal position within a month: "first".."fifth" and "1st".."5th" map to
/// 1..=5, "last" to -1.
pub fn ordinal_position(text: &str) -> Option<i32> {
    let text = text.trim().to_lowercase();
    let digits = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.parse().ok().filter(|n| (1..=5).contains(n));
    }
    match text.as_str() {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        "last" => Some(-1),
        _ => None,
    }
}

/// Map a unit word ("weeks", "monday", "weekend") onto the frequency it repeats at.
pub fn frequency_from_unit(unit: &str) -> Option<Frequency> {
    let unit = unit.trim().to_lowercase();
    let unit = unit.strip_suffix('s').unwrap_or(&unit);
    match unit {
        "day" => Some(Frequency::Daily),
        "week" | "weekend" | "weekday" => Some(Frequency::Weekly),
        "month" => Some(Frequency::Monthly),
        "year" => Some(Frequency::Yearly),
        _ if crate::lexicon::weekday_from_name(unit).is_some() => Some(Frequency::Weekly),
        _ => None,
    }
}

/// Map an adverb ("daily", "annually") onto its frequency.
pub fn frequency_from_adverb(word: &str) -> Option<Frequency> {
    match word.trim().to_lowercase().as_str() {
        "daily" => Some(Frequency::Daily),
        "weekly" => Some(Frequency::Weekly),
        "monthly" => Some(Frequency::Monthly),
        "yearly" | "annually" => Some(Frequency::Yearly),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_from_digits_and_words() {
        assert_eq!(parse_integer_text("3"), Some(3));
        assert_eq!(parse_integer_text("Twelve"), Some(12));
        assert_eq!(parse_integer_text("zero"), Some(0));
        assert_eq!(parse_integer_text("dozen"), None);
        assert_eq!(parse_integer_text(""), None);
    }

    #[test]
    fn ordinal_positions() {
        assert_eq!(ordinal_position("first"), Some(1));
        assert_eq!(ordinal_position("3rd"), Some(3));
        assert_eq!(ordinal_position("4"), Some(4));
        assert_eq!(ordinal_position("last"), Some(-1));
        assert_eq!(ordinal_position("6th"), None);
    }

    #[test]
    fn units_and_adverbs() {
        assert_eq!(frequency_from_unit("weeks"), Some(Frequency::Weekly));
        assert_eq!(frequency_from_unit("Monday"), Some(Frequency::Weekly));
        assert_eq!(frequency_from_unit("years"), Some(Frequency::Yearly));
        assert_eq!(frequency_from_unit("fortnight"), None);
        assert_eq!(frequency_from_adverb("annually"), Some(Frequency::Yearly));
    }
}
