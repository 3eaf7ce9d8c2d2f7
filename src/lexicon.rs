//! Static vocabulary tables.
//!
//! Pure data: alternate spellings, canonical words for fuzzy correction,
//! weekday/month lookups and phrase-level synonyms. The normalizer and the
//! matchers both read from here so the two never disagree on a spelling.

use crate::Weekday;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub(crate) static DAY_OF_WEEK: Lazy<HashMap<&'static str, Weekday>> = Lazy::new(|| {
    HashMap::from([
        ("monday", Weekday::Mo),
        ("mon", Weekday::Mo),
        ("tuesday", Weekday::Tu),
        ("tue", Weekday::Tu),
        ("tues", Weekday::Tu),
        ("wednesday", Weekday::We),
        ("wed", Weekday::We),
        ("weds", Weekday::We),
        ("thursday", Weekday::Th),
        ("thu", Weekday::Th),
        ("thur", Weekday::Th),
        ("thurs", Weekday::Th),
        ("friday", Weekday::Fr),
        ("fri", Weekday::Fr),
        ("saturday", Weekday::Sa),
        ("sat", Weekday::Sa),
        ("sunday", Weekday::Su),
        ("sun", Weekday::Su),
    ])
});

pub(crate) static MONTH_NAME: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("january", 1),
        ("jan", 1),
        ("february", 2),
        ("feb", 2),
        ("march", 3),
        ("mar", 3),
        ("april", 4),
        ("apr", 4),
        ("may", 5),
        ("june", 6),
        ("jun", 6),
        ("july", 7),
        ("jul", 7),
        ("august", 8),
        ("aug", 8),
        ("september", 9),
        ("sept", 9),
        ("sep", 9),
        ("october", 10),
        ("oct", 10),
        ("november", 11),
        ("nov", 11),
        ("december", 12),
        ("dec", 12),
    ])
});

/// Known alternate forms, looked up exactly before any fuzzy matching.
///
/// Abbreviations are expanded here too so downstream patterns only have to
/// deal with full names.
pub(crate) static ALTERNATE_FORMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // weekdays
        ("mon", "monday"),
        ("mondy", "monday"),
        ("munday", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("tuseday", "tuesday"),
        ("teusday", "tuesday"),
        ("tusday", "tuesday"),
        ("wed", "wednesday"),
        ("weds", "wednesday"),
        ("wensday", "wednesday"),
        ("wednsday", "wednesday"),
        ("wendsday", "wednesday"),
        ("wendesday", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("thurday", "thursday"),
        ("thrusday", "thursday"),
        ("fri", "friday"),
        ("firday", "friday"),
        ("fridy", "friday"),
        ("sat", "saturday"),
        ("saterday", "saturday"),
        ("satuday", "saturday"),
        ("sun", "sunday"),
        ("sundy", "sunday"),
        ("sonday", "sunday"),
        // months
        ("jan", "january"),
        ("januray", "january"),
        ("feb", "february"),
        ("febuary", "february"),
        ("feburary", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("agust", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("septmber", "september"),
        ("oct", "october"),
        ("octber", "october"),
        ("nov", "november"),
        ("novmber", "november"),
        ("dec", "december"),
        ("decmber", "december"),
        // frequency / interval vocabulary
        ("dayly", "daily"),
        ("dialy", "daily"),
        ("wkly", "weekly"),
        ("wekly", "weekly"),
        ("weekley", "weekly"),
        ("montly", "monthly"),
        ("monthy", "monthly"),
        ("yearley", "yearly"),
        ("yeraly", "yearly"),
        ("anually", "annually"),
        ("annualy", "annually"),
        ("evry", "every"),
        ("evey", "every"),
        ("everey", "every"),
        ("wk", "week"),
        ("wks", "weeks"),
        ("mos", "months"),
        ("yr", "year"),
        ("yrs", "years"),
        ("untill", "until"),
        ("til", "until"),
        ("till", "until"),
        ("thru", "through"),
    ])
});

/// Canonical words the fuzzy corrector may snap a token onto.
pub(crate) static CANONICAL_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
        "mondays",
        "tuesdays",
        "wednesdays",
        "thursdays",
        "fridays",
        "saturdays",
        "sundays",
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
        "daily",
        "weekly",
        "monthly",
        "yearly",
        "annually",
        "fortnightly",
        "biweekly",
        "bimonthly",
        "quarterly",
        "every",
        "each",
        "other",
        "day",
        "days",
        "week",
        "weeks",
        "month",
        "months",
        "year",
        "years",
        "weekday",
        "weekdays",
        "weekend",
        "weekends",
        "until",
        "through",
        "ending",
        "first",
        "second",
        "third",
        "fourth",
        "fifth",
        "last",
    ])
});

/// Canonical words sorted, so ties in similarity resolve the same way on
/// every run.
pub(crate) static CANONICAL_SORTED: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut words: Vec<&'static str> = CANONICAL_WORDS.iter().copied().collect();
    words.sort_unstable();
    words
});

/// Phrase-level synonyms. Replacements must not themselves contain a key.
/// Keys formed by neighbouring substitutions are picked up on the next pass.
pub(crate) const SYNONYMS: &[(&str, &str)] = &[
    ("every fortnight", "every 2 weeks"),
    ("fortnightly", "every 2 weeks"),
    ("bi-weekly", "every 2 weeks"),
    ("biweekly", "every 2 weeks"),
    ("bi-monthly", "every 2 months"),
    ("bimonthly", "every 2 months"),
    ("quarterly", "every 3 months"),
    ("semi-annually", "every 6 months"),
    ("semiannually", "every 6 months"),
    ("every single day", "every day"),
    ("everyday", "every day"),
    ("each", "every"),
    ("business days", "every weekday"),
    ("business day", "weekday"),
    ("working days", "every weekday"),
    ("working day", "weekday"),
    ("work days", "every weekday"),
    ("workdays", "every weekday"),
    ("workday", "weekday"),
];

pub(crate) const PLURAL_WEEKDAYS: &[(&str, &str)] = &[
    ("mondays", "monday"),
    ("tuesdays", "tuesday"),
    ("wednesdays", "wednesday"),
    ("thursdays", "thursday"),
    ("fridays", "friday"),
    ("saturdays", "saturday"),
    ("sundays", "sunday"),
    ("weekdays", "weekday"),
    ("weekends", "weekend"),
];

/// Words that already mark a recurrence, so a following plural day name is
/// only depluralized.
pub(crate) const RECURRENCE_MARKERS: &[&str] = &["every", "each"];

pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    DAY_OF_WEEK.get(name.to_ascii_lowercase().as_str()).copied()
}

pub(crate) fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAME.get(name.to_ascii_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternate_forms_point_at_canonical_words() {
        for (alt, canonical) in ALTERNATE_FORMS.iter() {
            assert!(CANONICAL_WORDS.contains(canonical), "{alt} -> {canonical} is not canonical");
            assert!(!CANONICAL_WORDS.contains(alt), "{alt} is both alternate and canonical");
        }
    }

    #[test]
    fn synonym_replacements_contain_no_keys() {
        for (_, replacement) in SYNONYMS {
            for (key, _) in SYNONYMS {
                let padded = format!(" {replacement} ");
                assert!(!padded.contains(&format!(" {key} ")), "{replacement:?} contains {key:?}");
            }
        }
    }

    #[test]
    fn lookups_ignore_case() {
        assert_eq!(weekday_from_name("Wed"), Some(Weekday::We));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("smarch"), None);
    }
}
