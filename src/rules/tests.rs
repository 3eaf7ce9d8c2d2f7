use crate::{Context, Frequency, ProcessorOptions, RecurrenceOptions, Weekday, process_with};
use std::collections::BTreeSet;

fn run(input: &str) -> Option<RecurrenceOptions> {
    let opts = ProcessorOptions { use_cache: false, ..ProcessorOptions::default() };
    process_with(input, &Context::default(), &opts)
}

#[test]
fn recurrence_examples_matching() {
    // Array of (expected RRULE, input string); `None` means not understood.
    let cases: Vec<(Option<&str>, &str)> = vec![
        (Some("FREQ=DAILY"), "daily"),
        (Some("FREQ=DAILY"), "  Daily "),
        (Some("FREQ=YEARLY"), "annually"),
        (Some("FREQ=DAILY"), "every day"),
        (Some("FREQ=DAILY"), "everyday"),
        (Some("FREQ=DAILY"), "every single day"),
        (Some("FREQ=DAILY"), "each single day"),
        (Some("FREQ=WEEKLY"), "once a week"),
        (Some("FREQ=MONTHLY"), "per month"),
        (Some("FREQ=WEEKLY;INTERVAL=2"), "every 2 weeks"),
        (Some("FREQ=WEEKLY;INTERVAL=2"), "every other week"),
        (Some("FREQ=WEEKLY;INTERVAL=2"), "fortnightly"),
        (Some("FREQ=WEEKLY;INTERVAL=2"), "Bi-Weekly"),
        (Some("FREQ=DAILY;INTERVAL=3"), "every 3 days"),
        (Some("FREQ=DAILY;INTERVAL=3"), "every three days"),
        (Some("FREQ=MONTHLY;INTERVAL=3"), "quarterly"),
        (Some("FREQ=MONTHLY;INTERVAL=2"), "every second month"),
        (Some("FREQ=YEARLY;INTERVAL=2"), "every 2 years"),
        (Some("FREQ=MONTHLY;INTERVAL=2"), "every 2 mo"),
        (Some("FREQ=WEEKLY;BYDAY=MO"), "every monday"),
        (Some("FREQ=WEEKLY;BYDAY=MO"), "mondays"),
        (Some("FREQ=WEEKLY;BYDAY=MO"), "every mondays"),
        (Some("FREQ=WEEKLY;BYDAY=MO,WE"), "every monday and wednesday"),
        (Some("FREQ=WEEKLY;BYDAY=TU,TH"), "tues and thurs"),
        (Some("FREQ=WEEKLY;BYDAY=WE"), "every wendesday"),
        (Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "every weekday"),
        (Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "on business days"),
        (Some("FREQ=WEEKLY;BYDAY=SA,SU"), "on weekends"),
        (Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "monday through friday"),
        (Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "mondays through fridays"),
        (Some("FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"), "mon-fri"),
        (Some("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO"), "every 2 weeks on monday"),
        (Some("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO"), "Every Other Monday"),
        (Some("FREQ=WEEKLY;INTERVAL=2;BYDAY=TU"), "fortnightly on tuesdays"),
        (Some("FREQ=MONTHLY;BYMONTHDAY=15"), "monthly on the 15th"),
        (Some("FREQ=MONTHLY;BYMONTHDAY=15"), "every month on the 15th"),
        (Some("FREQ=MONTHLY;BYMONTHDAY=1,15"), "the 1st and 15th of every month"),
        (Some("FREQ=MONTHLY;BYMONTHDAY=-1"), "monthly on the last day"),
        (Some("FREQ=MONTHLY;BYDAY=MO;BYSETPOS=1"), "first monday of every month"),
        (Some("FREQ=MONTHLY;BYDAY=FR;BYSETPOS=-1"), "last friday of each month"),
        (Some("FREQ=MONTHLY;BYDAY=TU;BYSETPOS=2"), "monthly on the 2nd tuesday"),
        (Some("FREQ=YEARLY;BYMONTHDAY=5;BYMONTH=3"), "every march 5th"),
        (Some("FREQ=YEARLY;BYMONTHDAY=25;BYMONTH=12"), "annually on december 25"),
        (Some("FREQ=WEEKLY;BYDAY=MO;UNTIL=20231231T235959"), "every monday until december 31, 2023"),
        (Some("FREQ=DAILY;UNTIL=20240131T235959"), "daily until 2024-01-31"),
        (Some("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO;UNTIL=20130303T235959"), "every 2 weeks on monday until march 3"),
        (Some("FREQ=WEEKLY;BYDAY=FR;UNTIL=20131231T235959"), "fridays through the end of december"),
        (None, "not a pattern"),
        (None, ""),
        (None, "every 0 days"),
        (None, "every mo, we, fr"),
        (None, "on the 31 of february"),
    ];

    for (expected, input) in cases {
        let result = run(input);
        let rrule = result.as_ref().and_then(RecurrenceOptions::to_rrule);
        assert_eq!(rrule.as_deref(), expected, "unexpected result for input '{}' (result: {:#?})", input, result);
    }
}

#[test]
fn interval_is_always_positive() {
    let inputs = [
        "daily",
        "every 0 weeks on monday",
        "every 1 day",
        "every twelve months",
        "every other friday",
        "quarterly until june",
        "the 1st of every month",
    ];
    for input in inputs {
        if let Some(result) = run(input) {
            assert!(result.interval >= 1, "interval {} for '{}'", result.interval, input);
        }
    }
}

#[test]
fn processing_is_deterministic() {
    for input in ["every 2 weeks on monday", "last friday of each month", "every monday until someday maybe"] {
        let first = run(input);
        for _ in 0..3 {
            assert_eq!(run(input), first, "non-deterministic result for '{}'", input);
        }
    }
}

#[test]
fn interval_overrides_frequency_guess() {
    let result = run("every 2 weeks on monday").unwrap();
    assert_eq!(result.frequency, Some(Frequency::Weekly));
    assert_eq!(result.interval, 2);
    assert_eq!(result.by_weekday, Some(BTreeSet::from([Weekday::Mo])));

    // "daily" is seen first, but the explicit interval decides.
    let result = run("daily, every 3 weeks").unwrap();
    assert_eq!(result.frequency, Some(Frequency::Weekly));
    assert_eq!(result.interval, 3);
}

#[test]
fn weekdays_do_not_downgrade_monthly() {
    let result = run("monthly on mondays").unwrap();
    assert_eq!(result.frequency, Some(Frequency::Monthly));
    assert_eq!(result.by_weekday, Some(BTreeSet::from([Weekday::Mo])));
}

#[test]
fn unresolvable_end_date_degrades_to_warning() {
    let result = run("every monday until someday maybe").unwrap();
    assert_eq!(result.frequency, Some(Frequency::Weekly));
    assert!(result.until.is_none());
    assert!(!result.warnings.is_empty());
}

#[test]
fn equivalent_phrasings_agree() {
    let pairs = [
        ("each single day", "every single day"),
        ("each fortnight", "every fortnight"),
        ("mondays through fridays", "every weekday"),
    ];
    for (left, right) in pairs {
        let (a, b) = (run(left), run(right));
        assert!(a.is_some(), "'{}' not understood", left);
        assert_eq!(a.as_ref().and_then(RecurrenceOptions::to_rrule), b.as_ref().and_then(RecurrenceOptions::to_rrule));
    }
}

#[test]
fn weekday_range_keeps_a_real_end_date() {
    let result = run("monday through friday until june 30").unwrap();
    assert_eq!(result.by_weekday, Some(Weekday::WORKWEEK.into_iter().collect()));
    assert!(result.until.is_some());
}

#[test]
fn confidence_is_bounded() {
    for input in ["daily", "every monday", "every 2 weeks on monday until march 3", "in june"] {
        let result = run(input).unwrap();
        assert!((0.0..=1.0).contains(&result.confidence), "confidence {} for '{}'", result.confidence, input);
        assert!(result.confidence > 0.0);
    }
}

#[test]
fn shared_cache_is_transparent() {
    let ctx = Context::default();
    let cached = ProcessorOptions::default();
    let uncached = ProcessorOptions { use_cache: false, ..ProcessorOptions::default() };

    let first = process_with("every monday and wednesday", &ctx, &cached);
    let second = process_with("every monday and wednesday", &ctx, &cached);
    let fresh = process_with("every monday and wednesday", &ctx, &uncached);
    assert_eq!(first, second);
    assert_eq!(first, fresh);
}
