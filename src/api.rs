use crate::engine::{self, PatternProcessor};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

static DEFAULT_PROCESSOR: Lazy<PatternProcessor> = Lazy::new(PatternProcessor::new);

/// Processing context.
///
/// Holds what is needed to resolve relative or year-less end dates
/// ("until friday", "until march 3").
#[derive(Debug, Clone)]
pub struct Context {
    /// Reference datetime used to resolve relative expressions.
    pub reference_time: NaiveDateTime,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            let date = NaiveDate::from_ymd_opt(2013, 2, 12).unwrap();
            let time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
            Self { reference_time: NaiveDateTime::new(date, time) }
        } else {
            Self { reference_time: Local::now().naive_local() }
        }
    }
}

/// Base repeating unit of a recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The RRULE `FREQ` value.
    pub fn as_rrule(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Weekday codes as used by RRULE `BYDAY`. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Weekday {
    /// Monday through Friday.
    pub const WORKWEEK: [Weekday; 5] = [Weekday::Mo, Weekday::Tu, Weekday::We, Weekday::Th, Weekday::Fr];
    /// Saturday and Sunday.
    pub const WEEKEND: [Weekday; 2] = [Weekday::Sa, Weekday::Su];

    pub fn code(self) -> &'static str {
        match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mo => chrono::Weekday::Mon,
            Weekday::Tu => chrono::Weekday::Tue,
            Weekday::We => chrono::Weekday::Wed,
            Weekday::Th => chrono::Weekday::Thu,
            Weekday::Fr => chrono::Weekday::Fri,
            Weekday::Sa => chrono::Weekday::Sat,
            Weekday::Su => chrono::Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Timing and counts for one call, attached when
/// [`ProcessorOptions::collect_metrics`] is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub total: Duration,
    pub normalize: Duration,
    pub handlers_run: usize,
    pub handlers_matched: usize,
    pub fast_path: bool,
    pub cache_hit: bool,
}

/// The structured recurrence: accumulator during a run, and the final output.
///
/// Field shapes follow the RRULE model. `interval` is never 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceOptions {
    pub frequency: Option<Frequency>,
    pub interval: u32,
    pub by_weekday: Option<BTreeSet<Weekday>>,
    /// Days of the month in 1..=31, or negative positions counted from the end.
    pub by_month_day: Option<BTreeSet<i32>>,
    pub by_month: Option<BTreeSet<u32>>,
    /// Ordinal qualifier for "first/last <weekday> of the month".
    pub by_set_pos: Option<BTreeSet<i32>>,
    /// Inclusive end bound, always at the end of the day.
    pub until: Option<NaiveDateTime>,
    pub confidence: f64,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ProcessMetrics>,
}

impl Default for RecurrenceOptions {
    fn default() -> Self {
        RecurrenceOptions {
            frequency: None,
            interval: 1,
            by_weekday: None,
            by_month_day: None,
            by_month: None,
            by_set_pos: None,
            until: None,
            confidence: 0.0,
            warnings: Vec::new(),
            metrics: None,
        }
    }
}

impl RecurrenceOptions {
    /// Render as an RRULE value string, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO`.
    ///
    /// Returns `None` when no frequency has been established.
    pub fn to_rrule(&self) -> Option<String> {
        let frequency = self.frequency?;
        let mut parts = vec![format!("FREQ={}", frequency.as_rrule())];

        if self.interval > 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if let Some(days) = &self.by_weekday {
            parts.push(format!("BYDAY={}", join(days.iter().map(|d| d.code().to_string()))));
        }
        if let Some(days) = &self.by_month_day {
            parts.push(format!("BYMONTHDAY={}", join(days.iter().map(i32::to_string))));
        }
        if let Some(months) = &self.by_month {
            parts.push(format!("BYMONTH={}", join(months.iter().map(u32::to_string))));
        }
        if let Some(positions) = &self.by_set_pos {
            parts.push(format!("BYSETPOS={}", join(positions.iter().map(i32::to_string))));
        }
        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y%m%dT%H%M%S")));
        }

        Some(parts.join(";"))
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// Values to fill into any field a run left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceDefaults {
    pub frequency: Option<Frequency>,
    /// Applied only when no interval pattern matched. Ignored if 0.
    pub interval: Option<u32>,
    pub by_weekday: Option<BTreeSet<Weekday>>,
    pub by_month_day: Option<BTreeSet<i32>>,
    pub by_month: Option<BTreeSet<u32>>,
    pub until: Option<NaiveDateTime>,
}

impl RecurrenceDefaults {
    pub(crate) fn apply(&self, mut options: RecurrenceOptions, interval_matched: bool) -> RecurrenceOptions {
        if options.frequency.is_none() {
            options.frequency = self.frequency;
        }
        if !interval_matched {
            if let Some(interval) = self.interval.filter(|i| *i >= 1) {
                options.interval = interval;
            }
        }
        if options.by_weekday.is_none() {
            options.by_weekday = self.by_weekday.clone();
        }
        if options.by_month_day.is_none() {
            options.by_month_day = self.by_month_day.clone();
        }
        if options.by_month.is_none() {
            options.by_month = self.by_month.clone();
        }
        if options.until.is_none() {
            options.until = self.until;
        }
        options
    }
}

/// Options accepted by [`process_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    /// Read and write the result cache.
    pub use_cache: bool,
    /// Only run the named handlers (`frequency`, `interval`, `weekday`,
    /// `month_day`, `end_date`). Unknown names produce a warning.
    pub force_handlers: Option<BTreeSet<String>>,
    pub defaults: RecurrenceDefaults,
    pub correct_misspellings: bool,
    /// Attach [`ProcessMetrics`] to the result.
    pub collect_metrics: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        ProcessorOptions {
            use_cache: true,
            force_handlers: None,
            defaults: RecurrenceDefaults::default(),
            correct_misspellings: true,
            collect_metrics: false,
        }
    }
}

/// One handler's outcome in a verbose run.
#[derive(Debug, Clone)]
pub struct HandlerTrace {
    pub name: String,
    pub description: String,
    pub matched: bool,
    pub matched_text: Option<String>,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

/// Result from [`process_verbose_with`].
#[derive(Debug, Clone)]
pub struct ProcessDetails {
    pub input: String,
    /// Normalized text, `None` when the fast path or the cache answered.
    pub normalized: Option<String>,
    pub handlers: Vec<HandlerTrace>,
    pub result: Option<RecurrenceOptions>,
    pub metrics: ProcessMetrics,
}

/// Process `pattern` with the shared default processor, a default
/// [`Context`] and default [`ProcessorOptions`].
///
/// # Example
/// ```
/// use recurrent::{Frequency, process};
///
/// let rule = process("every 2 weeks").unwrap();
/// assert_eq!(rule.frequency, Some(Frequency::Weekly));
/// assert_eq!(rule.interval, 2);
/// ```
pub fn process(pattern: &str) -> Option<RecurrenceOptions> {
    process_with(pattern, &Context::default(), &ProcessorOptions::default())
}

/// Process `pattern` with the shared default processor.
///
/// Returns `None` when no pattern category was recognised.
pub fn process_with(pattern: &str, context: &Context, options: &ProcessorOptions) -> Option<RecurrenceOptions> {
    DEFAULT_PROCESSOR.process(pattern, context, options)
}

/// Like [`process_with`], returning the per-handler trace as well.
pub fn process_verbose_with(pattern: &str, context: &Context, options: &ProcessorOptions) -> ProcessDetails {
    let run = DEFAULT_PROCESSOR.run(pattern, context, options);
    engine::details_from_run(pattern, run)
}
