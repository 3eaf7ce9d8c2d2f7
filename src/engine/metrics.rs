//! Run bookkeeping.
//!
//! Every run records a per-handler trace and timings. They are cheap (one
//! entry per registered handler) so they are always collected; whether they
//! reach the caller is decided by `collect_metrics` or by asking for a
//! verbose run.

use crate::{HandlerTrace, ProcessMetrics, RecurrenceOptions};

/// Orchestrator output bundled with its trace.
#[derive(Debug, Clone)]
pub(crate) struct RunResult {
    pub result: Option<RecurrenceOptions>,
    /// Normalized text, when normalization ran.
    pub normalized: Option<String>,
    pub handlers: Vec<HandlerTrace>,
    pub metrics: ProcessMetrics,
}

impl RunResult {
    pub(crate) fn shortcut(result: Option<RecurrenceOptions>, metrics: ProcessMetrics) -> Self {
        RunResult { result, normalized: None, handlers: Vec::new(), metrics }
    }
}
