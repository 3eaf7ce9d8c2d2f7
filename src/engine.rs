//! Handler engine.
//!
//! The public entry point for turning normalized text into a
//! [`RecurrenceOptions`](crate::RecurrenceOptions). It is split into focused
//! submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! rules::get()  ──┐
//!                 │  create_handler              (handler.rs)
//!                 └──────────┬──────────
//!                            │ sorted by priority
//! input ── cache lookup ─────┼──────────────── (cache.rs)
//!                            │ miss
//!                            v
//!               PatternProcessor::run            (processor.rs)
//!                 - fast path for single adverbs
//!                 - normalize, build TaggedDocument
//!                 - fold every handler over the accumulator
//!                 - apply caller defaults
//!                            │
//!                            v
//!                RunResult (result + trace)      (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `handler.rs`: the handler type and its factory; one handler per category.
//! - `processor.rs`: the orchestrator, including handler selection.
//! - `cache.rs`: the bounded FIFO result cache.
//! - `metrics.rs`: per-run trace and timings.
//!
//! ## Adding a category
//!
//! - Add a module under `src/rules/` exposing `handler()` built with
//!   `handler!`, and register it in `rules::get`.
//! - Add a [`MatchValue`](crate::MatchValue) variant if the category needs a
//!   new payload shape.
//!
//! ## Debugging
//!
//! Every step logs through `tracing`; run with `RUST_LOG=recurrent=debug`
//! (or `trace` for per-matcher misses and cache evictions).

#[path = "engine/cache.rs"]
mod cache;
#[path = "engine/handler.rs"]
mod handler;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/processor.rs"]
mod processor;

pub use cache::ResultCache;
pub(crate) use handler::{Handler, HandlerMeta, create_handler};
pub use processor::PatternProcessor;

use crate::ProcessDetails;
use metrics::RunResult;

/// Package a run for [`process_verbose_with`](crate::process_verbose_with).
pub(crate) fn details_from_run(pattern: &str, run: RunResult) -> ProcessDetails {
    ProcessDetails {
        input: pattern.to_string(),
        normalized: run.normalized,
        handlers: run.handlers,
        result: run.result,
        metrics: run.metrics,
    }
}
