pub mod helpers;

mod end_date;
mod frequency;
mod interval;
mod month_day;
mod weekday;

#[cfg(test)]
mod tests;

use crate::engine::Handler;

/// Every category handler, in the order they run.
pub(crate) fn get() -> Vec<Handler> {
    let mut handlers =
        vec![frequency::handler(), interval::handler(), weekday::handler(), month_day::handler(), end_date::handler()];
    handlers.sort_by_key(|h| h.meta.priority);
    handlers
}
