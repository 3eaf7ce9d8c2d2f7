//! Error types surfaced as warnings.
//!
//! Nothing here reaches the caller as an `Err`: the handler that receives a
//! `MatchError` records its `Display` text in the result's warning list and
//! processing carries on with the next category.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum MatchError {
    #[error("could not resolve end date \"{expression}\"; ignoring end bound")]
    UnresolvedDate { expression: String },

    #[error("end date \"{expression}\" is not a valid calendar date; ignoring end bound")]
    InvalidDate { expression: String },
}
