use thiserror::Error;

use crate::mtree::MIN_FAN_OUT;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MTreeError {
    /// The fan-out cannot partition anything.
    #[error("fan-out must be at least {min}, got {0}", min = MIN_FAN_OUT)]
    InvalidFanOut(usize),

    /// Keys handed to a build were not strictly ascending. `position` is the
    /// index of the first key that is not greater than its predecessor.
    #[error("keys must be strictly ascending, first violation at position {position}")]
    UnsortedInput { position: usize },

    #[error("value not found")]
    KeyNotFound,
}
