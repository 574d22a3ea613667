//! Error taxonomy for the relaxation engine.
//!
//! Every command validates its inputs before touching state, so an `Err`
//! always means the network is exactly as it was before the call.

use core::fmt;

/// Which coordinate of a unit failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Row index, valid in `0..N`.
    Row,
    /// Column index, valid in `0..N`.
    Column,
    /// Candidate value, valid in `1..=N`.
    Value,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Row => "row",
            Axis::Column => "column",
            Axis::Value => "value",
        })
    }
}

/// Errors raised by [`RelaxationNetwork`](crate::network::RelaxationNetwork) commands.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettleError {
    /// Grid size is zero or too large to allocate an `N × N × N` tensor.
    #[error("invalid grid size {size}: must be in 1..={max}")]
    InvalidSize {
        /// The rejected size.
        size: usize,
        /// Largest accepted size.
        max: usize,
    },
    /// A row, column or value lies outside the current grid's bounds.
    #[error("{axis} {value} is out of range {min}..={max}")]
    OutOfRange {
        /// Which coordinate was rejected.
        axis: Axis,
        /// The rejected coordinate.
        value: usize,
        /// Smallest valid coordinate.
        min: usize,
        /// Largest valid coordinate.
        max: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, SettleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_invalid_size_message() {
        let e = SettleError::InvalidSize { size: 0, max: 256 };
        assert_eq!(e.to_string(), "invalid grid size 0: must be in 1..=256");
    }

    #[test]
    fn test_out_of_range_message_names_axis() {
        let e = SettleError::OutOfRange { axis: Axis::Value, value: 5, min: 1, max: 4 };
        assert_eq!(e.to_string(), "value 5 is out of range 1..=4");

        let e = SettleError::OutOfRange { axis: Axis::Column, value: 4, min: 0, max: 3 };
        assert_eq!(e.to_string(), "column 4 is out of range 0..=3");
    }
}
