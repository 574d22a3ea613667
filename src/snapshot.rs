//! Read-only view of a network handed to the presentation layer.
//!
//! # Wire shape
//!
//! With the `serde` feature enabled a [`Snapshot`] serialises as:
//!
//! ```text
//! {
//!   "grid_size":     4,
//!   "iteration":     12,
//!   "is_converged":  false,
//!   "max_change":    0.0173,          // omitted before the first sweep
//!   "probabilities": { "0,0": [1.0, 0.0, 0.0, 0.0], "0,1": [...], ... },
//!   "clamped":       [[0, 0], [0, 1]],
//!   "grid":          [[1, 2, 3, 4], ...]
//! }
//! ```
//!
//! Front ends key cells by the `"row,col"` string, so that format is part of
//! the contract and must not change.
//!
//! A snapshot is a plain value: it holds no reference to the network and
//! stays valid after further commands.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Build the `"row,col"` key used for [`Snapshot::probabilities`].
pub fn cell_key(row: usize, col: usize) -> String {
    format!("{row},{col}")
}

/// Full engine state at one instant.
///
/// # Example
///
/// ```rust
/// use settle_core::network::RelaxationNetwork;
///
/// let mut net = RelaxationNetwork::new(4).unwrap();
/// net.set_clue(0, 0, 1).unwrap();
/// let snap = net.snapshot();
/// assert_eq!(snap.clamped, vec![[0, 0]]);
/// assert_eq!(snap.cell(0, 0), Some(&[1.0, 0.0, 0.0, 0.0][..]));
/// assert!(snap.max_change.is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Side length `N` of the grid.
    pub grid_size: usize,
    /// Number of sweeps since creation or the last reset.
    pub iteration: u64,
    /// Whether the most recent sweep moved no unit by more than the threshold.
    pub is_converged: bool,
    /// Largest per-unit change in the most recent sweep; `None` before the first.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub max_change: Option<f64>,
    /// Per-cell distributions keyed `"row,col"`, each with `N` entries.
    pub probabilities: BTreeMap<String, Vec<f64>>,
    /// `[row, col]` of every clamped cell, in row-major order.
    pub clamped: Vec<[usize; 2]>,
    /// `grid[row][col]`: the clamped value for clue cells, otherwise the
    /// currently most likely value (1-indexed, not authoritative).
    pub grid: Vec<Vec<usize>>,
}

impl Snapshot {
    /// Distribution of one cell, or `None` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<&[f64]> {
        self.probabilities
            .get(&cell_key(row, col))
            .map(|v| v.as_slice())
    }

    /// Whether `(row, col)` is listed as clamped.
    pub fn is_clamped(&self, row: usize, col: usize) -> bool {
        self.clamped.contains(&[row, col])
    }

    /// Number of cells in the snapshot.
    pub fn cell_count(&self) -> usize {
        self.probabilities.len()
    }
}
