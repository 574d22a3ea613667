/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The probability tensor: one distribution over `1..=N` per cell.
//!
//! # Invariants
//!
//! - **GRID-001**: every cell holds exactly `N` non-negative entries.
//! - **GRID-002**: every cell's entries sum to 1.0 within floating-point tolerance.
//! - **GRID-003**: values are 1-indexed at the API surface; entry `v - 1` holds value `v`.

use alloc::vec;
use alloc::vec::Vec;

/// Sums at or below this are treated as zero mass during normalisation.
pub const ZERO_MASS: f64 = 1e-12;

// ─── Cell ───────────────────────────────────────────────────────────────────

/// A grid coordinate. Rows and columns are 0-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Row index in `0..N`.
    pub row: usize,
    /// Column index in `0..N`.
    pub col: usize,
}

impl Cell {
    /// Construct a cell coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

// ─── ProbabilityGrid ────────────────────────────────────────────────────────

/// Flat `N × N × N` tensor of unit probabilities, row-major per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityGrid {
    size: usize,
    data: Vec<f64>,
}

impl ProbabilityGrid {
    /// Allocate a grid with every cell uniform at `1 / size`.
    ///
    /// Callers validate `size`; a zero size yields an empty grid.
    pub fn uniform(size: usize) -> Self {
        let p = if size == 0 { 0.0 } else { 1.0 / size as f64 };
        Self {
            size,
            data: vec![p; size * size * size],
        }
    }

    /// Side length `N`.
    pub fn size(&self) -> usize {
        self.size
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        (row * self.size + col) * self.size
    }

    /// Distribution of one cell. Panics if the coordinate is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &[f64] {
        let o = self.offset(row, col);
        &self.data[o..o + self.size]
    }

    /// Mutable distribution of one cell. Panics if the coordinate is outside the grid.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut [f64] {
        let o = self.offset(row, col);
        let n = self.size;
        &mut self.data[o..o + n]
    }

    /// Probability that `(row, col)` holds 1-indexed `value`.
    pub fn unit(&self, row: usize, col: usize, value: usize) -> f64 {
        self.data[self.offset(row, col) + value - 1]
    }

    /// Reset one cell to `1 / N` everywhere.
    pub fn set_uniform(&mut self, cell: Cell) {
        let p = 1.0 / self.size as f64;
        self.cell_mut(cell.row, cell.col).fill(p);
    }

    /// Overwrite one cell with a one-hot vector at 1-indexed `value`.
    pub fn set_one_hot(&mut self, cell: Cell, value: usize) {
        let probs = self.cell_mut(cell.row, cell.col);
        probs.fill(0.0);
        probs[value - 1] = 1.0;
    }

    /// Most likely 1-indexed value of a cell and its probability.
    ///
    /// Ties resolve to the lowest value.
    pub fn dominant(&self, row: usize, col: usize) -> (usize, f64) {
        let probs = self.cell(row, col);
        let mut best = 0;
        for (i, &p) in probs.iter().enumerate() {
            if p > probs[best] {
                best = i;
            }
        }
        (best + 1, probs[best])
    }
}

// ─── Free helpers ───────────────────────────────────────────────────────────

/// Scale `probs` in place to sum to 1.0.
///
/// Falls back to a uniform distribution when the total mass is at or below
/// [`ZERO_MASS`], or when it is not a number.
pub fn normalize(probs: &mut [f64]) {
    if probs.is_empty() {
        return;
    }
    let total: f64 = probs.iter().sum();
    if total > ZERO_MASS {
        for p in probs.iter_mut() {
            *p /= total;
        }
    } else {
        let u = 1.0 / probs.len() as f64;
        probs.fill(u);
    }
}

/// Largest absolute entry-wise difference between two distributions.
pub fn max_abs_change(old: &[f64], new: &[f64]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(&a, &b)| if a > b { a - b } else { b - a })
        .fold(0.0, f64::max)
}
