/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The relaxation network: probability grid, clamp set, and the sweep.
//!
//! # The update rule
//!
//! For every non-clamped unit `(row, col, value)` one sweep computes
//!
//! ```text
//! row_inh   = Σ p[row][c][value] over c ≠ col  / (N − 1)
//! col_inh   = Σ p[r][col][value] over r ≠ row  / (N − 1)
//! combined  = (row_inh + col_inh) / 2
//! p'        = p · max(0, 1 − strength · combined)
//! ```
//!
//! and then renormalises the cell. Clamped cells are included in the sums at
//! their full one-hot weight. For `N = 1` both signals are zero.
//!
//! # Invariants
//!
//! - **NET-001**: every cell sums to 1.0 after every command.
//! - **NET-002**: a clamped cell is one-hot at its clue and no sweep writes to it.
//! - **NET-003**: a sweep reads only the tensor as it stood when the sweep
//!   began; new values are committed together at the end.
//! - **NET-004**: a command that returns `Err` leaves the network untouched.
//!
//! # Ownership
//!
//! A network is a plain owned value with no interior mutability. The caller
//! serialises access; timers and batch drivers just call [`RelaxationNetwork::step`]
//! repeatedly and stop calling it to cancel.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::config::RelaxationConfig;
use crate::error::{Axis, Result, SettleError};
use crate::grid::{max_abs_change, normalize, Cell, ProbabilityGrid};
use crate::snapshot::{cell_key, Snapshot};

/// Largest accepted grid side. The tensor holds `N³` entries.
pub const MAX_GRID_SIZE: usize = 256;

/// Outcome of one relaxation sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    /// Largest absolute change of any non-clamped unit during the sweep.
    pub max_change: f64,
    /// Whether `max_change` fell below the convergence threshold.
    pub converged: bool,
    /// Iteration counter after the sweep.
    pub iteration: u64,
}

/// Constraint-satisfaction network over an `N × N` Latin-square grid.
///
/// Each of the `N³` units `(row, col, value)` carries a probability. Units
/// competing for the same value in a row or column inhibit each other until
/// the grid settles.
#[derive(Clone, Debug)]
pub struct RelaxationNetwork {
    size: usize,
    config: RelaxationConfig,
    probs: ProbabilityGrid,
    /// Clamped cell → 1-indexed clue value.
    clamps: HashMap<Cell, usize>,
    iteration: u64,
    max_change: Option<f64>,
    converged: bool,
}

impl RelaxationNetwork {
    /// Create a network of side `size` with the default configuration.
    ///
    /// Every cell starts uniform at `1 / size`, nothing is clamped and the
    /// iteration counter is 0.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_config(size, RelaxationConfig::default())
    }

    /// Create a network of side `size` with a custom configuration.
    pub fn with_config(size: usize, config: RelaxationConfig) -> Result<Self> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(SettleError::InvalidSize { size, max: MAX_GRID_SIZE });
        }
        debug!(size, strength = config.inhibition_strength, "network created");
        Ok(Self {
            size,
            config,
            probs: ProbabilityGrid::uniform(size),
            clamps: HashMap::new(),
            iteration: 0,
            max_change: None,
            converged: false,
        })
    }

    // ── Commands ───────────────────────────────────────────────────────────

    /// Clamp `(row, col)` to `value`, overwriting its distribution with a
    /// one-hot vector.
    ///
    /// Conflicting clues (the same value twice in a row or column) are
    /// accepted; resolving them is what the sweep is for.
    pub fn set_clue(&mut self, row: usize, col: usize, value: usize) -> Result<()> {
        let cell = self.check_cell(row, col)?;
        self.check_value(value)?;
        self.probs.set_one_hot(cell, value);
        self.clamps.insert(cell, value);
        debug!(row, col, value, "clue set");
        Ok(())
    }

    /// Unclamp `(row, col)` and reset it to uniform.
    ///
    /// Removing a clue from a cell that has none is a no-op.
    pub fn remove_clue(&mut self, row: usize, col: usize) -> Result<()> {
        let cell = self.check_cell(row, col)?;
        if self.clamps.remove(&cell).is_some() {
            self.probs.set_uniform(cell);
            debug!(row, col, "clue removed");
        }
        Ok(())
    }

    /// Set the inhibition strength used by subsequent sweeps.
    ///
    /// Any value is stored; see [`RelaxationConfig::inhibition_strength`].
    pub fn set_inhibition(&mut self, strength: f64) {
        self.config.inhibition_strength = strength;
        debug!(strength, "inhibition strength set");
    }

    /// Discard all probabilities, clues and counters; keep size and config.
    pub fn reset(&mut self) {
        self.probs = ProbabilityGrid::uniform(self.size);
        self.clamps.clear();
        self.iteration = 0;
        self.max_change = None;
        self.converged = false;
        debug!(size = self.size, "network reset");
    }

    /// Run one synchronous relaxation sweep over every non-clamped unit.
    pub fn step(&mut self) -> SweepResult {
        let n = self.size;
        let strength = self.config.inhibition_strength;
        let mut next = self.probs.clone();
        let mut updated = vec![0.0_f64; n];
        let mut max_change = 0.0_f64;

        for row in 0..n {
            for col in 0..n {
                let cell = Cell::new(row, col);
                if self.clamps.contains_key(&cell) {
                    continue;
                }
                let current = self.probs.cell(row, col);
                for value in 1..=n {
                    if self.config.hard_exclusion && self.excluded(cell, value) {
                        updated[value - 1] = 0.0;
                        continue;
                    }
                    let inhibition = self.inhibition(row, col, value);
                    let factor = (1.0 - strength * inhibition).max(0.0);
                    updated[value - 1] = current[value - 1] * factor;
                }
                normalize(&mut updated);
                max_change = max_change.max(max_abs_change(current, &updated));
                next.cell_mut(row, col).copy_from_slice(&updated);
            }
        }

        self.probs = next;
        self.iteration += 1;
        self.max_change = Some(max_change);
        let was_converged = self.converged;
        self.converged = max_change < self.config.convergence_threshold;

        trace!(iteration = self.iteration, max_change, "sweep");
        if self.converged && !was_converged {
            debug!(iteration = self.iteration, max_change, "network settled");
        }

        SweepResult {
            max_change,
            converged: self.converged,
            iteration: self.iteration,
        }
    }

    /// Sweep until converged or `max_steps` sweeps have run.
    ///
    /// Returns the last sweep. With `max_steps == 0` nothing is swept and the
    /// current status is returned (`max_change` is 0.0 before the first sweep).
    pub fn settle(&mut self, max_steps: u32) -> SweepResult {
        let mut last = self.status();
        for _ in 0..max_steps {
            last = self.step();
            if last.converged {
                break;
            }
        }
        last
    }

    fn status(&self) -> SweepResult {
        SweepResult {
            max_change: self.max_change.unwrap_or(0.0),
            converged: self.converged,
            iteration: self.iteration,
        }
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// Side length `N`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current configuration.
    pub fn config(&self) -> &RelaxationConfig {
        &self.config
    }

    /// Current inhibition strength.
    pub fn inhibition_strength(&self) -> f64 {
        self.config.inhibition_strength
    }

    /// Sweeps since creation or the last reset.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Largest change in the most recent sweep; `None` before the first.
    pub fn max_change(&self) -> Option<f64> {
        self.max_change
    }

    /// Whether the most recent sweep fell below the convergence threshold.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Whether `(row, col)` is clamped. Out-of-range cells are never clamped.
    pub fn is_clamped(&self, row: usize, col: usize) -> bool {
        self.clamps.contains_key(&Cell::new(row, col))
    }

    /// Clue value at `(row, col)`, if clamped.
    pub fn clue(&self, row: usize, col: usize) -> Option<usize> {
        self.clamps.get(&Cell::new(row, col)).copied()
    }

    /// Number of clamped cells.
    pub fn clue_count(&self) -> usize {
        self.clamps.len()
    }

    /// Distribution of one cell.
    pub fn probabilities(&self, row: usize, col: usize) -> Result<&[f64]> {
        self.check_cell(row, col)?;
        Ok(self.probs.cell(row, col))
    }

    /// Most likely 1-indexed value of a cell and its probability.
    pub fn most_likely(&self, row: usize, col: usize) -> Result<(usize, f64)> {
        self.check_cell(row, col)?;
        Ok(self.probs.dominant(row, col))
    }

    /// `grid[row][col]`: clue value for clamped cells, otherwise the most
    /// likely value.
    pub fn grid(&self) -> Vec<Vec<usize>> {
        (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| {
                        self.clue(row, col)
                            .unwrap_or_else(|| self.probs.dominant(row, col).0)
                    })
                    .collect()
            })
            .collect()
    }

    /// Whether the grid reads as a confident Latin square.
    ///
    /// Every cell's dominant probability must reach
    /// [`RelaxationConfig::confidence_threshold`] and no dominant value may
    /// repeat within a row or column.
    pub fn is_valid_solution(&self) -> bool {
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                if self.probs.dominant(row, col).1 < self.config.confidence_threshold {
                    return false;
                }
            }
        }

        let grid = self.grid();
        let mut seen = vec![false; n + 1];
        for row in 0..n {
            seen.fill(false);
            for col in 0..n {
                let v = grid[row][col];
                if seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        for col in 0..n {
            seen.fill(false);
            for row in grid.iter() {
                let v = row[col];
                if seen[v] {
                    return false;
                }
                seen[v] = true;
            }
        }
        true
    }

    /// Build a [`Snapshot`] of the full state. Does not mutate the network.
    pub fn snapshot(&self) -> Snapshot {
        let n = self.size;
        let mut probabilities = BTreeMap::new();
        let mut clamped = Vec::with_capacity(self.clamps.len());
        for row in 0..n {
            for col in 0..n {
                probabilities.insert(cell_key(row, col), self.probs.cell(row, col).to_vec());
                if self.is_clamped(row, col) {
                    clamped.push([row, col]);
                }
            }
        }
        Snapshot {
            grid_size: n,
            iteration: self.iteration,
            is_converged: self.converged,
            max_change: self.max_change,
            probabilities,
            clamped,
            grid: self.grid(),
        }
    }

    /// Alias for [`snapshot`](Self::snapshot), matching the command surface.
    pub fn get_state(&self) -> Snapshot {
        self.snapshot()
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn check_cell(&self, row: usize, col: usize) -> Result<Cell> {
        let max = self.size - 1;
        if row > max {
            return Err(SettleError::OutOfRange { axis: Axis::Row, value: row, min: 0, max });
        }
        if col > max {
            return Err(SettleError::OutOfRange { axis: Axis::Column, value: col, min: 0, max });
        }
        Ok(Cell::new(row, col))
    }

    fn check_value(&self, value: usize) -> Result<()> {
        if value == 0 || value > self.size {
            return Err(SettleError::OutOfRange {
                axis: Axis::Value,
                value,
                min: 1,
                max: self.size,
            });
        }
        Ok(())
    }

    /// Combined row/column inhibition on `value` at `(row, col)`, read from
    /// the tensor as it stood at the start of the sweep.
    fn inhibition(&self, row: usize, col: usize, value: usize) -> f64 {
        let n = self.size;
        if n < 2 {
            return 0.0;
        }
        let others = (n - 1) as f64;

        let mut row_mass = 0.0;
        for c in 0..n {
            if c != col {
                row_mass += self.probs.unit(row, c, value);
            }
        }
        let mut col_mass = 0.0;
        for r in 0..n {
            if r != row {
                col_mass += self.probs.unit(r, col, value);
            }
        }

        (row_mass / others + col_mass / others) / 2.0
    }

    /// Whether `value` is clamped in another cell of `cell`'s row or column.
    fn excluded(&self, cell: Cell, value: usize) -> bool {
        let n = self.size;
        let in_row = (0..n)
            .filter(|&c| c != cell.col)
            .any(|c| self.clue(cell.row, c) == Some(value));
        in_row
            || (0..n)
                .filter(|&r| r != cell.row)
                .any(|r| self.clue(r, cell.col) == Some(value))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn assert_cells_normalised(net: &RelaxationNetwork) {
        let n = net.size();
        for r in 0..n {
            for c in 0..n {
                let s: f64 = net.probabilities(r, c).unwrap().iter().sum();
                assert!((s - 1.0).abs() < TOL, "cell ({},{}) sums to {}", r, c, s);
            }
        }
    }

    #[test]
    fn test_new_is_uniform() {
        for n in 1..=9 {
            let net = RelaxationNetwork::new(n).unwrap();
            let u = 1.0 / n as f64;
            for r in 0..n {
                for c in 0..n {
                    let p = net.probabilities(r, c).unwrap();
                    assert_eq!(p.len(), n);
                    assert!(p.iter().all(|&x| x == u));
                }
            }
            assert_eq!(net.clue_count(), 0);
            assert_eq!(net.iteration(), 0);
            assert_eq!(net.max_change(), None);
            assert!(!net.is_converged());
        }
    }

    #[test]
    fn test_invalid_size_rejected() {
        assert_eq!(
            RelaxationNetwork::new(0).unwrap_err(),
            SettleError::InvalidSize { size: 0, max: MAX_GRID_SIZE }
        );
        assert!(matches!(
            RelaxationNetwork::new(MAX_GRID_SIZE + 1),
            Err(SettleError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_set_clue_one_hot() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(1, 2, 3).unwrap();
        assert_eq!(net.probabilities(1, 2).unwrap(), &[0.0, 0.0, 1.0, 0.0]);
        assert!(net.is_clamped(1, 2));
        assert_eq!(net.clue(1, 2), Some(3));
        assert_eq!(net.most_likely(1, 2).unwrap(), (3, 1.0));
    }

    #[test]
    fn test_set_clue_overwrites_previous_clue() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_clue(0, 0, 4).unwrap();
        assert_eq!(net.clue(0, 0), Some(4));
        assert_eq!(net.clue_count(), 1);
        assert_eq!(net.probabilities(0, 0).unwrap(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_leaves_state_unchanged() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.step();
        let before = net.snapshot();

        assert_eq!(
            net.set_clue(0, 1, 5),
            Err(SettleError::OutOfRange { axis: Axis::Value, value: 5, min: 1, max: 4 })
        );
        assert_eq!(
            net.set_clue(0, 1, 0),
            Err(SettleError::OutOfRange { axis: Axis::Value, value: 0, min: 1, max: 4 })
        );
        assert_eq!(
            net.set_clue(4, 1, 2),
            Err(SettleError::OutOfRange { axis: Axis::Row, value: 4, min: 0, max: 3 })
        );
        assert_eq!(
            net.remove_clue(0, 4),
            Err(SettleError::OutOfRange { axis: Axis::Column, value: 4, min: 0, max: 3 })
        );
        assert!(net.probabilities(9, 9).is_err());

        assert_eq!(net.snapshot(), before);
    }

    #[test]
    fn test_remove_clue_resets_to_uniform() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(2, 2, 2).unwrap();
        net.remove_clue(2, 2).unwrap();
        assert!(!net.is_clamped(2, 2));
        assert!(net.probabilities(2, 2).unwrap().iter().all(|&p| p == 0.25));

        let snap = net.get_state();
        assert!(!snap.is_clamped(2, 2));
        assert!(snap.clamped.is_empty());
        assert!(snap.cell(2, 2).unwrap().iter().all(|&p| p == 0.25));
    }

    #[test]
    fn test_remove_clue_idempotent() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        for _ in 0..5 {
            net.step();
        }
        let before = net.snapshot();
        net.remove_clue(3, 3).unwrap();
        net.remove_clue(3, 3).unwrap();
        assert_eq!(net.snapshot(), before);
    }

    #[test]
    fn test_clamped_cells_bitwise_invariant() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_clue(3, 1, 3).unwrap();
        let a = net.probabilities(0, 0).unwrap().to_vec();
        let b = net.probabilities(3, 1).unwrap().to_vec();
        for _ in 0..50 {
            net.step();
            assert_eq!(net.probabilities(0, 0).unwrap(), a.as_slice());
            assert_eq!(net.probabilities(3, 1).unwrap(), b.as_slice());
        }
    }

    #[test]
    fn test_step_keeps_cells_normalised() {
        let mut net = RelaxationNetwork::new(5).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_clue(2, 3, 4).unwrap();
        assert_cells_normalised(&net);
        for _ in 0..40 {
            net.step();
            assert_cells_normalised(&net);
        }
    }

    #[test]
    fn test_sweep_is_synchronous() {
        // 2×2 with (0,0)=1. Cell (1,1) only sees (0,1) and (1,0), which are
        // uniform at the start of the sweep, so it must stay uniform even
        // though both neighbours move during the same sweep.
        let mut net = RelaxationNetwork::new(2).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.step();

        assert_eq!(net.probabilities(1, 1).unwrap(), &[0.5, 0.5]);
        let a = net.probabilities(0, 1).unwrap().to_vec();
        let b = net.probabilities(1, 0).unwrap().to_vec();
        assert_eq!(a, b);
        assert!((a[0] - 0.3125 / 0.75).abs() < TOL, "a={:?}", a);
        assert!((a[1] - 0.4375 / 0.75).abs() < TOL, "a={:?}", a);
    }

    #[test]
    fn test_step_counts_and_reports() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        let r = net.step();
        assert_eq!(r.iteration, 1);
        assert_eq!(net.iteration(), 1);
        assert_eq!(net.max_change(), Some(r.max_change));
        assert!(r.max_change > 0.0);
        assert!(!r.converged);
    }

    #[test]
    fn test_zero_strength_settles_immediately() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_inhibition(0.0);
        let r = net.step();
        assert_eq!(r.max_change, 0.0);
        assert!(r.converged);
    }

    #[test]
    fn test_unclued_grid_is_a_fixed_point() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        let r = net.step();
        assert_eq!(r.max_change, 0.0);
        assert!(net.is_converged());
    }

    #[test]
    fn test_single_cell_grid() {
        let mut net = RelaxationNetwork::new(1).unwrap();
        assert_eq!(net.probabilities(0, 0).unwrap(), &[1.0]);
        let r = net.step();
        assert!(r.converged);
        assert_eq!(net.grid(), vec![vec![1]]);
        assert!(net.is_valid_solution());
    }

    #[test]
    fn test_fully_clamped_grid_converges() {
        let mut net = RelaxationNetwork::new(2).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_clue(0, 1, 2).unwrap();
        net.set_clue(1, 0, 2).unwrap();
        net.set_clue(1, 1, 1).unwrap();
        let r = net.step();
        assert_eq!(r.max_change, 0.0);
        assert!(r.converged);
        assert!(net.is_valid_solution());
    }

    #[test]
    fn test_conflicting_clues_tolerated() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.set_clue(0, 1, 1).unwrap();
        for _ in 0..100 {
            net.step();
        }
        assert_cells_normalised(&net);
        assert!(!net.is_valid_solution());
    }

    #[test]
    fn test_out_of_range_strength_stays_normalised() {
        for strength in [-0.5, 2.0, 10.0, f64::NAN] {
            let mut net = RelaxationNetwork::new(4).unwrap();
            net.set_clue(0, 0, 1).unwrap();
            net.set_clue(1, 1, 2).unwrap();
            net.set_inhibition(strength);
            for _ in 0..20 {
                net.step();
            }
            assert_cells_normalised(&net);
        }
    }

    #[test]
    fn test_hard_exclusion_zeroes_clamped_values() {
        let config = RelaxationConfig::default().with_hard_exclusion(true);
        let mut net = RelaxationNetwork::with_config(4, config).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        net.step();
        // Same row and same column lose value 1 entirely.
        assert_eq!(net.probabilities(0, 3).unwrap()[0], 0.0);
        assert_eq!(net.probabilities(2, 0).unwrap()[0], 0.0);
        // Unrelated cell keeps some mass on value 1.
        assert!(net.probabilities(2, 2).unwrap()[0] > 0.0);
    }

    #[test]
    fn test_settle_stops_at_convergence() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        let r = net.settle(50);
        assert!(r.converged);
        assert_eq!(r.iteration, 1);
    }

    #[test]
    fn test_settle_zero_reports_status_without_sweeping() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        let before = net.snapshot();
        let r = net.settle(0);
        assert_eq!(r, SweepResult { max_change: 0.0, converged: false, iteration: 0 });
        assert_eq!(net.snapshot(), before);

        let swept = net.settle(2);
        assert_eq!(net.settle(0), swept);
        assert_eq!(net.iteration(), 2);
    }

    #[test]
    fn test_settle_respects_cap() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_clue(0, 0, 1).unwrap();
        let r = net.settle(3);
        assert_eq!(r.iteration, 3);
        assert!(!r.converged);
    }

    #[test]
    fn test_reset_keeps_strength_clears_state() {
        let mut net = RelaxationNetwork::new(4).unwrap();
        net.set_inhibition(0.8);
        net.set_clue(0, 0, 1).unwrap();
        net.step();
        net.reset();
        assert_eq!(net.iteration(), 0);
        assert_eq!(net.clue_count(), 0);
        assert_eq!(net.max_change(), None);
        assert!(!net.is_converged());
        assert_eq!(net.inhibition_strength(), 0.8);
        assert_eq!(net.snapshot(), RelaxationNetwork::new(4).unwrap().snapshot());
    }

    #[test]
    fn test_grid_prefers_clues() {
        let mut net = RelaxationNetwork::new(3).unwrap();
        net.set_clue(1, 1, 3).unwrap();
        let g = net.grid();
        assert_eq!(g[1][1], 3);
        assert_eq!(g[0][0], 1);
    }
}
