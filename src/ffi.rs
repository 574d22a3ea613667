//! Python FFI bindings via PyO3.
//!
//! Exposes the relaxation command surface to a Python presentation layer.
//! The caller owns each `Network` instance and threads it through its own
//! event handlers; there is no module-level network.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from settle_core import Network
//!
//! net = Network(4)
//! for row, col, value in [(0, 0, 1), (0, 1, 2), (1, 2, 4), (2, 3, 2), (3, 1, 3)]:
//!     net.set_clue(row, col, value)
//!
//! snap = net.get_state()
//! while not snap.is_converged:
//!     snap = net.step()          # drive from a UI timer, or call settle(n)
//!
//! print(snap.iteration, snap.max_change)
//! print(snap.grid)                # [[1, 2, 3, 4], ...]
//! print(snap.probabilities["1,1"])
//! ```

use std::collections::BTreeMap;

use pyo3::create_exception;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{RelaxationConfig, DEFAULT_INHIBITION_STRENGTH};
use crate::error::{Axis, SettleError};
use crate::network::RelaxationNetwork;
use crate::snapshot::Snapshot;

create_exception!(
    settle_core,
    InvalidSizeError,
    PyValueError,
    "Grid size is not positive or too large."
);
create_exception!(
    settle_core,
    OutOfRangeError,
    PyValueError,
    "Row, column or value lies outside the grid."
);

fn to_py_err(e: SettleError) -> PyErr {
    match e {
        SettleError::InvalidSize { .. } => InvalidSizeError::new_err(e.to_string()),
        SettleError::OutOfRange { .. } => OutOfRangeError::new_err(e.to_string()),
    }
}

/// Python integers may be negative; reject those before they reach the engine.
fn index_arg(axis: Axis, v: i64) -> PyResult<usize> {
    usize::try_from(v).map_err(|_| OutOfRangeError::new_err(format!("{axis} {v} is negative")))
}

fn size_arg(size: i64) -> PyResult<usize> {
    usize::try_from(size)
        .map_err(|_| InvalidSizeError::new_err(format!("invalid grid size {size}: must be positive")))
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Read-only state of a network at one instant.
///
/// Attributes:
///     probabilities: dict mapping "row,col" to a list of N probabilities
///     clamped:       list of [row, col] pairs fixed as clues
///     grid:          grid[row][col] — clue value, else most likely value
///     iteration:     sweeps since creation or reset
///     max_change:    largest change in the last sweep, None before the first
///     is_converged:  True once the last sweep fell below the threshold
///     grid_size:     N
#[pyclass(name = "Snapshot", frozen)]
pub struct PySnapshot {
    inner: Snapshot,
}

#[pymethods]
impl PySnapshot {
    /// Per-cell probability lists keyed "row,col".
    #[getter]
    pub fn probabilities(&self) -> BTreeMap<String, Vec<f64>> {
        self.inner.probabilities.clone()
    }

    /// Clamped cells as [row, col] pairs, row-major.
    #[getter]
    pub fn clamped(&self) -> Vec<[usize; 2]> {
        self.inner.clamped.clone()
    }

    /// Grid of 1-indexed values.
    #[getter]
    pub fn grid(&self) -> Vec<Vec<usize>> {
        self.inner.grid.clone()
    }

    /// Iteration counter.
    #[getter]
    pub fn iteration(&self) -> u64 {
        self.inner.iteration
    }

    /// Largest change in the most recent sweep, or None.
    #[getter]
    pub fn max_change(&self) -> Option<f64> {
        self.inner.max_change
    }

    /// Convergence flag.
    #[getter]
    pub fn is_converged(&self) -> bool {
        self.inner.is_converged
    }

    /// Side length N.
    #[getter]
    pub fn grid_size(&self) -> usize {
        self.inner.grid_size
    }

    /// Probabilities of one cell, or None outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Vec<f64>> {
        self.inner.cell(row, col).map(|p| p.to_vec())
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Snapshot(grid_size={}, iteration={}, is_converged={}, clamped={})",
            self.inner.grid_size,
            self.inner.iteration,
            if self.inner.is_converged { "True" } else { "False" },
            self.inner.clamped.len(),
        )
    }
}

impl From<Snapshot> for PySnapshot {
    fn from(inner: Snapshot) -> Self {
        Self { inner }
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Latin-square relaxation network.
///
/// Every command returns a fresh Snapshot. Calls must not overlap; a UI
/// timer cancels simply by not calling step() again.
///
/// Example::
///
///     net = Network(4, inhibition_strength=0.5)
///     net.set_clue(0, 0, 1)
///     snap = net.settle(200)
///     print(snap.is_converged, snap.grid)
#[pyclass(name = "Network")]
pub struct PyNetwork {
    inner: RelaxationNetwork,
}

#[pymethods]
impl PyNetwork {
    /// Create a network with every cell uniform.
    ///
    /// Args:
    ///     size:                grid side N (>= 1)
    ///     inhibition_strength: competition strength, conventionally 0.0–1.0 (default 0.5)
    ///     hard_exclusion:      zero out values clamped elsewhere in the row/column (default False)
    ///
    /// Raises:
    ///     InvalidSizeError: size is not positive or too large
    #[new]
    #[pyo3(signature = (size, inhibition_strength=DEFAULT_INHIBITION_STRENGTH, hard_exclusion=false))]
    pub fn new(size: i64, inhibition_strength: f64, hard_exclusion: bool) -> PyResult<Self> {
        let config = RelaxationConfig::default()
            .with_inhibition_strength(inhibition_strength)
            .with_hard_exclusion(hard_exclusion);
        let inner = RelaxationNetwork::with_config(size_arg(size)?, config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Clamp a cell to a 1-indexed value.
    ///
    /// Raises:
    ///     OutOfRangeError: row, col or value outside the grid
    pub fn set_clue(&mut self, row: i64, col: i64, value: i64) -> PyResult<PySnapshot> {
        let row = index_arg(Axis::Row, row)?;
        let col = index_arg(Axis::Column, col)?;
        let value = index_arg(Axis::Value, value)?;
        self.inner.set_clue(row, col, value).map_err(to_py_err)?;
        Ok(self.inner.snapshot().into())
    }

    /// Unclamp a cell and reset it to uniform. No-op if it was not clamped.
    ///
    /// Raises:
    ///     OutOfRangeError: row or col outside the grid
    pub fn remove_clue(&mut self, row: i64, col: i64) -> PyResult<PySnapshot> {
        let row = index_arg(Axis::Row, row)?;
        let col = index_arg(Axis::Column, col)?;
        self.inner.remove_clue(row, col).map_err(to_py_err)?;
        Ok(self.inner.snapshot().into())
    }

    /// Run one synchronous relaxation sweep.
    pub fn step(&mut self) -> PySnapshot {
        self.inner.step();
        self.inner.snapshot().into()
    }

    /// Sweep until converged or `max_steps` sweeps have run.
    pub fn settle(&mut self, max_steps: u32) -> PySnapshot {
        self.inner.settle(max_steps);
        self.inner.snapshot().into()
    }

    /// Clear clues, probabilities and counters; keep size and strength.
    pub fn reset(&mut self) -> PySnapshot {
        self.inner.reset();
        self.inner.snapshot().into()
    }

    /// Set the inhibition strength for subsequent sweeps. Any float is accepted.
    pub fn set_inhibition(&mut self, strength: f64) -> PySnapshot {
        self.inner.set_inhibition(strength);
        self.inner.snapshot().into()
    }

    /// Current state without mutating the network.
    pub fn get_state(&self) -> PySnapshot {
        self.inner.snapshot().into()
    }

    /// True when every cell is confident and no value repeats in a row or column.
    pub fn is_valid_solution(&self) -> bool {
        self.inner.is_valid_solution()
    }

    /// Side length N.
    #[getter]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Current inhibition strength.
    #[getter]
    pub fn inhibition_strength(&self) -> f64 {
        self.inner.inhibition_strength()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Network(size={}, inhibition_strength={:.2}, iteration={})",
            self.inner.size(),
            self.inner.inhibition_strength(),
            self.inner.iteration(),
        )
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Network settling — Latin-square relaxation for Python front ends.
#[pymodule]
pub fn settle_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNetwork>()?;
    m.add_class::<PySnapshot>()?;
    m.add("InvalidSizeError", m.py().get_type_bound::<InvalidSizeError>())?;
    m.add("OutOfRangeError", m.py().get_type_bound::<OutOfRangeError>())?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("MAX_GRID_SIZE", crate::network::MAX_GRID_SIZE)?;
    Ok(())
}
