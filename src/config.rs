/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Tunables for the relaxation sweep.
//!
//! [`RelaxationConfig`] is fixed at network creation, except for
//! `inhibition_strength`, which may be changed between sweeps through
//! [`RelaxationNetwork::set_inhibition`](crate::network::RelaxationNetwork::set_inhibition).

/// Default inhibition strength applied to competing units.
pub const DEFAULT_INHIBITION_STRENGTH: f64 = 0.5;

/// Default settling threshold on the largest per-unit change in a sweep.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.001;

/// Default dominant probability a cell needs to count as decided.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Configuration for a [`RelaxationNetwork`](crate::network::RelaxationNetwork).
///
/// Default values:
/// - `inhibition_strength`: 0.5
/// - `convergence_threshold`: 0.001
/// - `hard_exclusion`: off
/// - `confidence_threshold`: 0.9
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelaxationConfig {
    /// Scale on the combined row/column inhibition signal.
    ///
    /// Conventionally in [0.0, 1.0]. Values outside that range are accepted
    /// and give non-classical dynamics: negative values amplify competitors,
    /// values above 1.0 can drive units to zero in one sweep.
    pub inhibition_strength: f64,

    /// A sweep whose largest per-unit change is below this value marks the
    /// network as converged.
    pub convergence_threshold: f64,

    /// When set, a value clamped in another cell of the same row or column
    /// is forced to probability 0 before normalisation, on top of the
    /// ordinary inhibition.
    pub hard_exclusion: bool,

    /// Minimum dominant probability every cell needs before
    /// [`is_valid_solution`](crate::network::RelaxationNetwork::is_valid_solution)
    /// accepts the grid.
    pub confidence_threshold: f64,
}

impl RelaxationConfig {
    /// Construct the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style override of the inhibition strength.
    pub fn with_inhibition_strength(mut self, strength: f64) -> Self {
        self.inhibition_strength = strength;
        self
    }

    /// Builder-style toggle for hard exclusion of clamped values.
    pub fn with_hard_exclusion(mut self, enabled: bool) -> Self {
        self.hard_exclusion = enabled;
        self
    }
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            inhibition_strength: DEFAULT_INHIBITION_STRENGTH,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            hard_exclusion: false,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}
