//! # settle-core
//!
//! Network settling — Latin-square constraint satisfaction by parallel relaxation.
//!
//! ---
//!
//! ## This is not a search solver. It is a relaxation network.
//!
//! Every `(cell, value)` pair is a *unit* carrying an activation probability.
//! Each cell holds one distribution over `1..=N`. Units that want the same value
//! in the same row or column inhibit one another, and every sweep nudges all
//! probabilities at once until the grid stops moving.
//!
//! **Clamping** — clues are fixed one-hot cells. They never change, and they
//! push on their row and column at full weight.
//!
//! **Synchronous sweeps** — a sweep reads one consistent snapshot of the grid
//! and commits every new value together. No unit sees a neighbour's update
//! from the same sweep.
//!
//! **Convergence** — when the largest change in a sweep falls below the
//! threshold, the network has settled. There is no backtracking and no promise
//! that an arbitrary puzzle settles into a legal square.
//!
//! ---
//!
//! ## The command surface
//!
//! ```text
//! new(size) ─► set_clue / remove_clue / set_inhibition ─► step … step ─► snapshot
//!                         ▲                                     │
//!                         └──────────── reset ◄─────────────────┘
//! ```
//!
//! ```rust
//! use settle_core::network::RelaxationNetwork;
//!
//! let mut net = RelaxationNetwork::new(4)?;
//! net.set_clue(0, 0, 1)?;
//! net.set_clue(0, 1, 2)?;
//! net.set_clue(1, 2, 4)?;
//! net.set_clue(2, 3, 2)?;
//! net.set_clue(3, 1, 3)?;
//!
//! while !net.step().converged {}
//! assert!(net.is_valid_solution());
//! # Ok::<(), settle_core::error::SettleError>(())
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`network`] | [`RelaxationNetwork`], [`SweepResult`] | Clamp set, sweep, convergence, solution check |
//! | [`grid`] | [`ProbabilityGrid`], [`Cell`] | `N × N × N` probability tensor, normalisation |
//! | [`config`] | [`RelaxationConfig`] | Inhibition strength, thresholds, hard exclusion |
//! | [`snapshot`] | [`Snapshot`] | Read-only state handed to a presentation layer |
//! | [`error`] | [`SettleError`] | `InvalidSize` / `OutOfRange` |
//! | `ffi` | `Network`, `Snapshot` | Python bindings (requires `python-ffi` feature) |
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`. Enable the
//! `serde` feature to serialise [`Snapshot`] and [`RelaxationConfig`], and
//! `python-ffi` for the PyO3 extension module.
//!
//! ## Logging
//!
//! Commands emit [`tracing`] events (`debug` for state changes, `trace` per
//! sweep). The library never installs a subscriber.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod config;
pub mod error;
pub mod grid;
pub mod network;
pub mod snapshot;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use config::RelaxationConfig;
pub use error::{Axis, Result, SettleError};
pub use grid::{Cell, ProbabilityGrid};
pub use network::{RelaxationNetwork, SweepResult, MAX_GRID_SIZE};
pub use snapshot::Snapshot;
