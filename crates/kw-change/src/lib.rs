//! Tile-change pipeline for Kachelwerk.
//!
//! The [`TileChangeManager`] listens on a [`ChangeBus`] for the phase
//! events of tracked entities and routes each one through a chain of
//! [`Solver`]s. Entities become tracked when a registered [`Creator`]
//! announces them as movable, and are forgotten when the bus reports
//! their destruction.
//!
//! [`ChangeBus`]: kw_core::change::ChangeBus

/// Sources of new entities.
pub mod creator;
/// Error types.
pub mod error;
/// The manager tying bus, creators, and solvers together.
pub mod manager;
/// The solver chain contract.
pub mod solver;

pub use creator::{Creator, CreatorId, EntityCreatedArgs};
pub use error::{ChangeError, ChangeResult};
pub use manager::TileChangeManager;
pub use solver::{SharedSolver, Solver, share};
