use std::cell::RefCell;
use std::rc::Rc;

use kw_core::change::TileChangedArgs;
use kw_core::entity::EntityId;

/// A handler in the tile-change pipeline.
///
/// Solvers run in registration order for each phase event of a tracked
/// entity. Returning `true` claims the event and stops the chain;
/// returning `false` passes it on.
pub trait Solver {
    /// Stable name used in duplicate-registration errors.
    fn name(&self) -> &str;

    /// React to one phase event. Return `true` to stop later solvers
    /// from seeing it.
    fn solve(&mut self, entity: EntityId, change: &TileChangedArgs) -> bool;
}

/// A solver shared between the manager and its owner.
///
/// Identity is pointer identity: the same `Rc` cannot be added twice,
/// while two instances of one solver type are distinct.
pub type SharedSolver = Rc<RefCell<dyn Solver>>;

/// Wrap a solver for registration with the manager.
pub fn share<S: Solver + 'static>(solver: S) -> SharedSolver {
    Rc::new(RefCell::new(solver))
}
