use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use kw_core::change::{ChangeBus, TileChangeEvent};
use kw_core::entity::EntityId;
use kw_core::signal::SubscriptionId;

use crate::creator::{Creator, CreatorId};
use crate::error::{ChangeError, ChangeResult};
use crate::solver::SharedSolver;

struct ManagerInner {
    // The name is captured at registration so the duplicate path never
    // has to borrow a solver that may be mid-solve.
    solvers: Vec<(String, SharedSolver)>,
    creators: Vec<(CreatorId, SubscriptionId)>,
    tracked: HashSet<EntityId>,
}

/// Routes tile-change events from tracked entities through a solver
/// chain.
///
/// The manager subscribes to a [`ChangeBus`] once. Entities enter the
/// tracked set when a registered [`Creator`] announces them as movable
/// and leave it when the bus reports their destruction. For every
/// phase event of a tracked entity the solvers run in registration
/// order until one claims the event.
///
/// The handle is cheap to clone; clones drive the same pipeline. The
/// bus holds only weak references back to the manager, so dropping
/// every handle shuts the pipeline down.
#[derive(Clone)]
pub struct TileChangeManager {
    inner: Rc<RefCell<ManagerInner>>,
}

impl TileChangeManager {
    /// Create a manager wired to the given bus.
    pub fn new(bus: &ChangeBus) -> Self {
        let inner = Rc::new(RefCell::new(ManagerInner {
            solvers: Vec::new(),
            creators: Vec::new(),
            tracked: HashSet::new(),
        }));

        for signal in [bus.change_started(), bus.changing(), bus.change_finished()] {
            let weak = Rc::downgrade(&inner);
            signal.connect(move |event| dispatch(&weak, event));
        }

        let weak = Rc::downgrade(&inner);
        bus.entity_destroyed().connect(move |entity| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().tracked.remove(entity);
            }
        });

        Self { inner }
    }

    /// Append a solver to the chain.
    ///
    /// Fails when the same instance is already registered; two
    /// instances of one solver type are distinct and both welcome.
    pub fn add_solver(&self, solver: SharedSolver) -> ChangeResult<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some((name, _)) = inner
            .solvers
            .iter()
            .find(|(_, known)| Rc::ptr_eq(known, &solver))
        {
            return Err(ChangeError::DuplicateSolver(name.clone()));
        }
        // A solver may register itself from inside its own solve call,
        // in which case its cell is not borrowable here.
        let name = solver
            .try_borrow()
            .map(|solver| solver.name().to_owned())
            .unwrap_or_else(|_| String::from("unnamed"));
        inner.solvers.push((name, solver));
        Ok(())
    }

    /// Remove a solver from the chain. Returns whether it was
    /// registered.
    pub fn remove_solver(&self, solver: &SharedSolver) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.solvers.len();
        inner.solvers.retain(|(_, known)| !Rc::ptr_eq(known, solver));
        inner.solvers.len() < before
    }

    /// Watch a creator: every movable entity it announces from now on
    /// is tracked. Fails when the creator is already registered.
    ///
    /// The registration lives until [`deregister_entity_creator`]; a
    /// creator dropped while registered leaves its entry behind, and
    /// [`creator_count`] keeps counting it.
    ///
    /// [`deregister_entity_creator`]: TileChangeManager::deregister_entity_creator
    /// [`creator_count`]: TileChangeManager::creator_count
    pub fn register_entity_creator(&self, creator: &dyn Creator) -> ChangeResult<()> {
        let id = creator.id();
        {
            let inner = self.inner.borrow();
            if inner.creators.iter().any(|(known, _)| *known == id) {
                return Err(ChangeError::DuplicateCreator(id));
            }
        }

        let weak = Rc::downgrade(&self.inner);
        let subscription = creator.entity_created().connect(move |args| {
            if !args.movable {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().tracked.insert(args.entity);
            }
        });

        self.inner.borrow_mut().creators.push((id, subscription));
        Ok(())
    }

    /// Stop watching a creator. Entities it already announced stay
    /// tracked; only future announcements are ignored. Returns whether
    /// the creator was registered.
    pub fn deregister_entity_creator(&self, creator: &dyn Creator) -> bool {
        let id = creator.id();
        let subscription = {
            let mut inner = self.inner.borrow_mut();
            let Some(index) = inner.creators.iter().position(|(known, _)| *known == id) else {
                return false;
            };
            inner.creators.remove(index).1
        };
        creator.entity_created().disconnect(subscription);
        true
    }

    /// Return `true` if the entity is currently tracked.
    pub fn is_tracking(&self, entity: EntityId) -> bool {
        self.inner.borrow().tracked.contains(&entity)
    }

    /// Number of tracked entities.
    pub fn tracked_count(&self) -> usize {
        self.inner.borrow().tracked.len()
    }

    /// Number of registered solvers.
    pub fn solver_count(&self) -> usize {
        self.inner.borrow().solvers.len()
    }

    /// Number of registered creators.
    pub fn creator_count(&self) -> usize {
        self.inner.borrow().creators.len()
    }
}

impl fmt::Debug for TileChangeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TileChangeManager")
            .field("solvers", &inner.solvers.len())
            .field("creators", &inner.creators.len())
            .field("tracked", &inner.tracked.len())
            .finish()
    }
}

/// Run the solver chain for one phase event.
///
/// The chain is snapshotted before any solver runs, so a solver that
/// reentrantly adds or removes solvers changes later events, not this
/// one. No manager borrow is held while solvers execute.
fn dispatch(weak: &Weak<RefCell<ManagerInner>>, event: &TileChangeEvent) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let chain: Vec<SharedSolver> = {
        let inner = inner.borrow();
        if !inner.tracked.contains(&event.entity) {
            return;
        }
        inner
            .solvers
            .iter()
            .map(|(_, solver)| Rc::clone(solver))
            .collect()
    };
    for solver in chain {
        if solver.borrow_mut().solve(event.entity, &event.change) {
            break;
        }
    }
}
