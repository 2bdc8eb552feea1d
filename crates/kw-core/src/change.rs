use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::signal::Signal;
use crate::tile::TileId;

/// The phase of a tile change. A change runs Start, then zero or more
/// Change steps, then Finish. Nothing here validates that order; the
/// movement source owns protocol correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePhase {
    /// The entity started leaving its tile.
    Start,
    /// The entity is between tiles.
    Change,
    /// The entity settled on the destination tile.
    Finish,
}

impl fmt::Display for ChangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Change => write!(f, "change"),
            Self::Finish => write!(f, "finish"),
        }
    }
}

/// Payload of a tile-change phase event, consumed by solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChangedArgs {
    /// The tile the entity is leaving.
    pub from: TileId,
    /// The tile the entity is moving to.
    pub to: TileId,
    /// Which phase of the change this event describes.
    pub phase: ChangePhase,
}

impl TileChangedArgs {
    /// Create change args for one phase of a from→to move.
    pub fn new(from: TileId, to: TileId, phase: ChangePhase) -> Self {
        Self { from, to, phase }
    }
}

/// A phase event together with the entity that is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChangeEvent {
    /// The entity changing tiles.
    pub entity: EntityId,
    /// The phase payload.
    pub change: TileChangedArgs,
}

#[derive(Default)]
struct BusInner {
    change_started: Signal<TileChangeEvent>,
    changing: Signal<TileChangeEvent>,
    change_finished: Signal<TileChangeEvent>,
    entity_destroyed: Signal<EntityId>,
}

/// Shared fan-in point for movement events.
///
/// Every movable entity in a world emits its phase events onto one bus,
/// and listeners (the tile-change manager, a rendering layer) connect
/// to the bus once instead of to each entity. The handle is cheap to
/// clone; clones refer to the same bus.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Rc<BusInner>,
}

impl ChangeBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal raised when an entity starts changing tiles.
    pub fn change_started(&self) -> &Signal<TileChangeEvent> {
        &self.inner.change_started
    }

    /// Signal raised while an entity is between tiles.
    pub fn changing(&self) -> &Signal<TileChangeEvent> {
        &self.inner.changing
    }

    /// Signal raised when an entity finishes changing tiles.
    pub fn change_finished(&self) -> &Signal<TileChangeEvent> {
        &self.inner.change_finished
    }

    /// Signal raised when a movable entity is destroyed. This is the
    /// only lifecycle-ended notification trackers get.
    pub fn entity_destroyed(&self) -> &Signal<EntityId> {
        &self.inner.entity_destroyed
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("change_started", &self.inner.change_started)
            .field("changing", &self.inner.changing)
            .field("change_finished", &self.inner.change_finished)
            .field("entity_destroyed", &self.inner.entity_destroyed)
            .finish()
    }
}

/// The movement capability of an entity.
///
/// Granted at construction via [`Entity::with_movement`]; entities
/// built without it simply cannot emit phase events, so "does this
/// entity move" is decided once instead of re-checked per event.
///
/// An external driver calls the three phase methods; the entity itself
/// never initiates movement.
///
/// [`Entity::with_movement`]: crate::entity::Entity::with_movement
#[derive(Debug, Clone)]
pub struct Movement {
    entity: EntityId,
    bus: ChangeBus,
}

impl Movement {
    pub(crate) fn new(entity: EntityId, bus: ChangeBus) -> Self {
        Self { entity, bus }
    }

    /// The entity this capability belongs to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Announce the start of a from→to tile change.
    pub fn start_change_tile(&self, from: TileId, to: TileId) {
        self.bus.change_started().emit(&self.event(from, to, ChangePhase::Start));
    }

    /// Announce an intermediate step of a from→to tile change.
    pub fn change_tile(&self, from: TileId, to: TileId) {
        self.bus.changing().emit(&self.event(from, to, ChangePhase::Change));
    }

    /// Announce the completion of a from→to tile change.
    pub fn finish_change_tile(&self, from: TileId, to: TileId) {
        self.bus
            .change_finished()
            .emit(&self.event(from, to, ChangePhase::Finish));
    }

    pub(crate) fn announce_destroyed(&self) {
        self.bus.entity_destroyed().emit(&self.entity);
    }

    fn event(&self, from: TileId, to: TileId, phase: ChangePhase) -> TileChangeEvent {
        TileChangeEvent {
            entity: self.entity,
            change: TileChangedArgs::new(from, to, phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn movement_emits_each_phase_with_matching_args() {
        let bus = ChangeBus::new();
        let entity = EntityId::new();
        let movement = Movement::new(entity, bus.clone());
        let from = TileId::new();
        let to = TileId::new();

        let seen = Rc::new(RefCell::new(Vec::new()));
        for signal in [bus.change_started(), bus.changing(), bus.change_finished()] {
            let sink = Rc::clone(&seen);
            signal.connect(move |event: &TileChangeEvent| sink.borrow_mut().push(*event));
        }

        movement.start_change_tile(from, to);
        movement.change_tile(from, to);
        movement.finish_change_tile(from, to);

        let seen = seen.borrow();
        let phases: Vec<ChangePhase> = seen.iter().map(|e| e.change.phase).collect();
        assert_eq!(
            phases,
            vec![ChangePhase::Start, ChangePhase::Change, ChangePhase::Finish]
        );
        for event in seen.iter() {
            assert_eq!(event.entity, entity);
            assert_eq!(event.change.from, from);
            assert_eq!(event.change.to, to);
        }
    }

    #[test]
    fn bus_clones_share_subscribers() {
        let bus = ChangeBus::new();
        let other = bus.clone();

        let count = Rc::new(std::cell::Cell::new(0u32));
        let sink = Rc::clone(&count);
        other
            .entity_destroyed()
            .connect(move |_| sink.set(sink.get() + 1));

        bus.entity_destroyed().emit(&EntityId::new());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(ChangePhase::Start.to_string(), "start");
        assert_eq!(ChangePhase::Change.to_string(), "change");
        assert_eq!(ChangePhase::Finish.to_string(), "finish");
    }
}
