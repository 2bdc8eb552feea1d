use std::fmt;

use kw_core::entity::EntityId;
use kw_core::signal::Signal;
use uuid::Uuid;

/// Unique identifier for a creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreatorId(pub Uuid);

impl CreatorId {
    /// Generate a new random creator ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Payload announcing a freshly created entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCreatedArgs {
    /// The entity that was created.
    pub entity: EntityId,
    /// Whether the entity carries the movement capability. The
    /// manager only tracks movable entities.
    pub movable: bool,
}

/// A source of new entities the manager can watch.
///
/// Spawners and factories implement this; the manager subscribes to
/// the creation signal of every registered creator and starts tracking
/// each movable entity it announces.
pub trait Creator {
    /// Stable identity of this creator, used to reject duplicate
    /// registration and to find the subscription on deregistration.
    fn id(&self) -> CreatorId;

    /// Signal raised after this creator builds an entity.
    fn entity_created(&self) -> &Signal<EntityCreatedArgs>;
}
