use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::change::{ChangeBus, Movement};
use crate::container::Member;
use crate::tile::TileId;

/// Unique identifier for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An occupant of a tile.
///
/// Entities are the leaves of the hierarchy: they have a type and
/// variation for factories to key on, an upward link to the tile that
/// holds them, and optionally the [`Movement`] capability. They carry
/// no position of their own; their whereabouts is the tile's.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: String,
    variation: String,
    tile: Option<TileId>,
    movement: Option<Movement>,
    created_at: DateTime<Utc>,
}

impl Entity {
    /// Create a stationary entity.
    pub fn new(kind: impl Into<String>, variation: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            kind: kind.into(),
            variation: variation.into(),
            tile: None,
            movement: None,
            created_at: Utc::now(),
        }
    }

    /// Create an entity that can change tiles, announcing its phases
    /// on the given bus.
    pub fn with_movement(
        bus: &ChangeBus,
        kind: impl Into<String>,
        variation: impl Into<String>,
    ) -> Self {
        let mut entity = Self::new(kind, variation);
        entity.movement = Some(Movement::new(entity.id, bus.clone()));
        entity
    }

    /// Unique identifier of this entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The type of entity, as understood by factories.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The variation on the type.
    pub fn variation(&self) -> &str {
        &self.variation
    }

    /// The tile currently holding this entity, if any.
    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    /// The movement capability, when the entity was built with one.
    pub fn movement(&self) -> Option<&Movement> {
        self.movement.as_ref()
    }

    /// Return `true` if this entity can change tiles.
    pub fn is_movable(&self) -> bool {
        self.movement.is_some()
    }

    /// When the entity was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Point the upward link at the tile that will hold this entity.
    /// [`Tile::add_entity`] calls this; membership itself is the
    /// tile's business.
    ///
    /// [`Tile::add_entity`]: crate::tile::Tile::add_entity
    pub fn set_parent(&mut self, tile: TileId) {
        self.tile = Some(tile);
    }

    pub(crate) fn clear_parent(&mut self) {
        self.tile = None;
    }

    /// Destroy this entity. Movable entities announce the destruction
    /// on their bus so trackers can forget them; for stationary
    /// entities this is just a drop.
    pub fn destroy(self) {
        if let Some(movement) = &self.movement {
            movement.announce_destroyed();
        }
    }
}

impl Member for Entity {
    type Id = EntityId;

    fn key(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn entity_id_display_shows_short_form() {
        let id = EntityId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn new_entity_is_stationary_and_unparented() {
        let entity = Entity::new("crate", "wooden");
        assert_eq!(entity.kind(), "crate");
        assert_eq!(entity.variation(), "wooden");
        assert!(entity.tile().is_none());
        assert!(!entity.is_movable());
        assert!(entity.movement().is_none());
    }

    #[test]
    fn with_movement_grants_the_capability() {
        let bus = ChangeBus::new();
        let entity = Entity::with_movement(&bus, "unit", "scout");
        assert!(entity.is_movable());
        assert_eq!(entity.movement().unwrap().entity(), entity.id());
    }

    #[test]
    fn set_parent_assigns_the_upward_link_only() {
        let mut entity = Entity::new("crate", "wooden");
        let tile = TileId::new();
        entity.set_parent(tile);
        assert_eq!(entity.tile(), Some(tile));
    }

    #[test]
    fn destroying_a_movable_entity_announces_it() {
        let bus = ChangeBus::new();
        let entity = Entity::with_movement(&bus, "unit", "scout");
        let id = entity.id();

        let announced = Rc::new(Cell::new(false));
        let sink = Rc::clone(&announced);
        bus.entity_destroyed().connect(move |destroyed| {
            assert_eq!(*destroyed, id);
            sink.set(true);
        });

        entity.destroy();
        assert!(announced.get());
    }

    #[test]
    fn destroying_a_stationary_entity_is_silent() {
        let bus = ChangeBus::new();
        let count = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&count);
        bus.entity_destroyed().connect(move |_| sink.set(sink.get() + 1));

        Entity::new("crate", "wooden").destroy();
        assert_eq!(count.get(), 0);
    }
}
