use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::area::AreaId;
use crate::container::{Member, MemberSet};
use crate::entity::{Entity, EntityId};
use crate::error::{WorldError, WorldResult};
use crate::position::Position2D;
use crate::signal::Signal;

/// Unique identifier for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub Uuid);

impl TileId {
    /// Generate a new random tile ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A single cell of the grid, holding entities.
///
/// Tiles are positioned within an [`Area`] when added to one. The
/// entity set is ordered and identity-unique; an entity can never sit
/// on the same tile twice.
///
/// [`Area`]: crate::area::Area
#[derive(Debug)]
pub struct Tile {
    id: TileId,
    kind: String,
    variation: String,
    area: Option<AreaId>,
    position: Option<Position2D>,
    entities: MemberSet<Entity>,
    entity_added: Signal<EntityId>,
    entity_removed: Signal<EntityId>,
    destroyed: Signal<TileId>,
}

impl Tile {
    /// Create a detached tile of the given type and variation.
    pub fn new(kind: impl Into<String>, variation: impl Into<String>) -> Self {
        Self {
            id: TileId::new(),
            kind: kind.into(),
            variation: variation.into(),
            area: None,
            position: None,
            entities: MemberSet::new(),
            entity_added: Signal::new(),
            entity_removed: Signal::new(),
            destroyed: Signal::new(),
        }
    }

    /// Unique identifier of this tile.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// The type of tile, as understood by factories.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The variation on the type.
    pub fn variation(&self) -> &str {
        &self.variation
    }

    /// The area currently holding this tile, if any.
    pub fn area(&self) -> Option<AreaId> {
        self.area
    }

    /// Where this tile sits in its area, once added to one.
    pub fn position(&self) -> Option<Position2D> {
        self.position
    }

    /// Signal raised after an entity joins this tile.
    pub fn entity_added(&self) -> &Signal<EntityId> {
        &self.entity_added
    }

    /// Signal raised after an entity leaves this tile.
    pub fn entity_removed(&self) -> &Signal<EntityId> {
        &self.entity_removed
    }

    /// Signal raised when this tile is destroyed, after its removal
    /// from the area and after any cascaded entity destruction.
    pub fn destroyed(&self) -> &Signal<TileId> {
        &self.destroyed
    }

    /// Add an entity to this tile, pointing its upward link here.
    ///
    /// Fails if the entity is already a member; nothing changes in
    /// that case. Emits [`entity_added`] on success.
    ///
    /// [`entity_added`]: Tile::entity_added
    pub fn add_entity(&mut self, mut entity: Entity) -> WorldResult<EntityId> {
        let id = entity.id();
        if self.entities.contains(id) {
            return Err(WorldError::DuplicateMember { id: id.to_string() });
        }
        entity.set_parent(self.id);
        self.entities.add(entity)?;
        self.entity_added.emit(&id);
        Ok(id)
    }

    /// Remove and return an entity, clearing its upward link. Emits
    /// [`entity_removed`] only when something was removed.
    ///
    /// [`entity_removed`]: Tile::entity_removed
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(id)?;
        entity.clear_parent();
        self.entity_removed.emit(&id);
        Some(entity)
    }

    /// Remove an entity and destroy it: removal first, then the
    /// entity's own destruction notice. Returns whether the entity
    /// was present.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        match self.remove_entity(id) {
            Some(entity) => {
                entity.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroy a detached tile, cascading into its entities when
    /// `propagate` is set.
    pub fn destroy(mut self, propagate: bool) {
        self.destroy_contents(propagate);
        self.raise_destroyed();
    }

    /// Destroy the tile's entities in reverse insertion order. Each
    /// entity leaves the container before its destruction notice.
    pub(crate) fn destroy_contents(&mut self, propagate: bool) {
        if !propagate {
            return;
        }
        while let Some(entity) = self.entities.pop_last() {
            let id = entity.id();
            self.entity_removed.emit(&id);
            entity.destroy();
        }
    }

    pub(crate) fn raise_destroyed(&self) {
        self.destroyed.emit(&self.id);
    }

    pub(crate) fn set_position(&mut self, area: AreaId, position: Position2D) {
        self.area = Some(area);
        self.position = Some(position);
    }

    pub(crate) fn clear_position(&mut self) {
        self.area = None;
        self.position = None;
    }

    /// Borrow an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutably borrow an entity by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Return `true` if the entity is a member of this tile.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Iterate over the entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities on this tile.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl Member for Tile {
    type Id = TileId;

    fn key(&self) -> TileId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::change::ChangeBus;

    fn counter(signal: &Signal<EntityId>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&count);
        signal.connect(move |_| sink.set(sink.get() + 1));
        count
    }

    #[test]
    fn add_entity_sets_the_upward_link() {
        let mut tile = Tile::new("floor", "stone");
        let id = tile.add_entity(Entity::new("crate", "wooden")).unwrap();
        assert_eq!(tile.entity(id).unwrap().tile(), Some(tile.id()));
        assert_eq!(tile.entity_count(), 1);
    }

    #[test]
    fn entity_moves_between_tiles_by_remove_and_add() {
        let mut from = Tile::new("floor", "stone");
        let mut to = Tile::new("floor", "grass");
        let added_to = counter(to.entity_added());

        let id = from.add_entity(Entity::new("crate", "wooden")).unwrap();
        let entity = from.remove_entity(id).unwrap();
        to.add_entity(entity).unwrap();

        assert_eq!(from.entity_count(), 0);
        assert!(to.contains_entity(id));
        assert_eq!(to.entity(id).unwrap().tile(), Some(to.id()));
        assert_eq!(added_to.get(), 1);
    }

    #[test]
    fn remove_entity_is_some_exactly_once() {
        let mut tile = Tile::new("floor", "stone");
        let removed = counter(tile.entity_removed());

        let id = tile.add_entity(Entity::new("crate", "wooden")).unwrap();
        let entity = tile.remove_entity(id);
        assert!(entity.is_some());
        assert!(entity.unwrap().tile().is_none());
        assert!(tile.remove_entity(id).is_none());
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn destroy_entity_removes_then_announces() {
        let bus = ChangeBus::new();
        let mut tile = Tile::new("floor", "stone");
        let id = tile
            .add_entity(Entity::with_movement(&bus, "unit", "scout"))
            .unwrap();

        let removed = counter(tile.entity_removed());
        let destroyed = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&destroyed);
        bus.entity_destroyed().connect(move |_| sink.set(sink.get() + 1));

        assert!(tile.destroy_entity(id));
        assert_eq!(removed.get(), 1);
        assert_eq!(destroyed.get(), 1);
        assert!(!tile.destroy_entity(id));
    }

    #[test]
    fn destroy_with_propagate_cascades_in_reverse_order() {
        let bus = ChangeBus::new();
        let mut tile = Tile::new("floor", "stone");
        let first = tile
            .add_entity(Entity::with_movement(&bus, "unit", "a"))
            .unwrap();
        let second = tile
            .add_entity(Entity::with_movement(&bus, "unit", "b"))
            .unwrap();

        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = Rc::clone(&order);
        bus.entity_destroyed()
            .connect(move |id| sink.borrow_mut().push(*id));

        let tile_destroyed = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&tile_destroyed);
        tile.destroyed().connect(move |_| sink.set(sink.get() + 1));

        tile.destroy(true);
        assert_eq!(*order.borrow(), vec![second, first]);
        assert_eq!(tile_destroyed.get(), 1);
    }

    #[test]
    fn destroy_without_propagate_drops_entities_silently() {
        let bus = ChangeBus::new();
        let mut tile = Tile::new("floor", "stone");
        tile.add_entity(Entity::with_movement(&bus, "unit", "a"))
            .unwrap();

        let destroyed = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&destroyed);
        bus.entity_destroyed().connect(move |_| sink.set(sink.get() + 1));

        tile.destroy(false);
        assert_eq!(destroyed.get(), 0);
    }
}
