use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::{Member, SpatialSet};
use crate::error::{WorldError, WorldResult};
use crate::level::LevelId;
use crate::position::Position2D;
use crate::signal::Signal;
use crate::tile::{Tile, TileId};

/// Unique identifier for an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId(pub Uuid);

impl AreaId {
    /// Generate a new random area ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AreaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A positioned group of tiles within a [`Level`].
///
/// Tiles are indexed by position: one tile per cell, one cell per
/// tile. The area itself gets a position when added to a level.
///
/// [`Level`]: crate::level::Level
#[derive(Debug)]
pub struct Area {
    id: AreaId,
    kind: String,
    variation: String,
    level: Option<LevelId>,
    position: Option<Position2D>,
    tiles: SpatialSet<Tile>,
    tile_added: Signal<TileId>,
    tile_removed: Signal<TileId>,
    destroyed: Signal<AreaId>,
}

impl Area {
    /// Create a detached area of the given type and variation.
    pub fn new(kind: impl Into<String>, variation: impl Into<String>) -> Self {
        Self {
            id: AreaId::new(),
            kind: kind.into(),
            variation: variation.into(),
            level: None,
            position: None,
            tiles: SpatialSet::new(),
            tile_added: Signal::new(),
            tile_removed: Signal::new(),
            destroyed: Signal::new(),
        }
    }

    /// Unique identifier of this area.
    pub fn id(&self) -> AreaId {
        self.id
    }

    /// The type of area, as understood by factories.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The variation on the type.
    pub fn variation(&self) -> &str {
        &self.variation
    }

    /// The level currently holding this area, if any.
    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    /// Where this area sits in its level, once added to one.
    pub fn position(&self) -> Option<Position2D> {
        self.position
    }

    /// Signal raised after a tile joins this area.
    pub fn tile_added(&self) -> &Signal<TileId> {
        &self.tile_added
    }

    /// Signal raised after a tile leaves this area.
    pub fn tile_removed(&self) -> &Signal<TileId> {
        &self.tile_removed
    }

    /// Signal raised when this area is destroyed, after any cascaded
    /// tile destruction.
    pub fn destroyed(&self) -> &Signal<AreaId> {
        &self.destroyed
    }

    /// Add a tile at the given position, pointing its upward link and
    /// position here.
    ///
    /// Fails if the tile is already a member or the cell is occupied;
    /// nothing changes in that case. Emits [`tile_added`] on success.
    ///
    /// [`tile_added`]: Area::tile_added
    pub fn add_tile(&mut self, mut tile: Tile, position: Position2D) -> WorldResult<TileId> {
        let id = tile.id();
        if self.tiles.contains(id) {
            return Err(WorldError::DuplicateMember { id: id.to_string() });
        }
        if self.tiles.at(position).is_some() {
            return Err(WorldError::PositionOccupied(position));
        }
        tile.set_position(self.id, position);
        self.tiles.add(tile, position)?;
        self.tile_added.emit(&id);
        Ok(id)
    }

    /// Remove and return a tile, clearing its upward link and
    /// position. Emits [`tile_removed`] only when something was
    /// removed.
    ///
    /// [`tile_removed`]: Area::tile_removed
    pub fn remove_tile(&mut self, id: TileId) -> Option<Tile> {
        let mut tile = self.tiles.remove(id)?;
        tile.clear_position();
        self.tile_removed.emit(&id);
        Some(tile)
    }

    /// Remove a tile and destroy it, cascading into its entities when
    /// `propagate` is set. Returns whether the tile was present.
    ///
    /// Event order matches a cascaded destroy: the tile's entity
    /// events first, then [`tile_removed`], then the tile's own
    /// destroyed signal last.
    ///
    /// [`tile_removed`]: Area::tile_removed
    pub fn destroy_tile(&mut self, id: TileId, propagate: bool) -> bool {
        let Some(mut tile) = self.tiles.remove(id) else {
            return false;
        };
        tile.clear_position();
        tile.destroy_contents(propagate);
        self.tile_removed.emit(&id);
        tile.raise_destroyed();
        true
    }

    /// Destroy a detached area, cascading into its tiles when
    /// `propagate` is set.
    pub fn destroy(mut self, propagate: bool) {
        self.destroy_contents(propagate);
        self.raise_destroyed();
    }

    /// Destroy the area's tiles in reverse insertion order, each with
    /// propagation, emitting removal before each tile's destroyed
    /// signal.
    pub(crate) fn destroy_contents(&mut self, propagate: bool) {
        if !propagate {
            return;
        }
        while let Some(mut tile) = self.tiles.pop_last() {
            let id = tile.id();
            tile.clear_position();
            tile.destroy_contents(true);
            self.tile_removed.emit(&id);
            tile.raise_destroyed();
        }
    }

    pub(crate) fn raise_destroyed(&self) {
        self.destroyed.emit(&self.id);
    }

    pub(crate) fn set_position(&mut self, level: LevelId, position: Position2D) {
        self.level = Some(level);
        self.position = Some(position);
    }

    pub(crate) fn clear_position(&mut self) {
        self.level = None;
        self.position = None;
    }

    /// Borrow the tile occupying the given cell, if any.
    pub fn at(&self, position: Position2D) -> Option<&Tile> {
        self.tiles.at(position)
    }

    /// Borrow a tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// Mutably borrow a tile by id.
    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// Return `true` if the tile is a member of this area.
    pub fn contains_tile(&self, id: TileId) -> bool {
        self.tiles.contains(id)
    }

    /// All tiles in the Moore neighborhood of the given tile's cell.
    /// Fails when the id is not a member of this area; an isolated
    /// tile yields an empty vector.
    pub fn neighbors(&self, id: TileId) -> WorldResult<Vec<&Tile>> {
        self.tiles.neighbors(id)
    }

    /// Iterate over the tiles in insertion order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Number of tiles in this area.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

impl Member for Area {
    type Id = AreaId;

    fn key(&self) -> AreaId {
        self.id
    }
}
