use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::area::{Area, AreaId};
use crate::container::SpatialSet;
use crate::error::{WorldError, WorldResult};
use crate::position::Position2D;
use crate::signal::Signal;
use crate::tile::{Tile, TileId};

/// Unique identifier for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId(pub Uuid);

impl LevelId {
    /// Generate a new random level ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The root of the spatial hierarchy, holding positioned areas.
///
/// A level is not itself positioned; everything below it is. Areas are
/// indexed by position, one per cell.
#[derive(Debug)]
pub struct Level {
    id: LevelId,
    areas: SpatialSet<Area>,
    area_added: Signal<AreaId>,
    area_removed: Signal<AreaId>,
    destroyed: Signal<LevelId>,
    created_at: DateTime<Utc>,
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    /// Create an empty level.
    pub fn new() -> Self {
        Self {
            id: LevelId::new(),
            areas: SpatialSet::new(),
            area_added: Signal::new(),
            area_removed: Signal::new(),
            destroyed: Signal::new(),
            created_at: Utc::now(),
        }
    }

    /// Unique identifier of this level.
    pub fn id(&self) -> LevelId {
        self.id
    }

    /// When the level was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Signal raised after an area joins this level.
    pub fn area_added(&self) -> &Signal<AreaId> {
        &self.area_added
    }

    /// Signal raised after an area leaves this level.
    pub fn area_removed(&self) -> &Signal<AreaId> {
        &self.area_removed
    }

    /// Signal raised when this level is destroyed, after any cascaded
    /// area destruction.
    pub fn destroyed(&self) -> &Signal<LevelId> {
        &self.destroyed
    }

    /// Add an area at the given position, pointing its upward link and
    /// position here.
    ///
    /// Fails if the area is already a member or the cell is occupied;
    /// nothing changes in that case. Emits [`area_added`] on success.
    ///
    /// [`area_added`]: Level::area_added
    pub fn add_area(&mut self, mut area: Area, position: Position2D) -> WorldResult<AreaId> {
        let id = area.id();
        if self.areas.contains(id) {
            return Err(WorldError::DuplicateMember { id: id.to_string() });
        }
        if self.areas.at(position).is_some() {
            return Err(WorldError::PositionOccupied(position));
        }
        area.set_position(self.id, position);
        self.areas.add(area, position)?;
        self.area_added.emit(&id);
        Ok(id)
    }

    /// Remove and return an area, clearing its upward link and
    /// position. Emits [`area_removed`] only when something was
    /// removed.
    ///
    /// [`area_removed`]: Level::area_removed
    pub fn remove_area(&mut self, id: AreaId) -> Option<Area> {
        let mut area = self.areas.remove(id)?;
        area.clear_position();
        self.area_removed.emit(&id);
        Some(area)
    }

    /// Remove an area and destroy it, cascading into its tiles when
    /// `propagate` is set. Returns whether the area was present.
    pub fn destroy_area(&mut self, id: AreaId, propagate: bool) -> bool {
        let Some(mut area) = self.areas.remove(id) else {
            return false;
        };
        area.clear_position();
        area.destroy_contents(propagate);
        self.area_removed.emit(&id);
        area.raise_destroyed();
        true
    }

    /// Destroy the level, cascading into its areas when `propagate`
    /// is set. The level's own destroyed signal comes last.
    pub fn destroy(mut self, propagate: bool) {
        if propagate {
            while let Some(mut area) = self.areas.pop_last() {
                let id = area.id();
                area.clear_position();
                area.destroy_contents(true);
                self.area_removed.emit(&id);
                area.raise_destroyed();
            }
        }
        self.destroyed.emit(&self.id);
    }

    /// Borrow the area occupying the given cell, if any.
    pub fn at(&self, position: Position2D) -> Option<&Area> {
        self.areas.at(position)
    }

    /// Borrow an area by id.
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(id)
    }

    /// Mutably borrow an area by id.
    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.get_mut(id)
    }

    /// Return `true` if the area is a member of this level.
    pub fn contains_area(&self, id: AreaId) -> bool {
        self.areas.contains(id)
    }

    /// All areas in the Moore neighborhood of the given area's cell.
    /// Fails when the id is not a member of this level; an isolated
    /// area yields an empty vector.
    pub fn neighbors(&self, id: AreaId) -> WorldResult<Vec<&Area>> {
        self.areas.neighbors(id)
    }

    /// Iterate over the areas in insertion order.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    /// Number of areas in this level.
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Find the tile with the given id anywhere in this level,
    /// together with the area holding it.
    pub fn find_tile(&self, id: TileId) -> Option<(&Area, &Tile)> {
        self.areas
            .iter()
            .find_map(|area| area.tile(id).map(|tile| (area, tile)))
    }
}
