use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{WorldError, WorldResult};
use crate::position::{MOORE_OFFSETS, Position2D};

/// A child that can live in one of the hierarchy's containers.
///
/// Membership is identity-based: two children are the same member
/// exactly when their keys are equal.
pub trait Member {
    /// The id type identifying this child.
    type Id: Copy + Eq + Hash + fmt::Display;

    /// The id of this child.
    fn key(&self) -> Self::Id;
}

/// Ordered, identity-unique set of owned children.
///
/// This is the membership core shared by every level of the hierarchy:
/// [`Level`] holds areas, [`Area`] holds tiles, and [`Tile`] holds
/// entities. Children keep their insertion order, and a key can be
/// present at most once.
///
/// [`Level`]: crate::level::Level
/// [`Area`]: crate::area::Area
/// [`Tile`]: crate::tile::Tile
#[derive(Debug)]
pub struct MemberSet<C: Member> {
    members: Vec<C>,
}

impl<C: Member> Default for MemberSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Member> MemberSet<C> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Insert a child, failing if its key is already present. The
    /// set is unchanged on failure.
    pub fn add(&mut self, child: C) -> WorldResult<()> {
        let id = child.key();
        if self.contains(id) {
            return Err(WorldError::DuplicateMember { id: id.to_string() });
        }
        self.members.push(child);
        Ok(())
    }

    /// Remove and return the child with the given key, if present.
    pub fn remove(&mut self, id: C::Id) -> Option<C> {
        let index = self.members.iter().position(|child| child.key() == id)?;
        Some(self.members.remove(index))
    }

    /// Remove and return the most recently inserted child. Draining
    /// with this walks the set in reverse insertion order, which keeps
    /// in-place removal safe during cascading destroys.
    pub fn pop_last(&mut self) -> Option<C> {
        self.members.pop()
    }

    /// Return `true` if a child with the given key is a member.
    pub fn contains(&self, id: C::Id) -> bool {
        self.members.iter().any(|child| child.key() == id)
    }

    /// Borrow the child with the given key.
    pub fn get(&self, id: C::Id) -> Option<&C> {
        self.members.iter().find(|child| child.key() == id)
    }

    /// Mutably borrow the child with the given key.
    pub fn get_mut(&mut self, id: C::Id) -> Option<&mut C> {
        self.members.iter_mut().find(|child| child.key() == id)
    }

    /// Iterate over the children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.members.iter()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Return `true` if the set holds no children.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A [`MemberSet`] extended with a position index.
///
/// Each child occupies exactly one cell, and each cell holds at most
/// one child, so lookups by position are unambiguous. The index also
/// answers Moore-neighborhood queries.
#[derive(Debug)]
pub struct SpatialSet<C: Member> {
    members: MemberSet<C>,
    by_position: HashMap<Position2D, C::Id>,
    position_of: HashMap<C::Id, Position2D>,
}

impl<C: Member> Default for SpatialSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Member> SpatialSet<C> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            members: MemberSet::new(),
            by_position: HashMap::new(),
            position_of: HashMap::new(),
        }
    }

    /// Insert a child at the given position.
    ///
    /// Fails if the key is already a member or the cell is occupied;
    /// both checks run before anything is mutated.
    pub fn add(&mut self, child: C, position: Position2D) -> WorldResult<()> {
        let id = child.key();
        if self.members.contains(id) {
            return Err(WorldError::DuplicateMember { id: id.to_string() });
        }
        if self.by_position.contains_key(&position) {
            return Err(WorldError::PositionOccupied(position));
        }
        self.members.add(child)?;
        self.by_position.insert(position, id);
        self.position_of.insert(id, position);
        Ok(())
    }

    /// Remove and return the child with the given key, dropping its
    /// index entries.
    pub fn remove(&mut self, id: C::Id) -> Option<C> {
        let child = self.members.remove(id)?;
        if let Some(position) = self.position_of.remove(&id) {
            self.by_position.remove(&position);
        }
        Some(child)
    }

    /// Remove and return the most recently inserted child, dropping
    /// its index entries.
    pub fn pop_last(&mut self) -> Option<C> {
        let child = self.members.pop_last()?;
        if let Some(position) = self.position_of.remove(&child.key()) {
            self.by_position.remove(&position);
        }
        Some(child)
    }

    /// Borrow the child occupying the given cell, if any.
    pub fn at(&self, position: Position2D) -> Option<&C> {
        let id = self.by_position.get(&position)?;
        self.members.get(*id)
    }

    /// The cell occupied by the child with the given key.
    pub fn position_of(&self, id: C::Id) -> Option<Position2D> {
        self.position_of.get(&id).copied()
    }

    /// All members occupying the Moore neighborhood of the given
    /// child's cell.
    ///
    /// Fails when the id is not a member. An isolated member yields an
    /// empty vector, never an error.
    pub fn neighbors(&self, id: C::Id) -> WorldResult<Vec<&C>> {
        let center = self
            .position_of(id)
            .ok_or_else(|| WorldError::NotAMember { id: id.to_string() })?;

        let mut found = Vec::new();
        for (dx, dy) in MOORE_OFFSETS {
            if let Some(neighbor) = self.at(center.offset(dx, dy)) {
                found.push(neighbor);
            }
        }
        Ok(found)
    }

    /// Return `true` if a child with the given key is a member.
    pub fn contains(&self, id: C::Id) -> bool {
        self.members.contains(id)
    }

    /// Borrow the child with the given key.
    pub fn get(&self, id: C::Id) -> Option<&C> {
        self.members.get(id)
    }

    /// Mutably borrow the child with the given key.
    pub fn get_mut(&mut self, id: C::Id) -> Option<&mut C> {
        self.members.get_mut(id)
    }

    /// Iterate over the children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.members.iter()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Return `true` if the set holds no children.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
