//! Core types for Kachelwerk.
//!
//! The crate models a spatial hierarchy for tile-based worlds. A
//! [`Level`] holds positioned [`Area`]s, an area holds positioned
//! [`Tile`]s, and a tile holds [`Entity`] occupants. Each container
//! owns its children and raises [`Signal`]s when membership changes
//! or a member is destroyed.
//!
//! Movable entities carry the [`Movement`] capability and announce
//! their tile changes on a shared [`ChangeBus`], which downstream
//! pipelines subscribe to once instead of per entity.

/// Positioned groups of tiles.
pub mod area;
/// Tile-change phases, the shared event bus, and the movement
/// capability.
pub mod change;
/// The membership and position-index containers shared by the
/// hierarchy.
pub mod container;
/// Factory traits for building areas, tiles, and entities.
pub mod creation;
/// Tile occupants.
pub mod entity;
/// Error types.
pub mod error;
/// The root of the hierarchy.
pub mod level;
/// Grid coordinates and the Moore neighborhood.
pub mod position;
/// Single-threaded observer signals.
pub mod signal;
/// Grid cells holding entities.
pub mod tile;

pub use area::{Area, AreaId};
pub use change::{ChangeBus, ChangePhase, Movement, TileChangeEvent, TileChangedArgs};
pub use container::{Member, MemberSet, SpatialSet};
pub use creation::{AreaFactory, EntityFactory, PropertyMap, TileFactory};
pub use entity::{Entity, EntityId};
pub use error::{WorldError, WorldResult};
pub use level::{Level, LevelId};
pub use position::Position2D;
pub use signal::{Signal, SubscriptionId};
pub use tile::{Tile, TileId};
