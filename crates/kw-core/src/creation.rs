use std::collections::HashMap;

use serde_json::Value;

use crate::area::Area;
use crate::change::ChangeBus;
use crate::entity::Entity;
use crate::tile::Tile;

/// Free-form construction properties, keyed by name.
///
/// Factories decide which keys they honor; unknown keys are ignored
/// rather than rejected.
pub type PropertyMap = HashMap<String, Value>;

/// Builds areas from a type, variation, and properties.
pub trait AreaFactory {
    /// Create a detached area of the given type and variation.
    fn create_area(&self, kind: &str, variation: &str, properties: &PropertyMap) -> Area;
}

/// Builds tiles from a type, variation, and properties.
pub trait TileFactory {
    /// Create a detached tile of the given type and variation.
    fn create_tile(&self, kind: &str, variation: &str, properties: &PropertyMap) -> Tile;
}

/// Builds entities from a type, variation, and properties.
///
/// The bus is passed so a factory can grant the movement capability
/// where the type calls for it; stationary types ignore it.
pub trait EntityFactory {
    /// Create a detached entity of the given type and variation.
    fn create_entity(
        &self,
        bus: &ChangeBus,
        kind: &str,
        variation: &str,
        properties: &PropertyMap,
    ) -> Entity;
}
