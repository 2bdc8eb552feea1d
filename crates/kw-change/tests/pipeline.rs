//! End-to-end run of the tile-change pipeline over a small world.

use std::cell::RefCell;
use std::rc::Rc;

use kw_change::{Creator, CreatorId, EntityCreatedArgs, Solver, TileChangeManager, share};
use kw_core::area::Area;
use kw_core::change::{ChangeBus, ChangePhase, TileChangedArgs};
use kw_core::creation::{EntityFactory, PropertyMap};
use kw_core::entity::{Entity, EntityId};
use kw_core::level::Level;
use kw_core::position::Position2D;
use kw_core::signal::Signal;
use kw_core::tile::{Tile, TileId};

/// A factory that doubles as a creator, announcing what it builds.
struct Spawner {
    id: CreatorId,
    created: Signal<EntityCreatedArgs>,
}

impl Spawner {
    fn new() -> Self {
        Self {
            id: CreatorId::new(),
            created: Signal::new(),
        }
    }
}

impl EntityFactory for Spawner {
    fn create_entity(
        &self,
        bus: &ChangeBus,
        kind: &str,
        variation: &str,
        properties: &PropertyMap,
    ) -> Entity {
        let movable = properties
            .get("movable")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let entity = if movable {
            Entity::with_movement(bus, kind, variation)
        } else {
            Entity::new(kind, variation)
        };
        self.created.emit(&EntityCreatedArgs {
            entity: entity.id(),
            movable,
        });
        entity
    }
}

impl Creator for Spawner {
    fn id(&self) -> CreatorId {
        self.id
    }

    fn entity_created(&self) -> &Signal<EntityCreatedArgs> {
        &self.created
    }
}

struct Recorder {
    log: Rc<RefCell<Vec<(EntityId, ChangePhase)>>>,
}

impl Solver for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn solve(&mut self, entity: EntityId, change: &TileChangedArgs) -> bool {
        self.log.borrow_mut().push((entity, change.phase));
        false
    }
}

fn pos(x: i32, y: i32) -> Position2D {
    Position2D::new(x, y)
}

fn movable_properties() -> PropertyMap {
    let mut properties = PropertyMap::new();
    properties.insert("movable".into(), serde_json::Value::Bool(true));
    properties
}

#[test]
fn a_tracked_entity_walks_one_tile_and_every_phase_is_solved() {
    let bus = ChangeBus::new();
    let manager = TileChangeManager::new(&bus);
    let spawner = Spawner::new();
    manager.register_entity_creator(&spawner).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    manager
        .add_solver(share(Recorder { log: Rc::clone(&log) }))
        .unwrap();

    let mut level = Level::new();
    let mut cavern = Area::new("cavern", "dark");
    let from = cavern.add_tile(Tile::new("floor", "stone"), pos(0, 0)).unwrap();
    let to = cavern.add_tile(Tile::new("floor", "stone"), pos(1, 0)).unwrap();
    let area_id = level.add_area(cavern, pos(2, 2)).unwrap();

    let scout = spawner.create_entity(&bus, "unit", "scout", &movable_properties());
    let scout_id = scout.id();
    assert!(manager.is_tracking(scout_id));

    let area = level.area_mut(area_id).unwrap();
    area.tile_mut(from).unwrap().add_entity(scout).unwrap();

    // An external driver walks the entity across: announce each
    // phase, then physically re-home it.
    {
        let tile = area.tile(from).unwrap();
        let movement = tile.entity(scout_id).unwrap().movement().unwrap().clone();
        movement.start_change_tile(from, to);
        movement.change_tile(from, to);
        movement.finish_change_tile(from, to);
    }
    let walker = area.tile_mut(from).unwrap().remove_entity(scout_id).unwrap();
    area.tile_mut(to).unwrap().add_entity(walker).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (scout_id, ChangePhase::Start),
            (scout_id, ChangePhase::Change),
            (scout_id, ChangePhase::Finish),
        ]
    );
    assert!(area.tile(to).unwrap().contains_entity(scout_id));
    assert_eq!(area.tile(from).unwrap().entity_count(), 0);
}

#[test]
fn stationary_entities_never_enter_the_pipeline() {
    let bus = ChangeBus::new();
    let manager = TileChangeManager::new(&bus);
    let spawner = Spawner::new();
    manager.register_entity_creator(&spawner).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    manager
        .add_solver(share(Recorder { log: Rc::clone(&log) }))
        .unwrap();

    let barrel = spawner.create_entity(&bus, "crate", "barrel", &PropertyMap::new());
    assert!(!barrel.is_movable());
    assert!(!manager.is_tracking(barrel.id()));
    assert_eq!(manager.tracked_count(), 0);
}

#[test]
fn destroying_a_tile_silences_its_walker() {
    let bus = ChangeBus::new();
    let manager = TileChangeManager::new(&bus);
    let spawner = Spawner::new();
    manager.register_entity_creator(&spawner).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    manager
        .add_solver(share(Recorder { log: Rc::clone(&log) }))
        .unwrap();

    let mut area = Area::new("cavern", "dark");
    let home = area.add_tile(Tile::new("floor", "stone"), pos(0, 0)).unwrap();
    let scout = spawner.create_entity(&bus, "unit", "scout", &movable_properties());
    let scout_id = scout.id();
    let movement = scout.movement().unwrap().clone();
    area.tile_mut(home).unwrap().add_entity(scout).unwrap();

    assert!(area.destroy_tile(home, true));
    assert!(!manager.is_tracking(scout_id));

    // A stale movement handle can still emit, but nothing listens to
    // the forgotten entity.
    movement.start_change_tile(home, TileId::new());
    assert!(log.borrow().is_empty());
}

#[test]
fn the_chain_stops_at_the_first_claiming_solver() {
    struct Claimer;
    impl Solver for Claimer {
        fn name(&self) -> &str {
            "claimer"
        }
        fn solve(&mut self, _entity: EntityId, _change: &TileChangedArgs) -> bool {
            true
        }
    }

    let bus = ChangeBus::new();
    let manager = TileChangeManager::new(&bus);
    let spawner = Spawner::new();
    manager.register_entity_creator(&spawner).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    manager.add_solver(share(Claimer)).unwrap();
    manager
        .add_solver(share(Recorder { log: Rc::clone(&log) }))
        .unwrap();

    let scout = spawner.create_entity(&bus, "unit", "scout", &movable_properties());
    let from = TileId::new();
    let to = TileId::new();
    scout.movement().unwrap().start_change_tile(from, to);

    assert!(log.borrow().is_empty());
}
