//! Persisted world format and one-shot hydration into a [`World`].
//!
//! A [`WorldDefinition`] is plain serde data (YAML or JSON): locations with
//! their passages, item blueprints, item instances with their placement,
//! and actor templates. [`WorldDefinition::hydrate`] validates every
//! reference and builds the derived location indexes.
//!
//! [`starter_world`] returns the small four-room map used by the engine
//! binary when no definition file is configured, and by tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use skald_types::{
    Actor, ActorId, Attributes, BlueprintId, Goal, HungerStage, ItemBlueprint, ItemId, ItemInstance,
    LocationId, LocationStatic, MemoryEntry, Mind, PassageStatus, Placement, Proficiency, ShortTermMemory,
};
use tracing::debug;

use crate::error::WorldError;
use crate::location::LocationState;
use crate::world::World;

/// Slots an actor gets when the definition declares none.
pub const DEFAULT_SLOTS: [&str; 3] = ["main_hand", "off_hand", "body"];

/// A passage leading out of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDef {
    /// The neighbouring location.
    pub to: LocationId,
    /// Initial status.
    #[serde(default)]
    pub status: PassageStatus,
}

/// A location template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDef {
    /// Location key.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Description shown on `look`.
    #[serde(default)]
    pub description: String,
    /// Passages. Declaring one side is enough; the other is mirrored.
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

/// An item instance template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Instance key.
    pub id: ItemId,
    /// Blueprint key.
    pub blueprint: BlueprintId,
    /// Where the item starts.
    pub placement: Placement,
    /// Initial state flags.
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Descriptive tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// An actor template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDef {
    /// Actor key.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Whether a human drives this actor.
    #[serde(default)]
    pub is_player: bool,
    /// Starting location.
    pub location: LocationId,
    /// Ability scores.
    #[serde(default)]
    pub attributes: Attributes,
    /// Trained skills.
    #[serde(default)]
    pub skills: BTreeMap<String, Proficiency>,
    /// Starting hit points; defaults to the constitution-derived maximum.
    #[serde(default)]
    pub hp: Option<u32>,
    /// Declared equipment slots; defaults to [`DEFAULT_SLOTS`].
    #[serde(default)]
    pub slots: Vec<String>,
    /// Items (held by this actor) to start equipped, by slot.
    #[serde(default)]
    pub equipment: BTreeMap<String, ItemId>,
    /// Locations known at start, in addition to the starting location.
    #[serde(default)]
    pub known_locations: BTreeSet<LocationId>,
    /// Starting memories, goals, and relationships.
    #[serde(default)]
    pub mind: Mind,
}

/// Static entity definitions from which the initial world is hydrated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDefinition {
    /// Seed for deterministic rolls.
    #[serde(default)]
    pub seed: u64,
    /// Locations.
    pub locations: Vec<LocationDef>,
    /// Item blueprints.
    #[serde(default)]
    pub blueprints: Vec<ItemBlueprint>,
    /// Item instances.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Actors in creation order.
    #[serde(default)]
    pub actors: Vec<ActorDef>,
}

/// Knobs applied while hydrating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrationOptions {
    /// Short-term memory capacity for every actor.
    pub memory_capacity: usize,
    /// Whether starvation starts enabled.
    pub starvation_enabled: bool,
}

impl Default for HydrationOptions {
    fn default() -> Self {
        Self {
            memory_capacity: skald_types::DEFAULT_MEMORY_CAPACITY,
            starvation_enabled: true,
        }
    }
}

impl WorldDefinition {
    /// Load a definition from a YAML (or JSON) file.
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a definition from a YAML (or JSON) string.
    pub fn parse(yaml: &str) -> Result<Self, WorldError> {
        let definition: Self = serde_yml::from_str(yaml)?;
        Ok(definition)
    }

    /// Build the initial world, validating every reference.
    pub fn hydrate(&self, options: HydrationOptions) -> Result<World, WorldError> {
        let mut world = World {
            seed: self.seed,
            locations: BTreeMap::new(),
            actors: BTreeMap::new(),
            roster: Vec::new(),
            blueprints: BTreeMap::new(),
            items: BTreeMap::new(),
            starvation_enabled: options.starvation_enabled,
        };

        for def in &self.locations {
            let state = LocationState::new(LocationStatic {
                id: def.id.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
            });
            if world.locations.insert(def.id.clone(), state).is_some() {
                return Err(duplicate("location", &def.id));
            }
        }
        self.hydrate_passages(&mut world)?;

        for blueprint in &self.blueprints {
            if world
                .blueprints
                .insert(blueprint.id.clone(), blueprint.clone())
                .is_some()
            {
                return Err(duplicate("blueprint", &blueprint.id));
            }
        }

        for def in &self.actors {
            if !world.locations.contains_key(&def.location) {
                return Err(WorldError::LocationNotFound(def.location.clone()));
            }
            if let Some(unknown) = def
                .known_locations
                .iter()
                .find(|id| !world.locations.contains_key(*id))
            {
                return Err(WorldError::LocationNotFound(unknown.clone()));
            }
            let actor = build_actor(def, options.memory_capacity);
            if world.actors.insert(def.id.clone(), actor).is_some() {
                return Err(duplicate("actor", &def.id));
            }
            world.roster.push(def.id.clone());
            if let Some(loc) = world.locations.get_mut(&def.location) {
                loc.add_occupant(def.id.clone());
            }
        }

        for def in &self.items {
            if !world.blueprints.contains_key(&def.blueprint) {
                return Err(WorldError::BlueprintNotFound(def.blueprint.clone()));
            }
            match &def.placement {
                Placement::AtLocation(loc_id) => {
                    let loc = world
                        .locations
                        .get_mut(loc_id)
                        .ok_or_else(|| WorldError::LocationNotFound(loc_id.clone()))?;
                    loc.add_item(def.id.clone());
                }
                Placement::HeldBy(holder) => {
                    let actor = world
                        .actors
                        .get_mut(holder)
                        .ok_or_else(|| WorldError::ActorNotFound(holder.clone()))?;
                    actor.inventory.insert(def.id.clone());
                }
            }
            let instance = ItemInstance {
                id: def.id.clone(),
                blueprint: def.blueprint.clone(),
                placement: def.placement.clone(),
                flags: def.flags.clone(),
                tags: def.tags.clone(),
            };
            if world.items.insert(def.id.clone(), instance).is_some() {
                return Err(duplicate("item", &def.id));
            }
        }

        for def in &self.actors {
            for (slot, item) in &def.equipment {
                equip_at_start(&mut world, &def.id, slot, item)?;
            }
        }

        world.check_invariants()?;
        debug!(
            locations = world.locations.len(),
            actors = world.roster.len(),
            items = world.items.len(),
            "World hydrated"
        );
        Ok(world)
    }

    /// Record every passage at both ends, rejecting conflicting statuses.
    fn hydrate_passages(&self, world: &mut World) -> Result<(), WorldError> {
        let mut passages: BTreeMap<(LocationId, LocationId), PassageStatus> = BTreeMap::new();
        for def in &self.locations {
            for conn in &def.connections {
                if !world.locations.contains_key(&conn.to) {
                    return Err(WorldError::LocationNotFound(conn.to.clone()));
                }
                for key in [
                    (def.id.clone(), conn.to.clone()),
                    (conn.to.clone(), def.id.clone()),
                ] {
                    match passages.get(&key) {
                        Some(existing) if *existing != conn.status => {
                            return Err(WorldError::PassageMismatch {
                                from: def.id.clone(),
                                to: conn.to.clone(),
                            });
                        }
                        _ => {
                            passages.insert(key, conn.status);
                        }
                    }
                }
            }
        }
        for ((from, to), status) in passages {
            if let Some(loc) = world.locations.get_mut(&from) {
                loc.set_passage(to, status);
            }
        }
        Ok(())
    }
}

fn duplicate(kind: &'static str, id: &impl ToString) -> WorldError {
    WorldError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

fn build_actor(def: &ActorDef, memory_capacity: usize) -> Actor {
    let slots: Vec<String> = if def.slots.is_empty() {
        DEFAULT_SLOTS.iter().map(|slot| (*slot).to_owned()).collect()
    } else {
        def.slots.clone()
    };
    let mut known_locations = def.known_locations.clone();
    known_locations.insert(def.location.clone());

    Actor {
        id: def.id.clone(),
        name: def.name.clone(),
        is_player: def.is_player,
        location: def.location.clone(),
        attributes: def.attributes,
        skills: def.skills.clone(),
        hp: def.hp.unwrap_or_else(|| def.attributes.max_hp()),
        slots: slots.into_iter().map(|slot| (slot, None)).collect(),
        inventory: BTreeSet::new(),
        next_available_tick: 0,
        last_meal_tick: 0,
        hunger_stage: HungerStage::Sated,
        alive: true,
        memory: ShortTermMemory::with_capacity(memory_capacity),
        known_locations,
        mind: def.mind.clone(),
    }
}

fn equip_at_start(
    world: &mut World,
    actor_id: &ActorId,
    slot: &str,
    item: &ItemId,
) -> Result<(), WorldError> {
    let invalid = || WorldError::InvalidEquipment {
        actor: actor_id.clone(),
        item: item.clone(),
        slot: slot.to_owned(),
    };
    let actor = world
        .actors
        .get_mut(actor_id)
        .ok_or_else(|| WorldError::ActorNotFound(actor_id.clone()))?;
    if !actor.inventory.contains(item) {
        return Err(invalid());
    }
    let Some(occupant) = actor.slots.get_mut(slot) else {
        return Err(invalid());
    };
    if occupant.is_some() {
        return Err(invalid());
    }
    *occupant = Some(item.clone());
    actor.inventory.remove(item);
    Ok(())
}

// ---------------------------------------------------------------------------
// Starter world
// ---------------------------------------------------------------------------

/// Location keys of the starter world.
pub mod starter {
    /// The Prancing Pony tavern, where the adventure begins.
    pub const TAVERN: &str = "tavern";
    /// Cellar below the tavern, behind a closed trapdoor.
    pub const CELLAR: &str = "cellar";
    /// Muddy street outside the tavern.
    pub const STREET: &str = "street";
    /// Narrow alley off the street.
    pub const ALLEY: &str = "alley";

    /// The player character.
    pub const HERO: &str = "hero";
    /// Tavern keeper.
    pub const BARKEEP: &str = "barkeep";
    /// Town guard on the street.
    pub const GUARD: &str = "guard";
    /// A rat living in the cellar.
    pub const RAT: &str = "rat";
}

fn location(id: &str, name: &str, description: &str, connections: &[(&str, PassageStatus)]) -> LocationDef {
    LocationDef {
        id: LocationId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        connections: connections
            .iter()
            .map(|(to, status)| ConnectionDef {
                to: LocationId::new(*to),
                status: *status,
            })
            .collect(),
    }
}

fn blueprint(id: &str, name: &str, properties: &[&str]) -> ItemBlueprint {
    ItemBlueprint {
        id: BlueprintId::new(id),
        name: name.to_owned(),
        description: String::new(),
        weight: 1,
        damage_dice: None,
        damage_type: None,
        armour_rating: 0,
        skill_tag: None,
        properties: properties.iter().map(|p| (*p).to_owned()).collect(),
    }
}

fn weapon(id: &str, name: &str, dice: &str, damage_type: &str, skill: &str, properties: &[&str]) -> ItemBlueprint {
    ItemBlueprint {
        damage_dice: Some(dice.to_owned()),
        damage_type: Some(damage_type.to_owned()),
        skill_tag: Some(skill.to_owned()),
        ..blueprint(id, name, properties)
    }
}

fn item(id: &str, blueprint: &str, placement: Placement) -> ItemDef {
    ItemDef {
        id: ItemId::new(id),
        blueprint: BlueprintId::new(blueprint),
        placement,
        flags: BTreeSet::new(),
        tags: BTreeSet::new(),
    }
}

fn actor(id: &str, name: &str, location: &str) -> ActorDef {
    ActorDef {
        id: ActorId::new(id),
        name: name.to_owned(),
        is_player: false,
        location: LocationId::new(location),
        attributes: Attributes::default(),
        skills: BTreeMap::new(),
        hp: None,
        slots: Vec::new(),
        equipment: BTreeMap::new(),
        known_locations: BTreeSet::new(),
        mind: Mind::default(),
    }
}

/// The default four-location map.
///
/// Tavern and street are joined by an open door, tavern and cellar by a
/// closed trapdoor, street and alley by an open archway. The hero and the
/// barkeep start in the tavern, the guard on the street, a rat in the
/// cellar.
pub fn starter_world() -> WorldDefinition {
    use starter::{ALLEY, BARKEEP, CELLAR, GUARD, HERO, RAT, STREET, TAVERN};
    use PassageStatus::{Closed, Open};

    let locations = vec![
        location(
            TAVERN,
            "The Prancing Pony",
            "A smoky common room. A trapdoor in the floor leads down; the front door opens onto the street.",
            &[(STREET, Open), (CELLAR, Closed)],
        ),
        location(CELLAR, "Cellar", "Damp stone, barrels, and something scratching.", &[]),
        location(
            STREET,
            "Market Street",
            "Mud and cart ruts. An archway leads into a narrow alley.",
            &[(ALLEY, Open)],
        ),
        location(ALLEY, "Back Alley", "Dark, narrow, and smelling of rot.", &[]),
    ];

    let mut leather = blueprint("leather_armour", "leather armour", &[]);
    leather.armour_rating = 1;
    let blueprints = vec![
        weapon("dagger", "dagger", "1d4", "piercing", "light_blades", &["finesse"]),
        weapon("short_sword", "short sword", "1d6", "slashing", "blades", &[]),
        weapon("teeth", "teeth", "1d3", "piercing", "unarmed_combat", &["finesse"]),
        leather,
        blueprint("bread", "loaf of bread", &["food"]),
        blueprint("apple", "apple", &["food"]),
        blueprint("torch", "torch", &[]),
    ];

    let items = vec![
        item("dagger-1", "dagger", Placement::HeldBy(ActorId::new(HERO))),
        item("bread-1", "bread", Placement::HeldBy(ActorId::new(HERO))),
        item("apple-1", "apple", Placement::AtLocation(LocationId::new(TAVERN))),
        item("torch-1", "torch", Placement::AtLocation(LocationId::new(TAVERN))),
        item("sword-1", "short_sword", Placement::HeldBy(ActorId::new(GUARD))),
        item("armour-1", "leather_armour", Placement::HeldBy(ActorId::new(GUARD))),
        item("teeth-1", "teeth", Placement::HeldBy(ActorId::new(RAT))),
        item("bread-2", "bread", Placement::AtLocation(LocationId::new(CELLAR))),
    ];

    let mut hero = actor(HERO, "Hero", TAVERN);
    hero.is_player = true;
    hero.attributes.dexterity = 14;
    hero.skills.insert("light_blades".to_owned(), Proficiency::Proficient);
    hero.known_locations.insert(LocationId::new(STREET));

    let mut barkeep = actor(BARKEEP, "Barliman", TAVERN);
    barkeep.known_locations = [CELLAR, STREET].into_iter().map(LocationId::new).collect();
    barkeep
        .mind
        .remember_core(MemoryEntry::new("Rats have been at the flour in the cellar.", 0));
    barkeep.mind.adopt(Goal::new("Keep the peace in the common room", "note"));

    let mut guard = actor(GUARD, "Town Guard", STREET);
    guard.attributes.strength = 14;
    guard.skills.insert("blades".to_owned(), Proficiency::Expert);
    guard.equipment.insert("main_hand".to_owned(), ItemId::new("sword-1"));
    guard.equipment.insert("body".to_owned(), ItemId::new("armour-1"));
    guard.known_locations.insert(LocationId::new(TAVERN));

    let mut rat = actor(RAT, "Rat", CELLAR);
    rat.attributes = Attributes {
        strength: 4,
        dexterity: 14,
        constitution: 2,
    };
    rat.slots = vec!["main_hand".to_owned()];
    rat.equipment.insert("main_hand".to_owned(), ItemId::new("teeth-1"));

    WorldDefinition {
        seed: 42,
        locations,
        blueprints,
        items,
        actors: vec![hero, barkeep, guard, rat],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn starter_world_hydrates() {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        assert_eq!(world.actors().count(), 4);
        assert_eq!(world.creation_rank(&ActorId::new(starter::GUARD)), Some(2));
        let tavern = world.location(&LocationId::new(starter::TAVERN)).unwrap();
        assert!(tavern.contains_actor(&ActorId::new(starter::HERO)));
        assert!(tavern.contains_item(&ItemId::new("apple-1")));
    }

    #[test]
    fn passages_are_mirrored() {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        let cellar = LocationId::new(starter::CELLAR);
        let tavern = LocationId::new(starter::TAVERN);
        assert_eq!(world.passage(&cellar, &tavern), Some(PassageStatus::Closed));
        assert_eq!(world.passage(&tavern, &cellar), Some(PassageStatus::Closed));
    }

    #[test]
    fn starting_equipment_is_slotted() {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        let guard = world.actor(&ActorId::new(starter::GUARD)).unwrap();
        assert_eq!(guard.equipped_slot(&ItemId::new("sword-1")), Some("main_hand"));
        assert!(guard.inventory.is_empty());
    }

    #[test]
    fn start_location_is_known() {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        let rat = world.actor(&ActorId::new(starter::RAT)).unwrap();
        assert!(rat.known_locations.contains(&LocationId::new(starter::CELLAR)));
    }

    #[test]
    fn rejects_dangling_references() {
        let mut def = starter_world();
        def.actors[0].location = LocationId::new("moon");
        assert!(matches!(
            def.hydrate(HydrationOptions::default()),
            Err(WorldError::LocationNotFound(_))
        ));
    }

    #[test]
    fn rejects_conflicting_passages() {
        let mut def = starter_world();
        def.locations[1].connections.push(ConnectionDef {
            to: LocationId::new(starter::TAVERN),
            status: PassageStatus::Open,
        });
        assert!(matches!(
            def.hydrate(HydrationOptions::default()),
            Err(WorldError::PassageMismatch { .. })
        ));
    }

    #[test]
    fn parses_yaml() {
        let yaml = r"
seed: 7
locations:
  - id: hall
    name: Hall
    connections:
      - to: yard
        status: closed
  - id: yard
    name: Yard
actors:
  - id: ann
    name: Ann
    location: hall
";
        let world = WorldDefinition::parse(yaml)
            .unwrap()
            .hydrate(HydrationOptions::default())
            .unwrap();
        assert_eq!(world.seed(), 7);
        assert_eq!(
            world.passage(&LocationId::new("yard"), &LocationId::new("hall")),
            Some(PassageStatus::Closed)
        );
    }
}
