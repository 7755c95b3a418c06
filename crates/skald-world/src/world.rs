//! The world aggregate: every actor, location, and item in one owned value.
//!
//! Entities live in key-ordered arenas and refer to each other by id, so
//! there are no ownership cycles between actors, locations, and items.
//!
//! [`World`] exposes only shared (`&self`) accessors. Every write goes
//! through [`crate::mutation`], which is the sole module allowed to touch
//! the arenas mutably.

use std::collections::BTreeMap;

use skald_types::{
    Actor, ActorId, BlueprintId, ItemBlueprint, ItemId, ItemInstance, LocationId, PassageStatus,
    Placement,
};

use crate::error::WorldError;
use crate::location::LocationState;

/// The complete dynamic state of one adventure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub(crate) seed: u64,
    pub(crate) locations: BTreeMap<LocationId, LocationState>,
    pub(crate) actors: BTreeMap<ActorId, Actor>,
    /// Actor keys in creation order. Fixes the scheduler's tie-break.
    pub(crate) roster: Vec<ActorId>,
    pub(crate) blueprints: BTreeMap<BlueprintId, ItemBlueprint>,
    pub(crate) items: BTreeMap<ItemId, ItemInstance>,
    pub(crate) starvation_enabled: bool,
}

impl World {
    /// Seed for every deterministic roll made against this world.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether hunger progresses and starving actors take damage.
    pub const fn starvation_enabled(&self) -> bool {
        self.starvation_enabled
    }

    /// Look up an actor.
    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Every actor, in creation order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.roster.iter().filter_map(|id| self.actors.get(id))
    }

    /// Position of `id` in creation order.
    pub fn creation_rank(&self, id: &ActorId) -> Option<usize> {
        self.roster.iter().position(|known| known == id)
    }

    /// Look up a location.
    pub fn location(&self, id: &LocationId) -> Option<&LocationState> {
        self.locations.get(id)
    }

    /// Every location, in key order.
    pub fn locations(&self) -> impl Iterator<Item = &LocationState> {
        self.locations.values()
    }

    /// Look up an item instance.
    pub fn item(&self, id: &ItemId) -> Option<&ItemInstance> {
        self.items.get(id)
    }

    /// Every item instance, in key order.
    pub fn items(&self) -> impl Iterator<Item = &ItemInstance> {
        self.items.values()
    }

    /// Look up a blueprint.
    pub fn blueprint(&self, id: &BlueprintId) -> Option<&ItemBlueprint> {
        self.blueprints.get(id)
    }

    /// The blueprint an item instance was made from.
    pub fn blueprint_of(&self, item: &ItemId) -> Option<&ItemBlueprint> {
        self.items
            .get(item)
            .and_then(|instance| self.blueprints.get(&instance.blueprint))
    }

    /// Display name of an item, falling back to its key.
    pub fn item_name(&self, item: &ItemId) -> String {
        self.blueprint_of(item)
            .map_or_else(|| item.to_string(), |blueprint| blueprint.name.clone())
    }

    /// Status of the passage `from -> to`, if the two are neighbours.
    pub fn passage(&self, from: &LocationId, to: &LocationId) -> Option<PassageStatus> {
        self.locations.get(from).and_then(|loc| loc.passage_to(to))
    }

    /// Neighbours of `location` with their passage status.
    pub fn neighbours(&self, location: &LocationId) -> Vec<(LocationId, PassageStatus)> {
        self.locations.get(location).map_or_else(Vec::new, |loc| {
            loc.connections()
                .iter()
                .map(|(id, status)| (id.clone(), *status))
                .collect()
        })
    }

    /// Whether two living actors stand in the same location.
    pub fn co_located(&self, a: &ActorId, b: &ActorId) -> bool {
        match (self.actors.get(a), self.actors.get(b)) {
            (Some(first), Some(second)) => {
                first.alive && second.alive && first.location == second.location
            }
            _ => false,
        }
    }

    /// Verify that every derived index agrees with the authoritative
    /// placement fields.
    ///
    /// Checks that each item has exactly one consistent placement, each
    /// living actor is indexed at its location and nowhere else, and every
    /// passage is recorded with the same status at both ends.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for actor in self.actors.values() {
            for (loc_id, loc) in &self.locations {
                let indexed = loc.contains_actor(&actor.id);
                let expected = actor.alive && &actor.location == loc_id;
                if indexed != expected {
                    return Err(WorldError::InvariantViolated(format!(
                        "actor {} indexed={indexed} at {loc_id}, expected {expected}",
                        actor.id
                    )));
                }
            }
            for item in actor.inventory.iter().chain(actor.equipped().map(|(_, item)| item)) {
                match self.items.get(item).map(|instance| &instance.placement) {
                    Some(Placement::HeldBy(holder)) if holder == &actor.id => {}
                    _ => {
                        return Err(WorldError::InvariantViolated(format!(
                            "actor {} lists {item} which it does not hold",
                            actor.id
                        )));
                    }
                }
            }
        }

        for (item_id, item) in &self.items {
            let indexed_at: Vec<&LocationId> = self
                .locations
                .iter()
                .filter(|(_, loc)| loc.contains_item(item_id))
                .map(|(id, _)| id)
                .collect();
            let consistent = match &item.placement {
                Placement::AtLocation(loc) => indexed_at == [loc],
                Placement::HeldBy(holder) => {
                    indexed_at.is_empty()
                        && self
                            .actors
                            .get(holder)
                            .is_some_and(|actor| actor.holds(item_id))
                }
            };
            if !consistent {
                return Err(WorldError::InvariantViolated(format!(
                    "item {item_id} placement {:?} disagrees with indexes",
                    item.placement
                )));
            }
        }

        for (from, loc) in &self.locations {
            for (to, status) in loc.connections() {
                if self.passage(to, from) != Some(*status) {
                    return Err(WorldError::InvariantViolated(format!(
                        "passage {from} -> {to} is not mirrored"
                    )));
                }
            }
        }

        Ok(())
    }
}
