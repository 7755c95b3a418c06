//! Core entity structs: actors, items, and the static half of locations.
//!
//! These are plain data. The only code that writes them after hydration is
//! the mutation engine in `skald-world`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{HungerStage, Proficiency};
use crate::ids::{ActorId, BlueprintId, ItemId, LocationId};
use crate::memory::ShortTermMemory;
use crate::mind::Mind;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// An actor's core ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Melee power.
    pub strength: u32,
    /// Agility; also adds to armour class.
    pub dexterity: u32,
    /// Toughness; bounds hit point recovery.
    pub constitution: u32,
}

impl Attributes {
    /// Hit points that resting can restore up to: twice constitution, at
    /// least one.
    pub const fn max_hp(&self) -> u32 {
        let doubled = self.constitution.saturating_mul(2);
        if doubled == 0 { 1 } else { doubled }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
        }
    }
}

/// Ability modifier for a score: `(score - 10) / 2`, rounded down.
pub fn ability_modifier(score: u32) -> i64 {
    (i64::from(score).saturating_sub(10)).div_euclid(2)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Item property marking something that can be eaten.
pub const PROPERTY_FOOD: &str = "food";

/// Item property letting a weapon use dexterity instead of strength.
pub const PROPERTY_FINESSE: &str = "finesse";

/// Immutable template shared by every instance of an item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBlueprint {
    /// Blueprint key.
    pub id: BlueprintId,
    /// Display name.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Weight in arbitrary units.
    #[serde(default)]
    pub weight: u32,
    /// Damage dice such as `1d6` or `2d4+1`, for weapons.
    #[serde(default)]
    pub damage_dice: Option<String>,
    /// Damage type such as `slashing`.
    #[serde(default)]
    pub damage_type: Option<String>,
    /// Armour class bonus while equipped.
    #[serde(default)]
    pub armour_rating: u32,
    /// Skill used when attacking with this item.
    #[serde(default)]
    pub skill_tag: Option<String>,
    /// Free-form properties (`food`, `finesse`, ...).
    #[serde(default)]
    pub properties: BTreeSet<String>,
}

impl ItemBlueprint {
    /// Whether the item can be eaten.
    pub fn is_edible(&self) -> bool {
        self.properties.contains(PROPERTY_FOOD)
    }

    /// Whether the weapon may use dexterity for attacks.
    pub fn is_finesse(&self) -> bool {
        self.properties.contains(PROPERTY_FINESSE)
    }
}

/// Where an item instance currently is.
///
/// Exactly one placement exists per item, so "both" and "neither" cannot be
/// expressed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Placement {
    /// Lying in a location.
    AtLocation(LocationId),
    /// Carried or equipped by an actor.
    HeldBy(ActorId),
}

/// A concrete item in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Instance key.
    pub id: ItemId,
    /// Template this instance was made from.
    pub blueprint: BlueprintId,
    /// Current placement.
    pub placement: Placement,
    /// Item-specific state flags.
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Descriptive tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// The immutable identity and description of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStatic {
    /// Location key.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// What an actor sees on `look`.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// A player character or NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor key.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Whether a human drives this actor.
    pub is_player: bool,
    /// Current (or, once dead, final) location.
    pub location: LocationId,
    /// Ability scores.
    pub attributes: Attributes,
    /// Trained skills by tag.
    pub skills: BTreeMap<String, Proficiency>,
    /// Current hit points.
    pub hp: u32,
    /// Declared equipment slots and what occupies them.
    pub slots: BTreeMap<String, Option<ItemId>>,
    /// Items carried but not equipped.
    pub inventory: BTreeSet<ItemId>,
    /// Earliest tick at which the actor may act again.
    pub next_available_tick: u64,
    /// Tick of the actor's last meal.
    pub last_meal_tick: u64,
    /// Current hunger stage.
    pub hunger_stage: HungerStage,
    /// Whether the actor is alive.
    pub alive: bool,
    /// Recent perceptions.
    pub memory: ShortTermMemory,
    /// Locations the actor has been to or been told about.
    pub known_locations: BTreeSet<LocationId>,
    /// Long-term memories, goals, and relationships.
    #[serde(default)]
    pub mind: Mind,
}

impl Actor {
    /// Whether the actor holds `item` in any form (carried or equipped).
    pub fn holds(&self, item: &ItemId) -> bool {
        self.inventory.contains(item) || self.equipped_slot(item).is_some()
    }

    /// The slot `item` is equipped in, if any.
    pub fn equipped_slot(&self, item: &ItemId) -> Option<&str> {
        self.slots
            .iter()
            .find(|(_, occupant)| occupant.as_ref() == Some(item))
            .map(|(slot, _)| slot.as_str())
    }

    /// Every equipped item, in slot order.
    pub fn equipped(&self) -> impl Iterator<Item = (&str, &ItemId)> {
        self.slots
            .iter()
            .filter_map(|(slot, occupant)| occupant.as_ref().map(|item| (slot.as_str(), item)))
    }

    /// Proficiency in `skill`, if trained.
    pub fn proficiency(&self, skill: &str) -> Option<Proficiency> {
        self.skills.get(skill).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifier_rounds_down() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(14), 2);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(1), -5);
    }

    #[test]
    fn max_hp_is_at_least_one() {
        let frail = Attributes {
            constitution: 0,
            ..Attributes::default()
        };
        assert_eq!(frail.max_hp(), 1);
        assert_eq!(Attributes::default().max_hp(), 20);
    }

    #[test]
    fn placement_wire_format() {
        let placement = Placement::HeldBy(ActorId::new("hero"));
        let json = serde_json::to_string(&placement).ok();
        assert_eq!(json.as_deref(), Some(r#"{"kind":"held_by","id":"hero"}"#));
    }
}
