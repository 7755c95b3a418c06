//! Attack resolution.
//!
//! An attack becomes an ordered chain of events:
//!
//! 1. `attack_attempt`
//! 2. exactly one of `attack_hit` or `attack_missed`
//! 3. on a hit, `damage_applied`
//!
//! All dice are rolled here, at generation time, from an RNG seeded by the
//! world seed, the tick, and both actor ids. The same attack in the same
//! world at the same tick always rolls the same numbers, which is what
//! makes replays reproduce combat exactly.
//!
//! # Rules
//!
//! - Weapon: the blueprint equipped in `main_hand` if it has damage dice,
//!   otherwise bare fists (`1d4` bludgeoning, skill `unarmed_combat`).
//! - Attack modifier: STR modifier, or the better of STR and DEX for
//!   finesse weapons.
//! - To hit: `d20 + modifier + proficiency` against
//!   `10 + armour + target DEX modifier`. A natural 20 always hits and
//!   doubles the damage dice; a natural 1 always misses.
//! - Damage: dice plus modifier, never below 1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skald_types::{Actor, EntityRef, Event, EventType, ability_modifier};
use skald_world::World;
use tracing::{debug, warn};

/// Main-hand slot consulted for the attacker's weapon.
pub const MAIN_HAND: &str = "main_hand";

/// Parsed `NdM+K` damage dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    /// Number of dice.
    pub count: u32,
    /// Faces per die.
    pub sides: u32,
    /// Flat bonus (may be negative).
    pub bonus: i64,
}

impl DiceSpec {
    /// Parse `"1d6"`, `"2d4+1"`, `"d8-1"`. Returns `None` on anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        let (count, rest) = text.split_once('d')?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse().ok()?
        };
        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(at) => {
                let (sides, bonus) = rest.split_at(at);
                let bonus = bonus.strip_prefix('+').unwrap_or(bonus);
                (sides.parse().ok()?, bonus.parse().ok()?)
            }
            None => (rest.parse().ok()?, 0),
        };
        if count == 0 || sides == 0 {
            return None;
        }
        Some(Self {
            count,
            sides,
            bonus,
        })
    }

    fn roll(self, rng: &mut StdRng, critical: bool) -> i64 {
        let count = if critical {
            self.count.saturating_mul(2)
        } else {
            self.count
        };
        (0..count)
            .map(|_| i64::from(rng.random_range(1..=self.sides)))
            .fold(self.bonus, i64::saturating_add)
    }
}

/// The weapon an attack is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    /// Display name.
    pub name: String,
    /// Damage dice.
    pub dice: DiceSpec,
    /// Damage type reported on the damage event.
    pub damage_type: String,
    /// Skill tag used for the proficiency bonus.
    pub skill: String,
    /// Whether DEX may replace STR.
    pub finesse: bool,
}

impl Weapon {
    /// Bare fists.
    pub fn unarmed() -> Self {
        Self {
            name: "fists".to_owned(),
            dice: DiceSpec {
                count: 1,
                sides: 4,
                bonus: 0,
            },
            damage_type: "bludgeoning".to_owned(),
            skill: "unarmed_combat".to_owned(),
            finesse: false,
        }
    }

    /// What `actor` is attacking with.
    pub fn wielded_by(world: &World, actor: &Actor) -> Self {
        let Some(item) = actor.slots.get(MAIN_HAND).and_then(Option::as_ref) else {
            return Self::unarmed();
        };
        let Some(blueprint) = world.blueprint_of(item) else {
            return Self::unarmed();
        };
        let Some(dice_text) = &blueprint.damage_dice else {
            return Self::unarmed();
        };
        let Some(dice) = DiceSpec::parse(dice_text) else {
            warn!(item = %item, dice = %dice_text, "Unparseable damage dice, attacking unarmed");
            return Self::unarmed();
        };
        Self {
            name: blueprint.name.clone(),
            dice,
            damage_type: blueprint
                .damage_type
                .clone()
                .unwrap_or_else(|| "bludgeoning".to_owned()),
            skill: blueprint
                .skill_tag
                .clone()
                .unwrap_or_else(|| "unarmed_combat".to_owned()),
            finesse: blueprint.is_finesse(),
        }
    }
}

/// Armour class of `target`.
pub fn armour_class(world: &World, target: &Actor) -> i64 {
    let armour: i64 = target
        .equipped()
        .filter_map(|(_, item)| world.blueprint_of(item))
        .map(|blueprint| i64::from(blueprint.armour_rating))
        .fold(0, i64::saturating_add);
    10_i64
        .saturating_add(armour)
        .saturating_add(ability_modifier(target.attributes.dexterity))
}

fn attack_modifier(attacker: &Actor, weapon: &Weapon) -> i64 {
    let strength = ability_modifier(attacker.attributes.strength);
    if weapon.finesse {
        strength.max(ability_modifier(attacker.attributes.dexterity))
    } else {
        strength
    }
}

/// Seed for one attack, mixed FNV-1a style from the world seed, the tick,
/// and both actor ids.
fn attack_seed(world_seed: u64, tick: u64, attacker: &str, target: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    world_seed
        .to_le_bytes()
        .into_iter()
        .chain(tick.to_le_bytes())
        .chain(attacker.bytes())
        .chain([0xff])
        .chain(target.bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Roll `attacker`'s attack on `target` and return the event chain.
pub fn resolve_attack(world: &World, attacker: &Actor, target: &Actor, tick: u64) -> Vec<Event> {
    let weapon = Weapon::wielded_by(world, attacker);
    let modifier = attack_modifier(attacker, &weapon);
    let proficiency = attacker
        .proficiency(&weapon.skill)
        .map_or(0, skald_types::Proficiency::bonus);
    let armour_class = armour_class(world, target);

    let mut rng = StdRng::seed_from_u64(attack_seed(
        world.seed(),
        tick,
        attacker.id.as_str(),
        target.id.as_str(),
    ));
    let natural: u32 = rng.random_range(1..=20);
    let total = i64::from(natural)
        .saturating_add(modifier)
        .saturating_add(proficiency);
    let critical = natural == 20;
    let hit = critical || (natural != 1 && total >= armour_class);

    let stage = |event_type: EventType| {
        Event::new(event_type, tick, attacker.id.clone())
            .with_target(EntityRef::Actor(target.id.clone()))
            .with_payload("weapon", weapon.name.as_str())
    };

    let mut events = vec![stage(EventType::AttackAttempt)];
    let resolution = if hit {
        EventType::AttackHit
    } else {
        EventType::AttackMissed
    };
    events.push(
        stage(resolution)
            .with_payload("roll", natural)
            .with_payload("total", total)
            .with_payload("armour_class", armour_class)
            .with_payload("critical", critical),
    );

    if hit {
        let damage = weapon
            .dice
            .roll(&mut rng, critical)
            .saturating_add(modifier)
            .max(1);
        let amount = u64::try_from(damage).unwrap_or(1);
        events.push(
            stage(EventType::DamageApplied)
                .with_payload("amount", amount)
                .with_payload("damage_type", weapon.damage_type.as_str())
                .with_payload("cause", "attack"),
        );
    }

    debug!(
        tick,
        attacker = %attacker.id,
        target = %target.id,
        weapon = %weapon.name,
        natural,
        total,
        armour_class,
        hit,
        "Attack resolved"
    );
    events
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use skald_types::{ActorId, LocationId};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;

    fn world() -> World {
        starter_world().hydrate(HydrationOptions::default()).unwrap()
    }

    #[test]
    fn parses_dice_notation() {
        assert_eq!(
            DiceSpec::parse("2d6+1"),
            Some(DiceSpec {
                count: 2,
                sides: 6,
                bonus: 1
            })
        );
        assert_eq!(DiceSpec::parse("d8-1").map(|d| (d.count, d.bonus)), Some((1, -1)));
        assert_eq!(DiceSpec::parse("1D4").map(|d| d.sides), Some(4));
        assert_eq!(DiceSpec::parse("0d6"), None);
        assert_eq!(DiceSpec::parse("sword"), None);
    }

    #[test]
    fn weapons_and_armour() {
        let world = world();
        let guard = world.actor(&ActorId::new(starter::GUARD)).unwrap();
        let hero = world.actor(&ActorId::new(starter::HERO)).unwrap();

        let sword = Weapon::wielded_by(&world, guard);
        assert_eq!(sword.name, "short sword");
        assert_eq!(sword.skill, "blades");
        // The hero carries a dagger but has not equipped it.
        assert_eq!(Weapon::wielded_by(&world, hero), Weapon::unarmed());

        // 10 + leather (1) + DEX 10 (0)
        assert_eq!(armour_class(&world, guard), 11);
        // 10 + nothing + DEX 14 (+2)
        assert_eq!(armour_class(&world, hero), 12);
    }

    #[test]
    fn chain_shape_and_determinism() {
        let world = world();
        let hero = world.actor(&ActorId::new(starter::HERO)).unwrap();
        let barkeep = world.actor(&ActorId::new(starter::BARKEEP)).unwrap();

        for tick in 0..50 {
            let events = resolve_attack(&world, hero, barkeep, tick);
            assert_eq!(events, resolve_attack(&world, hero, barkeep, tick));
            assert_eq!(events[0].event_type, EventType::AttackAttempt);
            if events[1].event_type == EventType::AttackHit {
                assert_eq!(events.len(), 3);
                assert_eq!(events[2].event_type, EventType::DamageApplied);
                assert!(events[2].payload_u64("amount").unwrap() >= 1);
            } else {
                assert_eq!(events[1].event_type, EventType::AttackMissed);
                assert_eq!(events.len(), 2);
            }
            assert!(events.iter().all(|e| e.target_actor() == Some(&barkeep.id)));
        }
    }

    #[test]
    fn seed_changes_rolls() {
        let mut def = starter_world();
        let first = def.hydrate(HydrationOptions::default()).unwrap();
        def.seed = 7;
        let second = def.hydrate(HydrationOptions::default()).unwrap();
        let hero = ActorId::new(starter::HERO);
        let barkeep = ActorId::new(starter::BARKEEP);

        let rolls = |world: &World| -> Vec<Option<u64>> {
            (0..20)
                .map(|tick| {
                    let attacker = world.actor(&hero).unwrap();
                    let target = world.actor(&barkeep).unwrap();
                    resolve_attack(world, attacker, target, tick)[1].payload_u64("roll")
                })
                .collect()
        };
        assert_ne!(rolls(&first), rolls(&second));
        assert_eq!(first.actor(&hero).unwrap().location, LocationId::new(starter::TAVERN));
    }
}
