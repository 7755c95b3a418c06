//! Hunger progression and starvation damage.
//!
//! Runs once per tick in the scheduler's passive phase. Stages derive from
//! ticks elapsed since the actor's last meal; a change of stage becomes a
//! `hunger_tick` event and every tick spent starving becomes a
//! `damage_applied` event with cause `starvation`. Nothing is written here:
//! the events go through the mutation engine like any other.

use skald_types::{EntityRef, Event, EventType, HungerStage};
use skald_world::World;

use crate::config::HungerConfig;

/// The hunger stage after `elapsed` ticks without food.
pub const fn hunger_stage_for(elapsed: u64, config: &HungerConfig) -> HungerStage {
    if elapsed >= config.starving_after_ticks {
        HungerStage::Starving
    } else if elapsed >= config.hungry_after_ticks {
        HungerStage::Hungry
    } else {
        HungerStage::Sated
    }
}

/// Passive hunger events for `tick`, in actor creation order.
///
/// Empty while starvation is switched off in the world.
pub fn passive_events(world: &World, tick: u64, config: &HungerConfig) -> Vec<Event> {
    if !world.starvation_enabled() {
        return Vec::new();
    }
    let mut events = Vec::new();
    for actor in world.actors().filter(|actor| actor.alive) {
        let elapsed = tick.saturating_sub(actor.last_meal_tick);
        let stage = hunger_stage_for(elapsed, config);
        if stage != actor.hunger_stage {
            events.push(
                Event::new(EventType::HungerTick, tick, actor.id.clone())
                    .with_payload("stage", stage.as_str())
                    .with_payload("ticks_since_meal", elapsed),
            );
        }
        if stage == HungerStage::Starving && config.starvation_damage > 0 {
            events.push(
                Event::new(EventType::DamageApplied, tick, actor.id.clone())
                    .with_target(EntityRef::Actor(actor.id.clone()))
                    .with_payload("amount", config.starvation_damage)
                    .with_payload("cause", "starvation"),
            );
        }
    }
    events
}
