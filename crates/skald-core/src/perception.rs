//! Perception routing.
//!
//! Every applied event is turned into a [`PerceptionRecord`] and written
//! into the short-term memory of the actors who could notice it. No-ops and
//! rejected intents are never perceived.
//!
//! Who notices:
//!
//! - Living actors at the event's origin.
//! - For `move`, also those at the destination.
//! - For `talk_loud`, also those in neighbouring locations joined by an
//!   open passage.
//! - For `scream`, also those in every neighbouring location.
//!
//! The acting actor never perceives their own event this way. Looking
//! around, waiting, thinking, and bookkeeping events are silent; rummaging
//! through a pack or studying an item is visible to the room.

use std::collections::BTreeMap;

use skald_types::{ActorId, Event, EventType, LocationId, PassageStatus, PerceptionRecord};
use skald_world::mutation::deliver_perception;
use skald_world::{AppliedEffect, World};
use tracing::trace;

/// Whether other actors can notice `event_type` at all.
pub const fn is_perceptible(event_type: &EventType) -> bool {
    !matches!(
        event_type,
        EventType::DescribeLocation
            | EventType::Wait
            | EventType::Reason
            | EventType::Reflect
            | EventType::HungerTick
            | EventType::StarvationToggled
            | EventType::Unrecognized(_)
    )
}

/// Locations from which `event` can be noticed, each with the location
/// recorded in the perception.
fn audible_from(world: &World, event: &Event, effect: &AppliedEffect) -> Vec<(LocationId, LocationId)> {
    let Some(origin) = effect.origin.clone() else {
        return Vec::new();
    };
    let mut reach = vec![(origin.clone(), origin.clone())];
    match event.event_type {
        EventType::Move => {
            if let Some(destination) = &effect.destination {
                reach.push((destination.clone(), destination.clone()));
            }
        }
        EventType::TalkLoud => reach.extend(
            world
                .neighbours(&origin)
                .into_iter()
                .filter(|(_, status)| *status == PassageStatus::Open)
                .map(|(neighbour, _)| (neighbour, origin.clone())),
        ),
        EventType::Scream => reach.extend(
            world
                .neighbours(&origin)
                .into_iter()
                .map(|(neighbour, _)| (neighbour, origin.clone())),
        ),
        _ => {}
    }
    reach
}

/// Deliver `event` to everyone who notices it. Returns the number of
/// records delivered.
pub fn route(world: &mut World, event: &Event, effect: &AppliedEffect) -> usize {
    if !is_perceptible(&event.event_type) {
        return 0;
    }

    // Each recipient hears an event once, at the first location that
    // reaches them.
    let mut recipients: BTreeMap<ActorId, LocationId> = BTreeMap::new();
    for (listening_at, happened_at) in audible_from(world, event, effect) {
        let Some(location) = world.location(&listening_at) else {
            continue;
        };
        for occupant in location.occupants() {
            if event.actor_id.as_ref() == Some(occupant) {
                continue;
            }
            recipients
                .entry(occupant.clone())
                .or_insert_with(|| happened_at.clone());
        }
    }

    let mut delivered: usize = 0;
    for (recipient, location) in recipients {
        let record = PerceptionRecord::from_event(event, location);
        if deliver_perception(world, &recipient, record) {
            delivered = delivered.saturating_add(1);
        }
    }
    trace!(
        tick = event.tick,
        event_type = %event.event_type,
        delivered,
        "Perception routed"
    );
    delivered
}
