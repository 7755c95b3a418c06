//! The world mutation engine: the only code that writes entity state.
//!
//! [`apply`] consumes one [`Event`] and either changes the world
//! ([`Outcome::Applied`]) or leaves it untouched ([`Outcome::NoOp`]). It is
//! total over syntactically valid events: a reference that went stale
//! between enqueue and drain resolves to a no-op with a reason, never a
//! panic and never a partial write. Each handler performs every check
//! before its first write.
//!
//! Besides [`apply`], two narrow entry points exist for state the
//! scheduler and perception router own: [`charge_cooldown`] and
//! [`deliver_perception`]. Nothing outside this module obtains a mutable
//! handle to actors, locations, or items.

use skald_types::{
    Actor, ActorId, EntityRef, Event, EventType, HungerStage, ItemId, LocationId, MindChange,
    NoOpReason, PassageStatus, PerceptionRecord, Placement, Reflection,
};
use tracing::{debug, error};

use crate::world::World;

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event took effect.
    Applied(AppliedEffect),
    /// The event's preconditions no longer held; nothing changed.
    NoOp(NoOp),
}

/// What an applied event did, beyond the state change itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedEffect {
    /// Where the event happened. Perception radiates from here.
    pub origin: Option<LocationId>,
    /// For movement, where the actor arrived.
    pub destination: Option<LocationId>,
    /// Events caused by this one (a death after lethal damage). The caller
    /// queues them behind everything already pending.
    pub follow_ups: Vec<Event>,
}

impl AppliedEffect {
    const fn at(origin: LocationId) -> Self {
        Self {
            origin: Some(origin),
            destination: None,
            follow_ups: Vec::new(),
        }
    }
}

/// Why an event did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoOp {
    /// Machine-readable reason.
    pub reason: NoOpReason,
    /// Human-readable detail for diagnostics and narration.
    pub detail: String,
}

fn noop(reason: NoOpReason, detail: impl Into<String>) -> NoOp {
    NoOp {
        reason,
        detail: detail.into(),
    }
}

type Handled = Result<AppliedEffect, NoOp>;

/// Apply one event to the world.
pub fn apply(world: &mut World, event: &Event) -> Outcome {
    let handled = match &event.event_type {
        EventType::Move => apply_move(world, event),
        EventType::Grab => apply_grab(world, event),
        EventType::Drop => apply_drop(world, event),
        EventType::Give => apply_give(world, event),
        EventType::Equip => apply_equip(world, event),
        EventType::Unequip => apply_unequip(world, event),
        EventType::AttackAttempt | EventType::AttackHit | EventType::AttackMissed => {
            apply_attack_stage(world, event)
        }
        EventType::DamageApplied => apply_damage(world, event),
        EventType::ActorDied => apply_death(world, event),
        EventType::OpenPassage => apply_passage(world, event, PassageStatus::Open),
        EventType::ClosePassage => apply_passage(world, event, PassageStatus::Closed),
        EventType::Eat => apply_eat(world, event),
        EventType::Rest => apply_rest(world, event),
        EventType::HungerTick => apply_hunger(world, event),
        EventType::StarvationToggled => apply_starvation_toggle(world, event),
        EventType::ConversationEnded => apply_conversation_ended(event),
        EventType::Reason => apply_reason(world, event),
        EventType::Reflect => apply_reflect(world, event),
        EventType::DescribeLocation
        | EventType::Talk
        | EventType::TalkLoud
        | EventType::Scream
        | EventType::Interject
        | EventType::LeaveConversation
        | EventType::ConversationStarted
        | EventType::Wait
        | EventType::Inventory
        | EventType::Stats
        | EventType::Analyze => apply_descriptive(world, event),
        EventType::Unrecognized(name) => {
            error!(tick = event.tick, event_type = %name, "Refusing to apply unknown event type");
            Err(noop(
                NoOpReason::UnknownEventType,
                format!("no handler for event type `{name}`"),
            ))
        }
    };

    match handled {
        Ok(effect) => {
            debug!(
                tick = event.tick,
                event_type = %event.event_type,
                actor = ?event.actor_id,
                follow_ups = effect.follow_ups.len(),
                "Event applied"
            );
            Outcome::Applied(effect)
        }
        Err(no_op) => {
            debug!(
                tick = event.tick,
                event_type = %event.event_type,
                actor = ?event.actor_id,
                reason = %no_op.reason,
                detail = no_op.detail,
                "Event resolved as no-op"
            );
            Outcome::NoOp(no_op)
        }
    }
}

/// Raise an actor's `next_available_tick` to `until`.
///
/// The value never decreases. Returns the resulting value, or `None` if the
/// actor does not exist.
pub fn charge_cooldown(world: &mut World, actor: &ActorId, until: u64) -> Option<u64> {
    let actor = world.actors.get_mut(actor)?;
    actor.next_available_tick = actor.next_available_tick.max(until);
    Some(actor.next_available_tick)
}

/// Append a perception record to an actor's short-term memory.
///
/// Returns `false` if the actor does not exist or is dead.
pub fn deliver_perception(world: &mut World, actor: &ActorId, record: PerceptionRecord) -> bool {
    match world.actors.get_mut(actor) {
        Some(actor) if actor.alive => {
            actor.memory.push(record);
            true
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

/// The living actor who caused the event.
fn acting_actor<'w>(world: &'w World, event: &Event) -> Result<&'w Actor, NoOp> {
    let id = event
        .actor_id
        .as_ref()
        .ok_or_else(|| noop(NoOpReason::MissingActor, "event has no acting actor"))?;
    let actor = world
        .actors
        .get(id)
        .ok_or_else(|| noop(NoOpReason::UnknownActor, format!("actor {id} does not exist")))?;
    if !actor.alive {
        return Err(noop(NoOpReason::ActorDead, format!("actor {id} is dead")));
    }
    Ok(actor)
}

fn target_item(event: &Event) -> Result<&ItemId, NoOp> {
    event
        .target_item()
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "event names no item"))
}

fn target_actor(event: &Event) -> Result<&ActorId, NoOp> {
    event
        .target_actor()
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "event names no target actor"))
}

fn payload_str<'e>(event: &'e Event, key: &str) -> Result<&'e str, NoOp> {
    event
        .payload_str(key)
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, format!("payload lacks `{key}`")))
}

fn payload_u64(event: &Event, key: &str) -> Result<u64, NoOp> {
    event
        .payload_u64(key)
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, format!("payload lacks `{key}`")))
}

fn require_item_exists(world: &World, item: &ItemId) -> Result<(), NoOp> {
    if world.items.contains_key(item) {
        Ok(())
    } else {
        Err(noop(NoOpReason::UnknownItem, format!("item {item} does not exist")))
    }
}

fn require_carried(actor: &Actor, item: &ItemId) -> Result<(), NoOp> {
    if actor.inventory.contains(item) {
        Ok(())
    } else {
        Err(noop(
            NoOpReason::ItemMoved,
            format!("{} no longer carries {item}", actor.id),
        ))
    }
}

fn require_co_located(world: &World, actor: &ActorId, target: &ActorId) -> Result<(), NoOp> {
    if world.co_located(actor, target) {
        Ok(())
    } else {
        Err(noop(
            NoOpReason::TargetAbsent,
            format!("{target} is no longer beside {actor}"),
        ))
    }
}

fn set_placement(world: &mut World, item: &ItemId, placement: Placement) {
    if let Some(instance) = world.items.get_mut(item) {
        instance.placement = placement;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn apply_descriptive(world: &World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    Ok(AppliedEffect::at(actor.location.clone()))
}

fn apply_move(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let from = actor.location.clone();
    let to = event
        .target_location()
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "move names no destination"))?
        .clone();
    if !world.locations.contains_key(&to) {
        return Err(noop(NoOpReason::UnknownLocation, format!("location {to} does not exist")));
    }
    match world.passage(&from, &to) {
        None => {
            return Err(noop(NoOpReason::NotAdjacent, format!("{to} is not next to {from}")));
        }
        Some(PassageStatus::Closed) => {
            return Err(noop(NoOpReason::PassageClosed, format!("passage {from} -> {to} is closed")));
        }
        Some(PassageStatus::Open) => {}
    }

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.location = to.clone();
        actor.known_locations.insert(to.clone());
    }
    if let Some(loc) = world.locations.get_mut(&from) {
        loc.remove_occupant(&actor_id);
    }
    if let Some(loc) = world.locations.get_mut(&to) {
        loc.add_occupant(actor_id);
    }

    Ok(AppliedEffect {
        origin: Some(from),
        destination: Some(to),
        follow_ups: Vec::new(),
    })
}

fn apply_grab(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    require_item_exists(world, &item)?;
    let on_floor = world
        .locations
        .get(&here)
        .is_some_and(|loc| loc.contains_item(&item));
    if !on_floor {
        return Err(noop(NoOpReason::ItemMoved, format!("{item} is no longer in {here}")));
    }

    set_placement(world, &item, Placement::HeldBy(actor_id.clone()));
    if let Some(loc) = world.locations.get_mut(&here) {
        loc.remove_item(&item);
    }
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.inventory.insert(item);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_drop(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    require_item_exists(world, &item)?;
    require_carried(actor, &item)?;

    set_placement(world, &item, Placement::AtLocation(here.clone()));
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.inventory.remove(&item);
    }
    if let Some(loc) = world.locations.get_mut(&here) {
        loc.add_item(item);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_give(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let giver = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    let recipient = target_actor(event)?.clone();
    require_item_exists(world, &item)?;
    require_carried(actor, &item)?;
    require_co_located(world, &giver, &recipient)?;

    set_placement(world, &item, Placement::HeldBy(recipient.clone()));
    if let Some(actor) = world.actors.get_mut(&giver) {
        actor.inventory.remove(&item);
    }
    if let Some(actor) = world.actors.get_mut(&recipient) {
        actor.inventory.insert(item);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_equip(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    let slot = payload_str(event, "slot")?.to_owned();
    require_item_exists(world, &item)?;
    require_carried(actor, &item)?;
    if !actor.slots.contains_key(&slot) {
        return Err(noop(
            NoOpReason::SlotMismatch,
            format!("{actor_id} has no slot `{slot}`"),
        ));
    }

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.inventory.remove(&item);
        let previous = actor
            .slots
            .get_mut(&slot)
            .and_then(|occupant| occupant.replace(item));
        if let Some(previous) = previous {
            actor.inventory.insert(previous);
        }
    }
    Ok(AppliedEffect::at(here))
}

fn apply_unequip(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    let slot = payload_str(event, "slot")?.to_owned();
    if actor.slots.get(&slot).and_then(Option::as_ref) != Some(&item) {
        return Err(noop(
            NoOpReason::SlotMismatch,
            format!("{item} is not in {actor_id}'s `{slot}` slot"),
        ));
    }

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        if let Some(occupant) = actor.slots.get_mut(&slot) {
            *occupant = None;
        }
        actor.inventory.insert(item);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_attack_stage(world: &World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let target = target_actor(event)?;
    require_co_located(world, &actor.id, target)?;
    Ok(AppliedEffect::at(actor.location.clone()))
}

fn apply_damage(world: &mut World, event: &Event) -> Handled {
    let target_id = target_actor(event)?.clone();
    let target = world
        .actors
        .get(&target_id)
        .filter(|target| target.alive)
        .ok_or_else(|| noop(NoOpReason::TargetAbsent, format!("{target_id} cannot be hurt")))?;
    let here = target.location.clone();
    if let Some(source) = event.actor_id.as_ref().filter(|source| **source != target_id) {
        require_co_located(world, source, &target_id)?;
    }
    let amount = u32::try_from(payload_u64(event, "amount")?).unwrap_or(u32::MAX);

    let mut follow_ups = Vec::new();
    if let Some(target) = world.actors.get_mut(&target_id) {
        target.hp = target.hp.saturating_sub(amount);
        if target.hp == 0 {
            let cause = event.payload_str("cause").unwrap_or("wounds");
            let mut death = Event::new(EventType::ActorDied, event.tick, target_id.clone())
                .with_target(EntityRef::Location(here.clone()))
                .with_payload("cause", cause);
            if let Some(source) = event.actor_id.as_ref().filter(|source| **source != target_id) {
                death = death.with_payload("killed_by", source.as_str());
            }
            follow_ups.push(death);
        }
    }

    Ok(AppliedEffect {
        origin: Some(here),
        destination: None,
        follow_ups,
    })
}

fn apply_death(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let held: Vec<ItemId> = actor
        .inventory
        .iter()
        .chain(actor.equipped().map(|(_, item)| item))
        .cloned()
        .collect();

    for item in &held {
        set_placement(world, item, Placement::AtLocation(here.clone()));
    }
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.alive = false;
        actor.hp = 0;
        actor.inventory.clear();
        for occupant in actor.slots.values_mut() {
            *occupant = None;
        }
    }
    if let Some(loc) = world.locations.get_mut(&here) {
        loc.remove_occupant(&actor_id);
        for item in held {
            loc.add_item(item);
        }
    }
    Ok(AppliedEffect::at(here))
}

fn apply_passage(world: &mut World, event: &Event, desired: PassageStatus) -> Handled {
    let actor = acting_actor(world, event)?;
    let here = actor.location.clone();
    let neighbour = event
        .target_location()
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "event names no passage"))?
        .clone();
    match world.passage(&here, &neighbour) {
        None => {
            return Err(noop(NoOpReason::NotAdjacent, format!("{neighbour} is not next to {here}")));
        }
        Some(current) if current == desired => {
            return Err(noop(
                NoOpReason::AlreadyInState,
                format!("passage {here} <-> {neighbour} is already {current:?}"),
            ));
        }
        Some(_) => {}
    }

    if let Some(loc) = world.locations.get_mut(&here) {
        loc.set_passage(neighbour.clone(), desired);
    }
    if let Some(loc) = world.locations.get_mut(&neighbour) {
        loc.set_passage(here.clone(), desired);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_eat(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let item = target_item(event)?.clone();
    require_item_exists(world, &item)?;
    require_carried(actor, &item)?;

    world.items.remove(&item);
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.inventory.remove(&item);
        actor.last_meal_tick = event.tick;
        actor.hunger_stage = HungerStage::Sated;
    }
    Ok(AppliedEffect::at(here))
}

fn apply_rest(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let healed = u32::try_from(payload_u64(event, "healed")?).unwrap_or(u32::MAX);

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        let ceiling = actor.attributes.max_hp();
        let restored = actor.hp.saturating_add(healed).min(ceiling);
        actor.hp = actor.hp.max(restored);
    }
    Ok(AppliedEffect::at(here))
}

fn apply_reason(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let desired = event
        .payload
        .get("desired_outcome")
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "payload lacks `desired_outcome`"))?;
    let change = MindChange::parse(desired).map_err(|detail| noop(NoOpReason::MalformedPayload, detail))?;
    match &change {
        MindChange::UpdateRelationship { target_id, .. } if !world.actors.contains_key(target_id) => {
            return Err(noop(NoOpReason::UnknownActor, format!("actor {target_id} does not exist")));
        }
        _ => {}
    }

    let op = change.op();
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        let changed = actor.mind.apply(change, event.tick);
        debug!(actor = %actor_id, op, changed, "Mind updated");
    }
    Ok(AppliedEffect::at(here))
}

fn apply_reflect(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let outputs = event
        .payload
        .get("outputs")
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "payload lacks `outputs`"))?;
    let reflection = Reflection::parse(outputs).map_err(|detail| noop(NoOpReason::MalformedPayload, detail))?;

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        let marked = actor.mind.reflect(reflection, &actor_id, event.tick);
        debug!(actor = %actor_id, marked, "Reflection applied");
    }
    Ok(AppliedEffect::at(here))
}

fn apply_hunger(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let actor_id = actor.id.clone();
    let here = actor.location.clone();
    let stage = HungerStage::parse(payload_str(event, "stage")?)
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "unknown hunger stage"))?;
    if actor.hunger_stage == stage {
        return Err(noop(
            NoOpReason::AlreadyInState,
            format!("{actor_id} is already {}", stage.as_str()),
        ));
    }

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.hunger_stage = stage;
    }
    Ok(AppliedEffect::at(here))
}

fn apply_starvation_toggle(world: &mut World, event: &Event) -> Handled {
    let actor = acting_actor(world, event)?;
    let here = actor.location.clone();
    let enabled = event
        .payload_bool("enabled")
        .ok_or_else(|| noop(NoOpReason::MalformedPayload, "payload lacks `enabled`"))?;

    world.starvation_enabled = enabled;
    if !enabled {
        for actor in world.actors.values_mut().filter(|actor| actor.alive) {
            actor.hunger_stage = HungerStage::Sated;
            actor.last_meal_tick = event.tick;
        }
    }
    Ok(AppliedEffect::at(here))
}

fn apply_conversation_ended(event: &Event) -> Handled {
    let location = payload_str(event, "location")?;
    Ok(AppliedEffect::at(LocationId::new(location)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use skald_types::{Goal, MemoryDraft, MemoryStatus, Priority};

    use super::*;
    use crate::definition::{HydrationOptions, starter, starter_world};

    fn world() -> World {
        starter_world().hydrate(HydrationOptions::default()).unwrap()
    }

    fn id(key: &str) -> ActorId {
        ActorId::new(key)
    }

    fn loc(key: &str) -> LocationId {
        LocationId::new(key)
    }

    fn applied(outcome: Outcome) -> AppliedEffect {
        match outcome {
            Outcome::Applied(effect) => effect,
            Outcome::NoOp(no_op) => panic!("expected applied, got {no_op:?}"),
        }
    }

    fn no_op_reason(outcome: &Outcome) -> Option<NoOpReason> {
        match outcome {
            Outcome::NoOp(no_op) => Some(no_op.reason),
            Outcome::Applied(_) => None,
        }
    }

    #[test]
    fn move_updates_location_and_indexes() {
        let mut world = world();
        let event = Event::new(EventType::Move, 1, id(starter::HERO))
            .with_target(EntityRef::Location(loc(starter::STREET)));
        let effect = applied(apply(&mut world, &event));

        assert_eq!(effect.origin, Some(loc(starter::TAVERN)));
        assert_eq!(effect.destination, Some(loc(starter::STREET)));
        let hero = world.actor(&id(starter::HERO)).unwrap();
        assert_eq!(hero.location, loc(starter::STREET));
        assert!(world.location(&loc(starter::STREET)).unwrap().contains_actor(&hero.id));
        assert!(!world.location(&loc(starter::TAVERN)).unwrap().contains_actor(&hero.id));
        world.check_invariants().unwrap();
    }

    #[test]
    fn move_through_closed_passage_is_a_no_op() {
        let mut world = world();
        let before = world.clone();
        let event = Event::new(EventType::Move, 1, id(starter::HERO))
            .with_target(EntityRef::Location(loc(starter::CELLAR)));
        let outcome = apply(&mut world, &event);
        assert_eq!(no_op_reason(&outcome), Some(NoOpReason::PassageClosed));
        assert_eq!(world, before);
    }

    #[test]
    fn grab_then_drop_keeps_placement_exclusive() {
        let mut world = world();
        let apple = ItemId::new("apple-1");
        let grab = Event::new(EventType::Grab, 1, id(starter::HERO))
            .with_target(EntityRef::Item(apple.clone()));
        applied(apply(&mut world, &grab));
        assert_eq!(
            world.item(&apple).unwrap().placement,
            Placement::HeldBy(id(starter::HERO))
        );
        world.check_invariants().unwrap();

        // A second grab of the same apple went stale.
        let again = Event::new(EventType::Grab, 1, id(starter::BARKEEP))
            .with_target(EntityRef::Item(apple.clone()));
        assert_eq!(no_op_reason(&apply(&mut world, &again)), Some(NoOpReason::ItemMoved));

        let drop = Event::new(EventType::Drop, 2, id(starter::HERO))
            .with_target(EntityRef::Item(apple.clone()));
        applied(apply(&mut world, &drop));
        assert_eq!(
            world.item(&apple).unwrap().placement,
            Placement::AtLocation(loc(starter::TAVERN))
        );
        world.check_invariants().unwrap();
    }

    #[test]
    fn give_requires_recipient_nearby() {
        let mut world = world();
        let bread = ItemId::new("bread-1");
        let to_guard = Event::new(EventType::Give, 1, id(starter::HERO))
            .with_target(EntityRef::Item(bread.clone()))
            .with_target(EntityRef::Actor(id(starter::GUARD)));
        assert_eq!(no_op_reason(&apply(&mut world, &to_guard)), Some(NoOpReason::TargetAbsent));

        let to_barkeep = Event::new(EventType::Give, 1, id(starter::HERO))
            .with_target(EntityRef::Item(bread.clone()))
            .with_target(EntityRef::Actor(id(starter::BARKEEP)));
        applied(apply(&mut world, &to_barkeep));
        assert!(world.actor(&id(starter::BARKEEP)).unwrap().inventory.contains(&bread));
        world.check_invariants().unwrap();
    }

    #[test]
    fn equip_swaps_previous_occupant_back() {
        let mut world = world();
        let dagger = ItemId::new("dagger-1");
        let equip = Event::new(EventType::Equip, 1, id(starter::HERO))
            .with_target(EntityRef::Item(dagger.clone()))
            .with_payload("slot", "main_hand");
        applied(apply(&mut world, &equip));
        let hero = world.actor(&id(starter::HERO)).unwrap();
        assert_eq!(hero.equipped_slot(&dagger), Some("main_hand"));
        assert!(!hero.inventory.contains(&dagger));

        let unequip = Event::new(EventType::Unequip, 2, id(starter::HERO))
            .with_target(EntityRef::Item(dagger.clone()))
            .with_payload("slot", "main_hand");
        applied(apply(&mut world, &unequip));
        assert!(world.actor(&id(starter::HERO)).unwrap().inventory.contains(&dagger));
        world.check_invariants().unwrap();
    }

    #[test]
    fn lethal_damage_queues_death_and_drops_items() {
        let mut world = world();
        let damage = Event::new(EventType::DamageApplied, 3, id(starter::HERO))
            .with_target(EntityRef::Actor(id(starter::BARKEEP)))
            .with_payload("amount", 500);
        // Hand the barkeep something to drop on death.
        let give = Event::new(EventType::Give, 3, id(starter::HERO))
            .with_target(EntityRef::Item(ItemId::new("bread-1")))
            .with_target(EntityRef::Actor(id(starter::BARKEEP)));
        applied(apply(&mut world, &give));

        let effect = applied(apply(&mut world, &damage));
        assert_eq!(effect.follow_ups.len(), 1);
        let death = effect.follow_ups.first().unwrap();
        assert_eq!(death.event_type, EventType::ActorDied);

        applied(apply(&mut world, death));
        let barkeep = world.actor(&id(starter::BARKEEP)).unwrap();
        assert!(!barkeep.alive);
        let tavern = world.location(&loc(starter::TAVERN)).unwrap();
        assert!(!tavern.contains_actor(&barkeep.id));
        assert!(tavern.contains_item(&ItemId::new("bread-1")));
        world.check_invariants().unwrap();

        // Dead actors cannot be hurt again or die twice.
        assert_eq!(no_op_reason(&apply(&mut world, &damage)), Some(NoOpReason::TargetAbsent));
    }

    #[test]
    fn starving_to_death_names_no_killer() {
        let mut world = world();
        let starvation = Event::new(EventType::DamageApplied, 50, id(starter::RAT))
            .with_target(EntityRef::Actor(id(starter::RAT)))
            .with_payload("amount", 500)
            .with_payload("cause", "starvation");
        let effect = applied(apply(&mut world, &starvation));
        let death = effect.follow_ups.first().unwrap();
        assert_eq!(death.payload_str("cause"), Some("starvation"));
        assert_eq!(death.payload_str("killed_by"), None);

        let mut world = self::world();
        let stab = Event::new(EventType::DamageApplied, 3, id(starter::HERO))
            .with_target(EntityRef::Actor(id(starter::BARKEEP)))
            .with_payload("amount", 500);
        let effect = applied(apply(&mut world, &stab));
        let death = effect.follow_ups.first().unwrap();
        assert_eq!(death.payload_str("killed_by"), Some(starter::HERO));
    }

    #[test]
    fn reasoning_changes_only_the_mind() {
        let mut world = world();
        let before = world.actor(&id(starter::BARKEEP)).unwrap().clone();
        let reason = Event::new(EventType::Reason, 7, id(starter::BARKEEP))
            .with_payload("thought", "I should deal with those rats.")
            .with_payload(
                "desired_outcome",
                MindChange::AddGoal(Goal::new("Set a trap in the cellar", "chore")).to_value(),
            );
        let effect = applied(apply(&mut world, &reason));
        assert_eq!(effect.origin, Some(loc(starter::TAVERN)));

        let after = world.actor(&id(starter::BARKEEP)).unwrap();
        assert_eq!(after.mind.goals.len(), before.mind.goals.len() + 1);
        assert_eq!(after.mind.goals.last().unwrap().text, "Set a trap in the cellar");
        assert_eq!(after.hp, before.hp);
        assert_eq!(after.location, before.location);
        assert_eq!(after.inventory, before.inventory);
        assert_eq!(after.slots, before.slots);
        world.check_invariants().unwrap();
    }

    #[test]
    fn mind_payloads_outside_the_allowlist_are_no_ops() {
        let mut world = world();
        let before = world.clone();
        let smuggled = Event::new(EventType::Reason, 7, id(starter::BARKEEP))
            .with_payload("desired_outcome", "set_hp");
        let outcome = apply(&mut world, &smuggled);
        assert_eq!(no_op_reason(&outcome), Some(NoOpReason::MalformedPayload));

        let dragon = MindChange::UpdateRelationship {
            target_id: id("dragon"),
            new_status: "afraid".to_owned(),
        };
        let stranger = Event::new(EventType::Reason, 7, id(starter::BARKEEP))
            .with_payload("desired_outcome", dragon.to_value());
        assert_eq!(no_op_reason(&apply(&mut world, &stranger)), Some(NoOpReason::UnknownActor));
        assert_eq!(world, before);
    }

    #[test]
    fn reflection_retires_old_memories() {
        let mut world = world();
        let conclusion = MemoryDraft {
            text: "Trapping the rats is my job now".to_owned(),
            priority: Priority::High,
            status: MemoryStatus::Active,
            source_id: None,
            confidence: None,
            is_secret: false,
            payload: BTreeMap::new(),
        };
        let reflection = Reflection {
            new_memories: vec![conclusion],
            archive_matches: vec!["flour".to_owned()],
            ..Reflection::default()
        };
        let reflect = Event::new(EventType::Reflect, 9, id(starter::BARKEEP))
            .with_payload("outputs", reflection.to_value());
        applied(apply(&mut world, &reflect));

        let mind = &world.actor(&id(starter::BARKEEP)).unwrap().mind;
        assert_eq!(mind.core_memories.first().unwrap().status, MemoryStatus::Archived);
        let conclusion = mind.memories.last().unwrap();
        assert_eq!(conclusion.tick, 9);
        assert_eq!(conclusion.source_id, Some(id(starter::BARKEEP)));
    }

    #[test]
    fn passages_toggle_both_ways() {
        let mut world = world();
        let open = Event::new(EventType::OpenPassage, 1, id(starter::HERO))
            .with_target(EntityRef::Location(loc(starter::CELLAR)));
        applied(apply(&mut world, &open));
        assert_eq!(
            world.passage(&loc(starter::CELLAR), &loc(starter::TAVERN)),
            Some(PassageStatus::Open)
        );
        assert_eq!(
            no_op_reason(&apply(&mut world, &open)),
            Some(NoOpReason::AlreadyInState)
        );
        world.check_invariants().unwrap();
    }

    #[test]
    fn eating_consumes_item_and_resets_hunger() {
        let mut world = world();
        let hunger = Event::new(EventType::HungerTick, 20, id(starter::HERO))
            .with_payload("stage", "hungry");
        applied(apply(&mut world, &hunger));

        let bread = ItemId::new("bread-1");
        let eat = Event::new(EventType::Eat, 21, id(starter::HERO))
            .with_target(EntityRef::Item(bread.clone()));
        applied(apply(&mut world, &eat));

        let hero = world.actor(&id(starter::HERO)).unwrap();
        assert_eq!(hero.hunger_stage, HungerStage::Sated);
        assert_eq!(hero.last_meal_tick, 21);
        assert!(world.item(&bread).is_none());
        world.check_invariants().unwrap();
    }

    #[test]
    fn rest_heals_up_to_ceiling() {
        let mut world = world();
        let hurt = Event::new(EventType::DamageApplied, 1, id(starter::HERO))
            .with_target(EntityRef::Actor(id(starter::HERO)))
            .with_payload("amount", 5);
        applied(apply(&mut world, &hurt));
        let rest = Event::new(EventType::Rest, 2, id(starter::HERO)).with_payload("healed", 50);
        applied(apply(&mut world, &rest));
        let hero = world.actor(&id(starter::HERO)).unwrap();
        assert_eq!(hero.hp, hero.attributes.max_hp());
    }

    #[test]
    fn unknown_event_type_is_refused() {
        let mut world = world();
        let before = world.clone();
        let event = Event::new(EventType::Unrecognized("teleport".into()), 1, id(starter::HERO));
        assert_eq!(
            no_op_reason(&apply(&mut world, &event)),
            Some(NoOpReason::UnknownEventType)
        );
        assert_eq!(world, before);
    }

    #[test]
    fn disabling_starvation_feeds_everyone() {
        let mut world = world();
        let hunger = Event::new(EventType::HungerTick, 50, id(starter::GUARD))
            .with_payload("stage", "starving");
        applied(apply(&mut world, &hunger));
        let toggle = Event::new(EventType::StarvationToggled, 51, id(starter::HERO))
            .with_payload("enabled", false);
        applied(apply(&mut world, &toggle));
        assert!(!world.starvation_enabled());
        let guard = world.actor(&id(starter::GUARD)).unwrap();
        assert_eq!(guard.hunger_stage, HungerStage::Sated);
        assert_eq!(guard.last_meal_tick, 51);
    }

    #[test]
    fn cooldown_never_decreases() {
        let mut world = world();
        assert_eq!(charge_cooldown(&mut world, &id(starter::HERO), 10), Some(10));
        assert_eq!(charge_cooldown(&mut world, &id(starter::HERO), 4), Some(10));
        assert_eq!(charge_cooldown(&mut world, &id("nobody"), 4), None);
    }
}
