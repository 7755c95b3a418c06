//! Read-only precondition checks for every built-in tool.
//!
//! Validators receive the acting actor (already known to exist and be
//! alive) and the normalised parameters. They never mutate; a failure is a
//! [`Rejection`] with the reason the scheduler reports.
//!
//! Entity parameters resolve by key first, then by case-insensitive display
//! name, restricted to what the actor can actually reach. The resolvers are
//! shared with [`super::generate`] so both phases agree on what a parameter
//! refers to.

use skald_types::{
    Actor, ActorId, Conversation, ItemId, LocationId, MindChange, PassageStatus, Reflection,
    RejectionReason,
};
use skald_world::World;

use super::params::Params;
use super::{Rejection, ToolContext, ToolKind};

/// Check `kind`'s preconditions for `actor`.
pub fn validate(
    kind: ToolKind,
    actor: &Actor,
    params: &Params,
    ctx: &ToolContext<'_>,
) -> Result<(), Rejection> {
    match kind {
        ToolKind::Look | ToolKind::Inventory | ToolKind::Stats => Ok(()),
        ToolKind::Move => validate_move(actor, params, ctx),
        ToolKind::Grab => resolve_floor_item(ctx.world, actor, params).map(|_| ()),
        ToolKind::Drop => resolve_carried_item(ctx.world, actor, params).map(|_| ()),
        ToolKind::Give => validate_give(actor, params, ctx),
        ToolKind::Equip => validate_equip(actor, params, ctx),
        ToolKind::Unequip => resolve_equipped(ctx.world, actor, params).map(|_| ()),
        ToolKind::Attack => resolve_co_located_actor(ctx.world, actor, params, "target_id")
            .map(|_| ()),
        ToolKind::Talk => validate_talk(actor, params, ctx),
        ToolKind::TalkLoud | ToolKind::Scream => require_content(params).map(|_| ()),
        ToolKind::Eat => validate_eat(actor, params, ctx),
        ToolKind::Open => resolve_passage(ctx.world, actor, params, PassageStatus::Open).map(|_| ()),
        ToolKind::Close => {
            resolve_passage(ctx.world, actor, params, PassageStatus::Closed).map(|_| ())
        }
        ToolKind::Wait | ToolKind::Rest => params.ticks().map(|_| ()),
        ToolKind::Interject => validate_interject(actor, params, ctx),
        ToolKind::LeaveConversation => resolve_own_conversation(actor, params, ctx).map(|_| ()),
        ToolKind::Analyze => resolve_reachable_item(ctx.world, actor, params).map(|_| ()),
        ToolKind::ToggleStarvation => params.require_bool("enabled").map(|_| ()),
        ToolKind::Reason => resolve_mind_change(ctx.world, actor, params).map(|_| ()),
        ToolKind::Reflect => resolve_reflection(params).map(|_| ()),
    }
}

// ---------------------------------------------------------------------------
// Per-tool checks
// ---------------------------------------------------------------------------

fn validate_move(actor: &Actor, params: &Params, ctx: &ToolContext<'_>) -> Result<(), Rejection> {
    let to = resolve_neighbour(ctx.world, actor, params)?;
    if ctx.world.passage(&actor.location, &to) == Some(PassageStatus::Closed) {
        return Err(Rejection::new(
            RejectionReason::PassageClosed,
            format!("the way from {} to {to} is closed", actor.location),
        ));
    }
    if ctx.rules.require_known_destination && !actor.known_locations.contains(&to) {
        return Err(Rejection::new(
            RejectionReason::UnknownDestination,
            format!("{} does not know the way to {to}", actor.id),
        ));
    }
    Ok(())
}

fn validate_give(actor: &Actor, params: &Params, ctx: &ToolContext<'_>) -> Result<(), Rejection> {
    resolve_carried_item(ctx.world, actor, params)?;
    resolve_co_located_actor(ctx.world, actor, params, "recipient_id")?;
    Ok(())
}

fn validate_equip(actor: &Actor, params: &Params, ctx: &ToolContext<'_>) -> Result<(), Rejection> {
    resolve_carried_item(ctx.world, actor, params)?;
    let slot = params.require_text("slot")?;
    if actor.slots.contains_key(slot) {
        Ok(())
    } else {
        Err(unknown_slot(actor, slot))
    }
}

fn validate_talk(actor: &Actor, params: &Params, ctx: &ToolContext<'_>) -> Result<(), Rejection> {
    require_content(params)?;
    if params.text("target_id").is_some() {
        resolve_co_located_actor(ctx.world, actor, params, "target_id")?;
    }
    match ctx.conversation_of(&actor.id) {
        Some(conversation) if !conversation.is_current_speaker(&actor.id) => Err(Rejection::new(
            RejectionReason::NotYourTurn,
            format!(
                "it is {}'s turn to speak in conversation {}",
                conversation.current_speaker, conversation.id
            ),
        )),
        _ => Ok(()),
    }
}

fn validate_eat(actor: &Actor, params: &Params, ctx: &ToolContext<'_>) -> Result<(), Rejection> {
    let item = resolve_carried_item(ctx.world, actor, params)?;
    let edible = ctx
        .world
        .blueprint_of(&item)
        .is_some_and(skald_types::ItemBlueprint::is_edible);
    if edible {
        Ok(())
    } else {
        Err(Rejection::new(
            RejectionReason::NotEdible,
            format!("{} is not food", ctx.world.item_name(&item)),
        ))
    }
}

fn validate_interject(
    actor: &Actor,
    params: &Params,
    ctx: &ToolContext<'_>,
) -> Result<(), Rejection> {
    resolve_joinable_conversation(actor, params, ctx)?;
    require_content(params)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Resolvers (shared with generation)
// ---------------------------------------------------------------------------

/// Non-empty speech content.
pub(crate) fn require_content(params: &Params) -> Result<&str, Rejection> {
    params.text("content").ok_or_else(|| {
        Rejection::new(RejectionReason::EmptyContent, "there is nothing to say")
    })
}

/// A location adjacent to the actor, by key or name.
pub(crate) fn resolve_neighbour(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<LocationId, Rejection> {
    let wanted = params.require_text("target_location")?;
    world
        .neighbours(&actor.location)
        .into_iter()
        .map(|(id, _)| id)
        .find(|id| {
            id.as_str() == wanted
                || world
                    .location(id)
                    .is_some_and(|loc| loc.info().name.eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::NotAdjacent,
                format!("`{wanted}` is not next to {}", actor.location),
            )
        })
}

/// A neighbour whose passage is currently in the opposite state of
/// `desired`.
pub(crate) fn resolve_passage(
    world: &World,
    actor: &Actor,
    params: &Params,
    desired: PassageStatus,
) -> Result<LocationId, Rejection> {
    let neighbour = resolve_neighbour(world, actor, params)?;
    match (world.passage(&actor.location, &neighbour), desired) {
        (Some(PassageStatus::Open), PassageStatus::Open) => Err(Rejection::new(
            RejectionReason::PassageAlreadyOpen,
            format!("the way to {neighbour} is already open"),
        )),
        (Some(PassageStatus::Closed), PassageStatus::Closed) => Err(Rejection::new(
            RejectionReason::PassageAlreadyClosed,
            format!("the way to {neighbour} is already closed"),
        )),
        _ => Ok(neighbour),
    }
}

fn matches_item(world: &World, item: &ItemId, wanted: &str) -> bool {
    item.as_str() == wanted || world.item_name(item).eq_ignore_ascii_case(wanted)
}

fn find_item<'a>(
    world: &World,
    mut candidates: impl Iterator<Item = &'a ItemId>,
    wanted: &str,
) -> Option<ItemId> {
    candidates
        .find(|item| matches_item(world, item, wanted))
        .cloned()
}

/// An item lying on the floor of the actor's location.
pub(crate) fn resolve_floor_item(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<ItemId, Rejection> {
    let wanted = params.require_text("item_id")?;
    world
        .location(&actor.location)
        .and_then(|loc| find_item(world, loc.items().iter(), wanted))
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::ItemNotHere,
                format!("there is no `{wanted}` in {}", actor.location),
            )
        })
}

/// An item in the actor's inventory (carried, not equipped).
pub(crate) fn resolve_carried_item(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<ItemId, Rejection> {
    let wanted = params.require_text("item_id")?;
    find_item(world, actor.inventory.iter(), wanted).ok_or_else(|| {
        Rejection::new(
            RejectionReason::ItemNotCarried,
            format!("{} carries no `{wanted}`", actor.id),
        )
    })
}

/// An item the actor holds in any form, or one lying at their location.
pub(crate) fn resolve_reachable_item(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<ItemId, Rejection> {
    let wanted = params.require_text("item_id")?;
    let held = actor
        .inventory
        .iter()
        .chain(actor.equipped().map(|(_, item)| item));
    find_item(world, held, wanted)
        .or_else(|| {
            world
                .location(&actor.location)
                .and_then(|loc| find_item(world, loc.items().iter(), wanted))
        })
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::ItemNotHere,
                format!("{} can see no `{wanted}`", actor.id),
            )
        })
}

/// The `(slot, item)` to take off, from either a `slot` or an `item_id`.
pub(crate) fn resolve_equipped(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<(String, ItemId), Rejection> {
    if let Some(slot) = params.text("slot") {
        return match actor.slots.get(slot) {
            None => Err(unknown_slot(actor, slot)),
            Some(None) => Err(Rejection::new(
                RejectionReason::SlotEmpty,
                format!("nothing is equipped in `{slot}`"),
            )),
            Some(Some(item)) => Ok((slot.to_owned(), item.clone())),
        };
    }
    let wanted = params.text("item_id").ok_or_else(|| {
        Rejection::new(
            RejectionReason::MissingParameter,
            "`slot` or `item_id` is required",
        )
    })?;
    actor
        .equipped()
        .find(|(_, item)| matches_item(world, item, wanted))
        .map(|(slot, item)| (slot.to_owned(), item.clone()))
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::SlotEmpty,
                format!("{} has no `{wanted}` equipped", actor.id),
            )
        })
}

/// Another living actor at the same location, named by `param`.
pub(crate) fn resolve_co_located_actor(
    world: &World,
    actor: &Actor,
    params: &Params,
    param: &str,
) -> Result<ActorId, Rejection> {
    let wanted = params.require_text(param)?;
    let target = world
        .actors()
        .find(|other| other.id.as_str() == wanted || other.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::TargetNotPresent,
                format!("nobody called `{wanted}` exists"),
            )
        })?;
    if target.id == actor.id {
        return Err(Rejection::new(
            RejectionReason::TargetIsSelf,
            format!("{} cannot do that to themselves", actor.id),
        ));
    }
    if !world.co_located(&actor.id, &target.id) {
        return Err(Rejection::new(
            RejectionReason::TargetNotPresent,
            format!("{} is not here", target.id),
        ));
    }
    Ok(target.id.clone())
}

/// The conversation the actor is currently part of.
pub(crate) fn resolve_own_conversation<'c>(
    actor: &Actor,
    params: &Params,
    ctx: &'c ToolContext<'_>,
) -> Result<&'c Conversation, Rejection> {
    let conversation = ctx.conversation_of(&actor.id).ok_or_else(|| {
        Rejection::new(
            RejectionReason::NotInConversation,
            format!("{} is not in a conversation", actor.id),
        )
    })?;
    match params.text("conversation_id") {
        Some(wanted) if wanted != conversation.id.to_string() => Err(Rejection::new(
            RejectionReason::NotInConversation,
            format!("{} is not part of conversation {wanted}", actor.id),
        )),
        _ => Ok(conversation),
    }
}

/// A conversation at the actor's location the actor may join.
///
/// Without a `conversation_id` the first conversation held here is chosen.
pub(crate) fn resolve_joinable_conversation<'c>(
    actor: &Actor,
    params: &Params,
    ctx: &'c ToolContext<'_>,
) -> Result<&'c Conversation, Rejection> {
    if let Some(current) = ctx.conversation_of(&actor.id) {
        return Err(Rejection::new(
            RejectionReason::AlreadyInConversation,
            format!("{} is already in conversation {}", actor.id, current.id),
        ));
    }
    let wanted = params.text("conversation_id");
    ctx.conversations
        .values()
        .filter(|conversation| conversation.location == actor.location)
        .find(|conversation| wanted.is_none_or(|id| id == conversation.id.to_string()))
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::UnknownConversation,
                wanted.map_or_else(
                    || format!("nobody is talking in {}", actor.location),
                    |id| format!("no conversation {id} in {}", actor.location),
                ),
            )
        })
}

/// The single allowlisted change in `desired_outcome`.
///
/// A relationship change must name another actor who exists; the name is
/// resolved to their key.
pub(crate) fn resolve_mind_change(
    world: &World,
    actor: &Actor,
    params: &Params,
) -> Result<MindChange, Rejection> {
    let desired = params.require_object("desired_outcome")?;
    let change = MindChange::parse(desired).map_err(|detail| {
        Rejection::new(RejectionReason::InvalidParameter, format!("`desired_outcome`: {detail}"))
    })?;
    let MindChange::UpdateRelationship {
        target_id,
        new_status,
    } = change
    else {
        return Ok(change);
    };
    let wanted = target_id.as_str();
    let other = world
        .actors()
        .find(|other| other.id.as_str() == wanted || other.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            Rejection::new(
                RejectionReason::TargetNotPresent,
                format!("nobody called `{wanted}` exists"),
            )
        })?;
    if other.id == actor.id {
        return Err(Rejection::new(
            RejectionReason::TargetIsSelf,
            format!("{} cannot hold a relationship with themselves", actor.id),
        ));
    }
    Ok(MindChange::UpdateRelationship {
        target_id: other.id.clone(),
        new_status,
    })
}

/// The reflection in `outputs`.
pub(crate) fn resolve_reflection(params: &Params) -> Result<Reflection, Rejection> {
    let outputs = params.require_object("outputs")?;
    Reflection::parse(outputs).map_err(|detail| {
        Rejection::new(RejectionReason::InvalidParameter, format!("`outputs`: {detail}"))
    })
}

fn unknown_slot(actor: &Actor, slot: &str) -> Rejection {
    Rejection::new(
        RejectionReason::UnknownSlot,
        format!("{} has no `{slot}` slot", actor.id),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::Value;
    use skald_types::{ConversationId, Utterance};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;
    use crate::config::ToolRules;

    fn world() -> World {
        starter_world().hydrate(HydrationOptions::default()).unwrap()
    }

    fn check(
        world: &World,
        conversations: &BTreeMap<ConversationId, Conversation>,
        rules: &ToolRules,
        actor: &str,
        kind: ToolKind,
        pairs: &[(&str, &str)],
    ) -> Result<(), Rejection> {
        let ctx = ToolContext {
            world,
            conversations,
            tick: 0,
            rules,
        };
        let params = Params::from_pairs(pairs.iter().map(|(k, v)| (*k, Value::from(*v))));
        kind.validate_intent(&ActorId::new(actor), &params, &ctx)
    }

    fn reason(result: Result<(), Rejection>) -> RejectionReason {
        result.unwrap_err().reason
    }

    #[test]
    fn move_needs_an_open_neighbour() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();
        let run = |to: &str| check(&world, &none, &rules, starter::HERO, ToolKind::Move, &[("target_location", to)]);

        assert!(run(starter::STREET).is_ok());
        assert!(run("market street").is_ok());
        assert_eq!(reason(run(starter::CELLAR)), RejectionReason::PassageClosed);
        assert_eq!(reason(run(starter::ALLEY)), RejectionReason::NotAdjacent);
    }

    #[test]
    fn known_destination_policy() {
        let world = world();
        let none = BTreeMap::new();
        let strict = ToolRules {
            require_known_destination: true,
            ..ToolRules::default()
        };
        // The guard patrols the street but has never seen the alley.
        let result = check(&world, &none, &strict, starter::GUARD, ToolKind::Move, &[("target_location", starter::ALLEY)]);
        assert_eq!(reason(result), RejectionReason::UnknownDestination);
        let known = check(&world, &none, &strict, starter::GUARD, ToolKind::Move, &[("target_location", starter::TAVERN)]);
        assert!(known.is_ok());
        let relaxed = ToolRules::default();
        let result = check(&world, &none, &relaxed, starter::GUARD, ToolKind::Move, &[("target_location", starter::ALLEY)]);
        assert!(result.is_ok());
    }

    #[test]
    fn item_reach() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();

        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Grab, &[("item_id", "apple-1")]).is_ok());
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Grab, &[("item_id", "apple")]).is_ok());
        let far = check(&world, &none, &rules, starter::HERO, ToolKind::Grab, &[("item_id", "bread-2")]);
        assert_eq!(reason(far), RejectionReason::ItemNotHere);
        let not_mine = check(&world, &none, &rules, starter::HERO, ToolKind::Drop, &[("item_id", "apple-1")]);
        assert_eq!(reason(not_mine), RejectionReason::ItemNotCarried);
        let inedible = check(&world, &none, &rules, starter::HERO, ToolKind::Eat, &[("item_id", "dagger-1")]);
        assert_eq!(reason(inedible), RejectionReason::NotEdible);
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Eat, &[("item_id", "bread-1")]).is_ok());
    }

    #[test]
    fn targets_must_be_present_and_other() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();

        let own = check(&world, &none, &rules, starter::HERO, ToolKind::Attack, &[("target_id", starter::HERO)]);
        assert_eq!(reason(own), RejectionReason::TargetIsSelf);
        let away = check(&world, &none, &rules, starter::HERO, ToolKind::Attack, &[("target_id", starter::RAT)]);
        assert_eq!(reason(away), RejectionReason::TargetNotPresent);
        let street = check(&world, &none, &rules, starter::HERO, ToolKind::Attack, &[("target_id", starter::GUARD)]);
        assert_eq!(reason(street), RejectionReason::TargetNotPresent);
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Attack, &[("target_id", starter::BARKEEP)]).is_ok());
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Give, &[("item_id", "bread-1"), ("recipient_id", "Barliman")]).is_ok());
    }

    #[test]
    fn equipment_slots() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();

        let bad_slot = check(&world, &none, &rules, starter::HERO, ToolKind::Equip, &[("item_id", "dagger-1"), ("slot", "tail")]);
        assert_eq!(reason(bad_slot), RejectionReason::UnknownSlot);
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Equip, &[("item_id", "dagger-1"), ("slot", "main_hand")]).is_ok());
        let empty = check(&world, &none, &rules, starter::HERO, ToolKind::Unequip, &[("slot", "body")]);
        assert_eq!(reason(empty), RejectionReason::SlotEmpty);
        assert!(check(&world, &none, &rules, starter::GUARD, ToolKind::Unequip, &[("slot", "body")]).is_ok());
    }

    #[test]
    fn passages_must_change_state() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();

        let open = check(&world, &none, &rules, starter::HERO, ToolKind::Open, &[("target_location", starter::STREET)]);
        assert_eq!(reason(open), RejectionReason::PassageAlreadyOpen);
        assert!(check(&world, &none, &rules, starter::HERO, ToolKind::Open, &[("target_location", starter::CELLAR)]).is_ok());
        let closed = check(&world, &none, &rules, starter::HERO, ToolKind::Close, &[("target_location", starter::CELLAR)]);
        assert_eq!(reason(closed), RejectionReason::PassageAlreadyClosed);
    }

    #[test]
    fn conversation_turns() {
        let world = world();
        let rules = ToolRules::default();
        let hero = ActorId::new(starter::HERO);
        let barkeep = ActorId::new(starter::BARKEEP);
        let id = ConversationId::derive(&hero, &barkeep, 0);
        let conversation = Conversation {
            id,
            location: LocationId::new(starter::TAVERN),
            participants: [hero.clone(), barkeep.clone()].into_iter().collect(),
            turn_order: vec![hero.clone(), barkeep.clone()],
            current_speaker: barkeep,
            transcript: vec![Utterance {
                tick: 0,
                speaker: hero,
                content: "Evening.".to_owned(),
                interjection: false,
            }],
            started_tick: 0,
            last_interaction_tick: 0,
        };
        let conversations: BTreeMap<_, _> = [(id, conversation)].into_iter().collect();

        let out_of_turn = check(&world, &conversations, &rules, starter::HERO, ToolKind::Talk, &[("content", "Well?")]);
        assert_eq!(reason(out_of_turn), RejectionReason::NotYourTurn);
        assert!(check(&world, &conversations, &rules, starter::BARKEEP, ToolKind::Talk, &[("content", "Ale?")]).is_ok());

        let rejoin = check(&world, &conversations, &rules, starter::HERO, ToolKind::Interject, &[("content", "Hm")]);
        assert_eq!(reason(rejoin), RejectionReason::AlreadyInConversation);
        // The guard is out on the street, away from the tavern talk.
        let elsewhere = check(&world, &conversations, &rules, starter::GUARD, ToolKind::Interject, &[("content", "Quiet")]);
        assert_eq!(reason(elsewhere), RejectionReason::UnknownConversation);

        let outsider = check(&world, &conversations, &rules, starter::GUARD, ToolKind::LeaveConversation, &[]);
        assert_eq!(reason(outsider), RejectionReason::NotInConversation);
    }

    #[test]
    fn empty_speech_is_refused() {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();
        let result = check(&world, &none, &rules, starter::HERO, ToolKind::Scream, &[("content", "")]);
        assert_eq!(reason(result), RejectionReason::EmptyContent);
    }

    fn think(actor: &str, kind: ToolKind, key: &str, value: Value) -> Result<(), Rejection> {
        let world = world();
        let none = BTreeMap::new();
        let rules = ToolRules::default();
        let ctx = ToolContext {
            world: &world,
            conversations: &none,
            tick: 0,
            rules: &rules,
        };
        let params = Params::from_pairs([("thought", Value::from("Hm.")), (key, value)]);
        kind.validate_intent(&ActorId::new(actor), &params, &ctx)
    }

    #[test]
    fn reasoning_is_limited_to_the_mind() {
        let goal = serde_json::json!({"add_goal": {"text": "Clear out the cellar", "type": "chore"}});
        assert!(think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", goal).is_ok());

        let heal = serde_json::json!({"set_hp": {"hp": 99}});
        let result = think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", heal);
        assert_eq!(reason(result), RejectionReason::InvalidParameter);

        let text = Value::from("add a goal");
        let result = think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", text);
        assert_eq!(reason(result), RejectionReason::InvalidParameter);

        let result = think(starter::BARKEEP, ToolKind::Reason, "thought", Value::from("Hm."));
        assert_eq!(reason(result), RejectionReason::MissingParameter);
    }

    #[test]
    fn relationships_need_someone_else() {
        let liked = serde_json::json!({"update_relationship": {"target_id": "Hero", "new_status": "friendly"}});
        assert!(think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", liked).is_ok());

        let nobody = serde_json::json!({"update_relationship": {"target_id": "dragon", "new_status": "afraid"}});
        let result = think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", nobody);
        assert_eq!(reason(result), RejectionReason::TargetNotPresent);

        let own = serde_json::json!({"update_relationship": {"target_id": starter::BARKEEP, "new_status": "proud"}});
        let result = think(starter::BARKEEP, ToolKind::Reason, "desired_outcome", own);
        assert_eq!(reason(result), RejectionReason::TargetIsSelf);
    }

    #[test]
    fn reflection_checks_shapes() {
        let outputs = serde_json::json!({"new_memories": [{"text": "Quiet night"}], "archive_matches": ["rain"]});
        assert!(think(starter::BARKEEP, ToolKind::Reflect, "outputs", outputs).is_ok());

        let loose = serde_json::json!({"archive_matches": "rain"});
        let result = think(starter::BARKEEP, ToolKind::Reflect, "outputs", loose);
        assert_eq!(reason(result), RejectionReason::InvalidParameter);
    }
}
