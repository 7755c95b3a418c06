//! Event generation for every built-in tool.
//!
//! Generation runs after validation and, like validation, only reads. It
//! resolves parameters through the same resolvers so that the events name
//! exactly the entities validation approved. The events are returned in
//! the order the mutation engine must apply them.

use serde_json::{Value, json};
use skald_types::{Actor, EntityRef, Event, EventType, PassageStatus, RejectionReason};
use skald_world::World;

use super::params::Params;
use super::validation::{
    require_content, resolve_carried_item, resolve_co_located_actor, resolve_equipped,
    resolve_floor_item, resolve_joinable_conversation, resolve_mind_change, resolve_neighbour,
    resolve_own_conversation, resolve_passage, resolve_reachable_item, resolve_reflection,
};
use super::{Rejection, ToolContext, ToolKind};
use crate::combat;

/// Produce the events for `kind` performed by `actor`.
pub fn generate(
    kind: ToolKind,
    actor: &Actor,
    params: &Params,
    ctx: &ToolContext<'_>,
) -> Result<Vec<Event>, Rejection> {
    let world = ctx.world;
    let tick = ctx.tick;
    let event = |event_type: EventType| Event::new(event_type, tick, actor.id.clone());

    let events = match kind {
        ToolKind::Look => vec![describe_location(world, actor, event(EventType::DescribeLocation))],
        ToolKind::Move => {
            let to = resolve_neighbour(world, actor, params)?;
            vec![
                event(EventType::Move)
                    .with_target(EntityRef::Location(to.clone()))
                    .with_payload("from", actor.location.as_str())
                    .with_payload("to", to.as_str()),
            ]
        }
        ToolKind::Grab => {
            let item = resolve_floor_item(world, actor, params)?;
            vec![item_event(world, event(EventType::Grab), item)]
        }
        ToolKind::Drop => {
            let item = resolve_carried_item(world, actor, params)?;
            vec![item_event(world, event(EventType::Drop), item)]
        }
        ToolKind::Eat => {
            let item = resolve_carried_item(world, actor, params)?;
            vec![item_event(world, event(EventType::Eat), item)]
        }
        ToolKind::Give => {
            let item = resolve_carried_item(world, actor, params)?;
            let recipient = resolve_co_located_actor(world, actor, params, "recipient_id")?;
            vec![
                item_event(world, event(EventType::Give), item.clone())
                    .with_target(EntityRef::Actor(recipient.clone()))
                    .with_payload("item_id", item.as_str())
                    .with_payload("recipient_id", recipient.as_str()),
            ]
        }
        ToolKind::Equip => {
            let item = resolve_carried_item(world, actor, params)?;
            let slot = params.require_text("slot")?;
            vec![
                item_event(world, event(EventType::Equip), item.clone())
                    .with_payload("item_id", item.as_str())
                    .with_payload("slot", slot),
            ]
        }
        ToolKind::Unequip => {
            let (slot, item) = resolve_equipped(world, actor, params)?;
            vec![
                item_event(world, event(EventType::Unequip), item.clone())
                    .with_payload("item_id", item.as_str())
                    .with_payload("slot", slot),
            ]
        }
        ToolKind::Attack => {
            let target_id = resolve_co_located_actor(world, actor, params, "target_id")?;
            let target = world.actor(&target_id).ok_or_else(|| {
                Rejection::new(RejectionReason::TargetNotPresent, format!("{target_id} is gone"))
            })?;
            combat::resolve_attack(world, actor, target, tick)
        }
        ToolKind::Talk => {
            let content = require_content(params)?;
            let mut talk = event(EventType::Talk).with_payload("content", content);
            if params.text("target_id").is_some() {
                let addressee = resolve_co_located_actor(world, actor, params, "target_id")?;
                talk = talk.with_target(EntityRef::Actor(addressee));
            }
            vec![talk]
        }
        ToolKind::TalkLoud => vec![event(EventType::TalkLoud).with_payload("content", require_content(params)?)],
        ToolKind::Scream => vec![event(EventType::Scream).with_payload("content", require_content(params)?)],
        ToolKind::Open | ToolKind::Close => {
            let (desired, event_type) = if kind == ToolKind::Open {
                (PassageStatus::Open, EventType::OpenPassage)
            } else {
                (PassageStatus::Closed, EventType::ClosePassage)
            };
            let neighbour = resolve_passage(world, actor, params, desired)?;
            vec![
                event(event_type)
                    .with_target(EntityRef::Location(neighbour.clone()))
                    .with_payload("from", actor.location.as_str())
                    .with_payload("to", neighbour.as_str()),
            ]
        }
        ToolKind::Wait => vec![event(EventType::Wait).with_payload("ticks", params.ticks()?)],
        ToolKind::Rest => {
            let ticks = params.ticks()?;
            vec![
                event(EventType::Rest)
                    .with_payload("ticks", ticks)
                    .with_payload("healed", ticks),
            ]
        }
        ToolKind::Interject => {
            let conversation = resolve_joinable_conversation(actor, params, ctx)?;
            let content = require_content(params)?;
            vec![
                event(EventType::Interject)
                    .with_target(EntityRef::Conversation(conversation.id))
                    .with_payload("conversation_id", conversation.id.to_string())
                    .with_payload("content", content),
            ]
        }
        ToolKind::LeaveConversation => {
            let conversation = resolve_own_conversation(actor, params, ctx)?;
            vec![
                event(EventType::LeaveConversation)
                    .with_target(EntityRef::Conversation(conversation.id))
                    .with_payload("conversation_id", conversation.id.to_string()),
            ]
        }
        ToolKind::Inventory => vec![inventory(world, actor, event(EventType::Inventory))],
        ToolKind::Stats => vec![stats(actor, event(EventType::Stats))],
        ToolKind::Analyze => {
            let item = resolve_reachable_item(world, actor, params)?;
            vec![analyze(world, event(EventType::Analyze), item)]
        }
        ToolKind::ToggleStarvation => vec![
            event(EventType::StarvationToggled)
                .with_payload("enabled", params.require_bool("enabled")?),
        ],
        ToolKind::Reason => {
            let change = resolve_mind_change(world, actor, params)?;
            vec![
                event(EventType::Reason)
                    .with_payload("thought", params.text("thought").unwrap_or_default())
                    .with_payload("op", change.op())
                    .with_payload("desired_outcome", change.to_value()),
            ]
        }
        ToolKind::Reflect => {
            let reflection = resolve_reflection(params)?;
            vec![
                event(EventType::Reflect)
                    .with_payload("thought", params.text("thought").unwrap_or_default())
                    .with_payload("outputs", reflection.to_value()),
            ]
        }
    };
    Ok(events)
}

fn item_event(world: &World, event: Event, item: skald_types::ItemId) -> Event {
    let name = world.item_name(&item);
    event
        .with_target(EntityRef::Item(item))
        .with_payload("item_name", name)
}

fn describe_location(world: &World, actor: &Actor, event: Event) -> Event {
    let Some(here) = world.location(&actor.location) else {
        return event.with_payload("location", actor.location.as_str());
    };
    let exits: Vec<Value> = here
        .connections()
        .iter()
        .map(|(to, status)| {
            let name = world
                .location(to)
                .map_or_else(|| to.to_string(), |loc| loc.info().name.clone());
            json!({ "to": to, "name": name, "status": status })
        })
        .collect();
    let occupants: Vec<&str> = here
        .occupants()
        .iter()
        .filter(|id| **id != actor.id)
        .map(skald_types::ActorId::as_str)
        .collect();
    let items: Vec<String> = here.items().iter().map(|item| world.item_name(item)).collect();

    event
        .with_target(EntityRef::Location(here.id().clone()))
        .with_payload("location", here.id().as_str())
        .with_payload("name", here.info().name.as_str())
        .with_payload("description", here.info().description.as_str())
        .with_payload("exits", exits)
        .with_payload("occupants", occupants)
        .with_payload("items", items)
}

fn inventory(world: &World, actor: &Actor, event: Event) -> Event {
    let items: Vec<Value> = actor
        .inventory
        .iter()
        .map(|item| json!({ "item_id": item, "name": world.item_name(item) }))
        .collect();
    let equipment: serde_json::Map<String, Value> = actor
        .slots
        .iter()
        .map(|(slot, occupant)| {
            let value = occupant
                .as_ref()
                .map_or(Value::Null, |item| json!({ "item_id": item, "name": world.item_name(item) }));
            (slot.clone(), value)
        })
        .collect();
    event
        .with_payload("items", items)
        .with_payload("equipment", equipment)
}

fn stats(actor: &Actor, event: Event) -> Event {
    event
        .with_payload("hp", actor.hp)
        .with_payload("max_hp", actor.attributes.max_hp())
        .with_payload("attributes", json!(actor.attributes))
        .with_payload("skills", json!(actor.skills))
        .with_payload("hunger_stage", actor.hunger_stage.as_str())
}

fn analyze(world: &World, event: Event, item: skald_types::ItemId) -> Event {
    let details = world.blueprint_of(&item).map_or(Value::Null, |blueprint| {
        json!({
            "name": blueprint.name,
            "description": blueprint.description,
            "weight": blueprint.weight,
            "damage_dice": blueprint.damage_dice,
            "damage_type": blueprint.damage_type,
            "armour_rating": blueprint.armour_rating,
            "skill_tag": blueprint.skill_tag,
            "properties": blueprint.properties,
        })
    });
    item_event(world, event, item).with_payload("blueprint", details)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use skald_types::{ActorId, ItemId, LocationId};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;
    use crate::config::ToolRules;

    fn events(actor: &str, kind: ToolKind, pairs: &[(&str, Value)]) -> Vec<Event> {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        let conversations = BTreeMap::new();
        let rules = ToolRules::default();
        let ctx = ToolContext {
            world: &world,
            conversations: &conversations,
            tick: 4,
            rules: &rules,
        };
        let params = Params::from_pairs(pairs.iter().map(|(k, v)| (*k, v.clone())));
        kind.generate_events(&ActorId::new(actor), &params, &ctx).unwrap()
    }

    #[test]
    fn look_describes_without_self() {
        let events = events(starter::HERO, ToolKind::Look, &[]);
        assert_eq!(events.len(), 1);
        let look = &events[0];
        assert_eq!(look.event_type, EventType::DescribeLocation);
        assert_eq!(look.tick, 4);
        assert_eq!(look.payload["occupants"], json!([starter::BARKEEP]));
        assert_eq!(look.payload["items"], json!(["apple", "torch"]));
        assert_eq!(look.payload["exits"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn move_names_both_ends() {
        let events = events(starter::HERO, ToolKind::Move, &[("target_location", Value::from("street"))]);
        let step = &events[0];
        assert_eq!(step.target_location(), Some(&LocationId::new(starter::STREET)));
        assert_eq!(step.payload_str("from"), Some(starter::TAVERN));
        assert_eq!(step.payload_str("to"), Some(starter::STREET));
    }

    #[test]
    fn give_targets_item_and_recipient() {
        let events = events(
            starter::HERO,
            ToolKind::Give,
            &[("item_id", Value::from("bread")), ("recipient_id", Value::from(starter::BARKEEP))],
        );
        let give = &events[0];
        assert_eq!(give.target_item(), Some(&ItemId::new("bread-1")));
        assert_eq!(give.target_actor(), Some(&ActorId::new(starter::BARKEEP)));
        assert_eq!(give.payload_str("item_name"), Some("loaf of bread"));
    }

    #[test]
    fn rest_heals_per_tick() {
        let events = events(starter::HERO, ToolKind::Rest, &[("ticks", Value::from(3))]);
        assert_eq!(events[0].payload_u64("ticks"), Some(3));
        assert_eq!(events[0].payload_u64("healed"), Some(3));
    }

    #[test]
    fn unequip_by_slot_names_the_item() {
        let events = events(starter::GUARD, ToolKind::Unequip, &[("slot", Value::from("main_hand"))]);
        assert_eq!(events[0].target_item(), Some(&ItemId::new("sword-1")));
        assert_eq!(events[0].payload_str("slot"), Some("main_hand"));
    }

    #[test]
    fn stats_report_condition() {
        let events = events(starter::RAT, ToolKind::Stats, &[]);
        assert_eq!(events[0].payload_u64("max_hp"), Some(4));
        assert_eq!(events[0].payload_str("hunger_stage"), Some("sated"));
    }

    #[test]
    fn inventory_lists_slots() {
        let events = events(starter::GUARD, ToolKind::Inventory, &[]);
        let equipment = &events[0].payload["equipment"];
        assert_eq!(equipment["main_hand"]["item_id"], json!("sword-1"));
        assert_eq!(equipment["off_hand"], Value::Null);
    }

    #[test]
    fn reason_carries_the_resolved_change() {
        let events = events(
            starter::BARKEEP,
            ToolKind::Reason,
            &[
                ("thought", Value::from("The hero tipped well.")),
                (
                    "desired_outcome",
                    json!({"update_relationship": {"target_id": "Hero", "new_status": "friendly"}}),
                ),
            ],
        );
        let reason = &events[0];
        assert_eq!(reason.event_type, EventType::Reason);
        assert_eq!(reason.payload_str("op"), Some("update_relationship"));
        assert_eq!(reason.payload_str("thought"), Some("The hero tipped well."));
        assert_eq!(
            reason.payload["desired_outcome"]["update_relationship"]["target_id"],
            json!(starter::HERO)
        );
    }

    #[test]
    fn reflect_fills_in_missing_lists() {
        let events = events(
            starter::BARKEEP,
            ToolKind::Reflect,
            &[("outputs", json!({"archive_matches": ["rain"]}))],
        );
        let outputs = &events[0].payload["outputs"];
        assert_eq!(outputs["archive_matches"], json!(["rain"]));
        assert_eq!(outputs["new_memories"], json!([]));
        assert_eq!(events[0].payload_str("thought"), Some(""));
    }
}
