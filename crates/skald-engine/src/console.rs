//! Plain-text rendering for the terminal.
//!
//! Two outputs reach the player. The prompt, printed before each of their
//! turns, shows where they stand and everything they perceived since the
//! last prompt. The [`ConsoleObserver`] tick callback prints the results
//! only the player sees: what `look`, `inventory`, `stats`, and `analyze`
//! returned, and why a proposal was refused.

use std::collections::BTreeMap;

use serde_json::Value;
use skald_core::planner::PlannerContext;
use skald_core::runner::TickCallback;
use skald_core::tick::{TickSummary, TurnOutcome};
use skald_types::{ActorId, EntityRef, EventType, PassageStatus, PerceptionRecord};

/// Print the status line, fresh perceptions, and the input marker.
pub fn print_prompt(ctx: &PlannerContext, fresh: &[&PerceptionRecord]) {
    let names: BTreeMap<&str, &str> = ctx
        .location
        .occupants
        .iter()
        .map(|occupant| (occupant.id.as_str(), occupant.name.as_str()))
        .collect();
    for record in fresh {
        println!("  {}", describe(record, &names));
    }

    let exits: Vec<String> = ctx
        .location
        .exits
        .iter()
        .map(|exit| match exit.status {
            PassageStatus::Open => exit.to.to_string(),
            PassageStatus::Closed => format!("{} (closed)", exit.to),
        })
        .collect();
    println!(
        "[tick {}] {} | hp {}/{} | {} | exits: {}",
        ctx.tick,
        ctx.location.name,
        ctx.actor.hp,
        ctx.actor.max_hp,
        ctx.actor.hunger_stage.as_str(),
        exits.join(", ")
    );
    if let Some(conversation) = &ctx.conversation {
        println!(
            "  (in conversation with {} participants; {} has the floor)",
            conversation.participants.len(),
            conversation.current_speaker
        );
    }
    println!("> ");
}

fn text<'a>(payload: &'a BTreeMap<String, Value>, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("?")
}

fn number(payload: &BTreeMap<String, Value>, key: &str) -> u64 {
    payload.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// One line of prose for a perceived event.
pub fn describe(record: &PerceptionRecord, names: &BTreeMap<&str, &str>) -> String {
    let name_of = |id: &ActorId| names.get(id.as_str()).copied().unwrap_or(id.as_str()).to_owned();
    let who = record.actor_id.as_ref().map_or_else(|| "Someone".to_owned(), name_of);
    let whom = record
        .target_ids
        .iter()
        .find_map(|target| match target {
            EntityRef::Actor(id) => Some(name_of(id)),
            _ => None,
        })
        .unwrap_or_else(|| "someone".to_owned());
    let payload = &record.payload;

    match record.event_type {
        EventType::Move => format!("{who} goes from {} to {}.", text(payload, "from"), text(payload, "to")),
        EventType::Talk => format!("{who} says: \"{}\"", text(payload, "content")),
        EventType::TalkLoud => format!("{who} shouts: \"{}\"", text(payload, "content")),
        EventType::Scream => format!("{who} screams: \"{}\" (from {})", text(payload, "content"), record.location),
        EventType::Interject => format!("{who} cuts in: \"{}\"", text(payload, "content")),
        EventType::ConversationStarted => format!("{who} starts talking with {whom}."),
        EventType::LeaveConversation => format!("{who} leaves the conversation."),
        EventType::ConversationEnded => "The conversation trails off.".to_owned(),
        EventType::Grab => format!("{who} picks up the {}.", text(payload, "item_name")),
        EventType::Drop => format!("{who} drops the {}.", text(payload, "item_name")),
        EventType::Give => format!("{who} hands the {} to {whom}.", text(payload, "item_name")),
        EventType::Eat => format!("{who} eats the {}.", text(payload, "item_name")),
        EventType::Equip => format!("{who} readies the {}.", text(payload, "item_name")),
        EventType::Unequip => format!("{who} puts away the {}.", text(payload, "item_name")),
        EventType::AttackAttempt => format!("{who} attacks {whom} with {}!", text(payload, "weapon")),
        EventType::AttackHit => format!("{who} hits {whom}."),
        EventType::AttackMissed => format!("{who} misses {whom}."),
        EventType::DamageApplied => format!("{whom} takes {} damage.", number(payload, "amount")),
        EventType::ActorDied => format!("{who} dies."),
        EventType::OpenPassage => format!("{who} opens the way to {}.", text(payload, "to")),
        EventType::ClosePassage => format!("{who} shuts the way to {}.", text(payload, "to")),
        EventType::Rest => format!("{who} sits down to rest."),
        EventType::Inventory => format!("{who} rummages through their pack."),
        EventType::Stats => format!("{who} takes stock of their wounds."),
        EventType::Analyze => format!("{who} studies the {} closely.", text(payload, "item_name")),
        _ => format!("{who}: {}", record.event_type),
    }
}

/// Prints the player's private results after each tick.
pub struct ConsoleObserver {
    player: ActorId,
    mourned: bool,
}

impl ConsoleObserver {
    /// Observe on behalf of `player`.
    pub const fn new(player: ActorId) -> Self {
        Self {
            player,
            mourned: false,
        }
    }

    fn print_private(payload: &BTreeMap<String, Value>, event_type: &EventType) {
        match event_type {
            EventType::DescribeLocation => {
                println!("{}", text(payload, "name"));
                println!("{}", text(payload, "description"));
                for (label, key) in [("Here", "occupants"), ("On the floor", "items")] {
                    let list = join(payload.get(key));
                    if !list.is_empty() {
                        println!("{label}: {list}");
                    }
                }
            }
            EventType::Inventory => {
                let items: Vec<&str> = payload
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(|item| item.get("name")?.as_str()).collect())
                    .unwrap_or_default();
                println!("You carry: {}", if items.is_empty() { "nothing".to_owned() } else { items.join(", ") });
            }
            EventType::Stats => println!(
                "HP {}/{}, {}.",
                number(payload, "hp"),
                number(payload, "max_hp"),
                text(payload, "hunger_stage")
            ),
            EventType::Analyze => println!(
                "{}: {}",
                text(payload, "item_name"),
                payload.get("blueprint").map_or_else(String::new, Value::to_string)
            ),
            EventType::Reason | EventType::Reflect => {
                let thought = text(payload, "thought");
                if !thought.is_empty() {
                    println!("You think: {thought}");
                }
            }
            _ => {}
        }
    }
}

fn join(list: Option<&Value>) -> String {
    list.and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

impl TickCallback for ConsoleObserver {
    fn on_tick(&mut self, summary: &TickSummary) {
        for turn in summary.turns.iter().filter(|turn| turn.actor_id == self.player) {
            match &turn.outcome {
                TurnOutcome::Rejected { detail, .. } => println!("You can't: {detail}"),
                TurnOutcome::Fallback { detail, .. } => println!("You hesitate ({detail})."),
                TurnOutcome::Accepted { .. } => {}
            }
        }
        for record in &summary.narration {
            if record.event.actor_id.as_ref() == Some(&self.player) {
                Self::print_private(&record.event.payload, &record.event.event_type);
            }
        }
        if !self.mourned
            && summary
                .snapshot
                .actors
                .iter()
                .any(|actor| actor.id == self.player && !actor.alive)
        {
            self.mourned = true;
            println!("You have died.");
        }
    }
}
