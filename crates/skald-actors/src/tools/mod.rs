//! The tool contract and the built-in tools.
//!
//! Every action an actor can take is a [`ToolKind`]. A tool has two
//! capabilities, both read-only with respect to the world:
//!
//! 1. [`ToolKind::validate_intent`] decides whether the action is possible
//!    right now.
//! 2. [`ToolKind::generate_events`] turns a valid action into the ordered
//!    events the mutation engine will apply.
//!
//! The set of tools is closed; dispatch goes through the name-keyed
//! [`ToolRegistry`](registry::ToolRegistry).
//!
//! # Submodules
//!
//! - [`costs`] -- Default time cost per tool.
//! - [`generate`] -- Event generation per tool.
//! - [`params`] -- Parameter schemas and alias normalisation.
//! - [`registry`] -- Name-keyed registry and the intent pipeline.
//! - [`validation`] -- Read-only precondition checks per tool.

use std::collections::BTreeMap;

use serde::Serialize;
use skald_types::{Actor, ActorId, Conversation, ConversationId, Event, RejectionReason};
use skald_world::World;

use crate::config::ToolRules;

pub mod costs;
pub mod generate;
pub mod params;
pub mod registry;
pub mod validation;

use params::{ParamSpec, Params};

/// Why an intent was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {detail}")]
pub struct Rejection {
    /// Machine-readable reason.
    pub reason: RejectionReason,
    /// Human-readable detail.
    pub detail: String,
}

impl Rejection {
    /// Build a rejection.
    pub fn new(reason: RejectionReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Read-only view of everything a tool may consult.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// The world as it stands.
    pub world: &'a World,
    /// Live conversations.
    pub conversations: &'a BTreeMap<ConversationId, Conversation>,
    /// The current tick.
    pub tick: u64,
    /// Policy switches.
    pub rules: &'a ToolRules,
}

impl ToolContext<'_> {
    /// The conversation `actor` takes part in, if any.
    pub fn conversation_of(&self, actor: &ActorId) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|conversation| conversation.is_participant(actor))
    }
}

/// Every built-in tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Describe the current location.
    Look,
    /// Walk to a neighbouring location.
    Move,
    /// Pick an item up.
    Grab,
    /// Put a carried item down.
    Drop,
    /// Hand a carried item to someone nearby.
    Give,
    /// Equip a carried item.
    Equip,
    /// Take off an equipped item.
    Unequip,
    /// Attack someone nearby.
    Attack,
    /// Speak to the room, or to one person.
    Talk,
    /// Speak loudly enough to carry through open passages.
    TalkLoud,
    /// Scream loudly enough to carry through any passage.
    Scream,
    /// Eat carried food.
    Eat,
    /// Open a passage.
    Open,
    /// Close a passage.
    Close,
    /// Do nothing for a while.
    Wait,
    /// Recover hit points over a while.
    Rest,
    /// Join a nearby conversation.
    Interject,
    /// Leave the current conversation.
    LeaveConversation,
    /// List carried and equipped items.
    Inventory,
    /// Report one's own condition.
    Stats,
    /// Examine an item closely.
    Analyze,
    /// Switch starvation mechanics on or off.
    ToggleStarvation,
    /// Think something through: one change to memories, goals, or
    /// relationships.
    Reason,
    /// Reflect on recent events: store conclusions and retire old memories.
    Reflect,
}

impl ToolKind {
    /// Every built-in tool, in registration order.
    pub const ALL: [Self; 24] = [
        Self::Look,
        Self::Move,
        Self::Grab,
        Self::Drop,
        Self::Give,
        Self::Equip,
        Self::Unequip,
        Self::Attack,
        Self::Talk,
        Self::TalkLoud,
        Self::Scream,
        Self::Eat,
        Self::Open,
        Self::Close,
        Self::Wait,
        Self::Rest,
        Self::Interject,
        Self::LeaveConversation,
        Self::Inventory,
        Self::Stats,
        Self::Analyze,
        Self::ToggleStarvation,
        Self::Reason,
        Self::Reflect,
    ];

    /// Stable registry name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Look => "look",
            Self::Move => "move",
            Self::Grab => "grab",
            Self::Drop => "drop",
            Self::Give => "give",
            Self::Equip => "equip",
            Self::Unequip => "unequip",
            Self::Attack => "attack",
            Self::Talk => "talk",
            Self::TalkLoud => "talk_loud",
            Self::Scream => "scream",
            Self::Eat => "eat",
            Self::Open => "open",
            Self::Close => "close",
            Self::Wait => "wait",
            Self::Rest => "rest",
            Self::Interject => "interject",
            Self::LeaveConversation => "leave_conversation",
            Self::Inventory => "inventory",
            Self::Stats => "stats",
            Self::Analyze => "analyze",
            Self::ToggleStarvation => "toggle_starvation",
            Self::Reason => "reason",
            Self::Reflect => "reflect",
        }
    }

    /// One-line description for planner prompts and help text.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Look => "Look around the current location.",
            Self::Move => "Walk through an open passage to a neighbouring location.",
            Self::Grab => "Pick up an item lying here.",
            Self::Drop => "Put down a carried item.",
            Self::Give => "Hand a carried item to someone here.",
            Self::Equip => "Equip a carried item into a slot.",
            Self::Unequip => "Take an item out of an equipment slot.",
            Self::Attack => "Attack someone here.",
            Self::Talk => "Say something to the room or to someone here.",
            Self::TalkLoud => "Say something loudly; heard through open passages.",
            Self::Scream => "Scream; heard in every neighbouring location.",
            Self::Eat => "Eat a carried food item.",
            Self::Open => "Open the passage to a neighbouring location.",
            Self::Close => "Close the passage to a neighbouring location.",
            Self::Wait => "Do nothing for a number of ticks.",
            Self::Rest => "Rest for a number of ticks, recovering one hit point per tick.",
            Self::Interject => "Join a conversation happening here.",
            Self::LeaveConversation => "Leave the conversation you are in.",
            Self::Inventory => "List what you carry and wear.",
            Self::Stats => "Check your own condition.",
            Self::Analyze => "Examine an item closely.",
            Self::ToggleStarvation => "Switch hunger and starvation on or off.",
            Self::Reason => {
                "Think something through. `desired_outcome` holds exactly one of add_memory, \
                 update_memory_status, add_goal, update_goal_status, update_relationship."
            }
            Self::Reflect => {
                "Reflect at length. `outputs` may hold new_core_memories, new_memories, \
                 archive_matches, consolidate_matches."
            }
        }
    }

    /// Parameter schema.
    pub const fn params(self) -> &'static [ParamSpec] {
        params::schema(self)
    }

    /// Whether the time cost scales with the `ticks` parameter.
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Wait | Self::Rest)
    }

    /// Check whether `actor` can perform this tool with `params` right now.
    ///
    /// Reads only; never mutates.
    pub fn validate_intent(
        self,
        actor: &ActorId,
        params: &Params,
        ctx: &ToolContext<'_>,
    ) -> Result<(), Rejection> {
        let actor = acting_actor(ctx.world, actor)?;
        validation::validate(self, actor, params, ctx)
    }

    /// Produce the ordered events for a validated intent without applying
    /// any of them.
    pub fn generate_events(
        self,
        actor: &ActorId,
        params: &Params,
        ctx: &ToolContext<'_>,
    ) -> Result<Vec<Event>, Rejection> {
        let actor = acting_actor(ctx.world, actor)?;
        generate::generate(self, actor, params, ctx)
    }
}

fn acting_actor<'w>(world: &'w World, id: &ActorId) -> Result<&'w Actor, Rejection> {
    let actor = world
        .actor(id)
        .ok_or_else(|| Rejection::new(RejectionReason::UnknownActor, format!("no actor {id}")))?;
    if !actor.alive {
        return Err(Rejection::new(RejectionReason::ActorDead, format!("{id} is dead")));
    }
    Ok(actor)
}
