//! Enumeration types shared across the kernel.
//!
//! Section numbering mirrors the data model: event types first, then
//! entity state enums, then the outcome vocabularies (rejections and
//! no-ops).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// 1. Event Types
// ---------------------------------------------------------------------------

/// The kind of state change an [`Event`](crate::event::Event) describes.
///
/// The set is closed: every variant except [`EventType::Unrecognized`] has
/// a handler in the mutation engine. `Unrecognized` only arises from
/// deserialising external input and is always resolved as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Actor moved through a passage.
    Move,
    /// Actor looked around (descriptive, from the `look` tool).
    DescribeLocation,
    /// Actor picked an item up from the floor.
    Grab,
    /// Actor put a carried item down.
    Drop,
    /// Actor handed a carried item to a co-located actor.
    Give,
    /// Actor equipped a carried item into a slot.
    Equip,
    /// Actor moved an equipped item back into their pack.
    Unequip,
    /// First stage of an attack: the swing.
    AttackAttempt,
    /// The attack connected.
    AttackHit,
    /// The attack missed.
    AttackMissed,
    /// Hit points were removed from an actor.
    DamageApplied,
    /// An actor's hit points reached zero.
    ActorDied,
    /// A passage was opened.
    OpenPassage,
    /// A passage was closed.
    ClosePassage,
    /// Actor ate a food item.
    Eat,
    /// Ordinary speech, heard in the same location.
    Talk,
    /// Loud speech, also heard through open passages.
    TalkLoud,
    /// A scream, heard in every adjacent location.
    Scream,
    /// A third party joined an ongoing conversation.
    Interject,
    /// A participant left a conversation.
    LeaveConversation,
    /// A conversation was opened.
    ConversationStarted,
    /// A conversation dissolved.
    ConversationEnded,
    /// Actor waited.
    Wait,
    /// Actor rested and recovered hit points.
    Rest,
    /// Passive hunger progression.
    HungerTick,
    /// Actor checked their inventory.
    Inventory,
    /// Actor checked their own condition.
    Stats,
    /// Actor examined an item closely.
    Analyze,
    /// Actor thought something through and updated one memory, goal, or
    /// relationship.
    Reason,
    /// Actor reflected and reorganised their long-term memories.
    Reflect,
    /// Starvation mechanics were switched on or off.
    StarvationToggled,
    /// A type name with no handler. Never produced by the kernel itself.
    Unrecognized(String),
}

impl EventType {
    /// Wire name of this event type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Move => "move",
            Self::DescribeLocation => "describe_location",
            Self::Grab => "grab",
            Self::Drop => "drop",
            Self::Give => "give",
            Self::Equip => "equip",
            Self::Unequip => "unequip",
            Self::AttackAttempt => "attack_attempt",
            Self::AttackHit => "attack_hit",
            Self::AttackMissed => "attack_missed",
            Self::DamageApplied => "damage_applied",
            Self::ActorDied => "actor_died",
            Self::OpenPassage => "open_passage",
            Self::ClosePassage => "close_passage",
            Self::Eat => "eat",
            Self::Talk => "talk",
            Self::TalkLoud => "talk_loud",
            Self::Scream => "scream",
            Self::Interject => "interject",
            Self::LeaveConversation => "leave_conversation",
            Self::ConversationStarted => "conversation_started",
            Self::ConversationEnded => "conversation_ended",
            Self::Wait => "wait",
            Self::Rest => "rest",
            Self::HungerTick => "hunger_tick",
            Self::Inventory => "inventory",
            Self::Stats => "stats",
            Self::Analyze => "analyze",
            Self::Reason => "reason",
            Self::Reflect => "reflect",
            Self::StarvationToggled => "starvation_toggled",
            Self::Unrecognized(name) => name,
        }
    }

    /// Parse a wire name. Unknown names become [`EventType::Unrecognized`].
    pub fn parse(name: &str) -> Self {
        match name {
            "move" => Self::Move,
            "describe_location" => Self::DescribeLocation,
            "grab" => Self::Grab,
            "drop" => Self::Drop,
            "give" => Self::Give,
            "equip" => Self::Equip,
            "unequip" => Self::Unequip,
            "attack_attempt" => Self::AttackAttempt,
            "attack_hit" => Self::AttackHit,
            "attack_missed" => Self::AttackMissed,
            "damage_applied" => Self::DamageApplied,
            "actor_died" => Self::ActorDied,
            "open_passage" => Self::OpenPassage,
            "close_passage" => Self::ClosePassage,
            "eat" => Self::Eat,
            "talk" => Self::Talk,
            "talk_loud" => Self::TalkLoud,
            "scream" => Self::Scream,
            "interject" => Self::Interject,
            "leave_conversation" => Self::LeaveConversation,
            "conversation_started" => Self::ConversationStarted,
            "conversation_ended" => Self::ConversationEnded,
            "wait" => Self::Wait,
            "rest" => Self::Rest,
            "hunger_tick" => Self::HungerTick,
            "inventory" => Self::Inventory,
            "stats" => Self::Stats,
            "analyze" => Self::Analyze,
            "reason" => Self::Reason,
            "reflect" => Self::Reflect,
            "starvation_toggled" => Self::StarvationToggled,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    /// Whether this event carries spoken content.
    pub const fn is_speech(&self) -> bool {
        matches!(self, Self::Talk | Self::TalkLoud | Self::Scream | Self::Interject)
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Unrecognized(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Entity State
// ---------------------------------------------------------------------------

/// How hungry an actor is, derived from ticks since their last meal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HungerStage {
    /// Recently fed.
    #[default]
    Sated,
    /// Needs food soon.
    Hungry,
    /// Taking damage every tick.
    Starving,
}

impl HungerStage {
    /// Wire name of this stage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sated => "sated",
            Self::Hungry => "hungry",
            Self::Starving => "starving",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sated" => Some(Self::Sated),
            "hungry" => Some(Self::Hungry),
            "starving" => Some(Self::Starving),
            _ => None,
        }
    }
}

/// Whether a passage between two locations can be walked through.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PassageStatus {
    /// Passable; loud speech carries through.
    #[default]
    Open,
    /// Blocked; only screams carry through.
    Closed,
}

/// How well an actor has trained a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Proficiency {
    /// Just starting out.
    Novice,
    /// Competent.
    Proficient,
    /// Highly trained.
    Expert,
    /// Peak of the craft.
    Master,
}

impl Proficiency {
    /// Bonus added to attack rolls made with a matching skill.
    pub const fn bonus(self) -> i64 {
        match self {
            Self::Novice => 1,
            Self::Proficient => 2,
            Self::Expert => 3,
            Self::Master => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Outcomes
// ---------------------------------------------------------------------------

/// Why a tool refused an intent.
///
/// A rejected intent never produces events and never spends the actor's
/// cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// The acting actor does not exist.
    UnknownActor,
    /// The acting actor is dead.
    ActorDead,
    /// The acting actor's cooldown has not elapsed.
    OnCooldown,
    /// No tool is registered under the requested name.
    UnknownTool,
    /// The proposal could not be interpreted at all.
    MalformedIntent,
    /// A required parameter is absent.
    MissingParameter,
    /// A parameter has the wrong type or an impossible value.
    InvalidParameter,
    /// The destination is not a neighbour of the actor's location.
    NotAdjacent,
    /// The passage to the destination is closed.
    PassageClosed,
    /// The passage is already open.
    PassageAlreadyOpen,
    /// The passage is already closed.
    PassageAlreadyClosed,
    /// The destination is not among the actor's known locations.
    UnknownDestination,
    /// The item is not lying at the actor's location.
    ItemNotHere,
    /// The actor is not carrying the item.
    ItemNotCarried,
    /// The item is not food.
    NotEdible,
    /// The target actor is absent, dead, or elsewhere.
    TargetNotPresent,
    /// The actor targeted themselves where that is not allowed.
    TargetIsSelf,
    /// The actor has no such equipment slot.
    UnknownSlot,
    /// The equipment slot holds nothing.
    SlotEmpty,
    /// Speech with no content.
    EmptyContent,
    /// A conversation participant spoke out of turn.
    NotYourTurn,
    /// The actor is not part of the conversation.
    NotInConversation,
    /// The actor already takes part in a conversation.
    AlreadyInConversation,
    /// The conversation does not exist or is elsewhere.
    UnknownConversation,
}

impl RejectionReason {
    /// Wire name of this reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownActor => "unknown_actor",
            Self::ActorDead => "actor_dead",
            Self::OnCooldown => "on_cooldown",
            Self::UnknownTool => "unknown_tool",
            Self::MalformedIntent => "malformed_intent",
            Self::MissingParameter => "missing_parameter",
            Self::InvalidParameter => "invalid_parameter",
            Self::NotAdjacent => "not_adjacent",
            Self::PassageClosed => "passage_closed",
            Self::PassageAlreadyOpen => "passage_already_open",
            Self::PassageAlreadyClosed => "passage_already_closed",
            Self::UnknownDestination => "unknown_destination",
            Self::ItemNotHere => "item_not_here",
            Self::ItemNotCarried => "item_not_carried",
            Self::NotEdible => "not_edible",
            Self::TargetNotPresent => "target_not_present",
            Self::TargetIsSelf => "target_is_self",
            Self::UnknownSlot => "unknown_slot",
            Self::SlotEmpty => "slot_empty",
            Self::EmptyContent => "empty_content",
            Self::NotYourTurn => "not_your_turn",
            Self::NotInConversation => "not_in_conversation",
            Self::AlreadyInConversation => "already_in_conversation",
            Self::UnknownConversation => "unknown_conversation",
        }
    }

    /// Whether the proposal itself was unusable, as opposed to being a
    /// well-formed action that the current world state forbids. Missing or
    /// ill-typed parameters count as unusable.
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            Self::UnknownTool | Self::MalformedIntent | Self::MissingParameter | Self::InvalidParameter
        )
    }
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an event had no effect when it reached the mutation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NoOpReason {
    /// The event names no type the engine handles.
    UnknownEventType,
    /// The event needs an acting actor but has none.
    MissingActor,
    /// A referenced actor does not exist.
    UnknownActor,
    /// The acting actor died before the event was applied.
    ActorDead,
    /// A referenced target actor is gone, dead, or elsewhere.
    TargetAbsent,
    /// A referenced item does not exist.
    UnknownItem,
    /// The item is no longer where the event expects it.
    ItemMoved,
    /// A referenced location does not exist.
    UnknownLocation,
    /// The two locations are no longer connected as expected.
    NotAdjacent,
    /// The passage is closed.
    PassageClosed,
    /// The equipment slot does not exist or holds something else.
    SlotMismatch,
    /// A payload field the handler needs is absent or ill-typed.
    MalformedPayload,
    /// The state already matches what the event would set.
    AlreadyInState,
}

impl NoOpReason {
    /// Wire name of this reason.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownEventType => "unknown_event_type",
            Self::MissingActor => "missing_actor",
            Self::UnknownActor => "unknown_actor",
            Self::ActorDead => "actor_dead",
            Self::TargetAbsent => "target_absent",
            Self::UnknownItem => "unknown_item",
            Self::ItemMoved => "item_moved",
            Self::UnknownLocation => "unknown_location",
            Self::NotAdjacent => "not_adjacent",
            Self::PassageClosed => "passage_closed",
            Self::SlotMismatch => "slot_mismatch",
            Self::MalformedPayload => "malformed_payload",
            Self::AlreadyInState => "already_in_state",
        }
    }
}

impl core::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
