//! Per-tick projections pushed to observers.
//!
//! A [`WorldSnapshot`] is everything a presentation layer needs to redraw;
//! a [`NarrationRecord`] is everything a narrator needs to render one line.
//! All collections are ordered so two identical runs serialise to identical
//! bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::conversation::ConversationSnapshot;
use crate::enums::{HungerStage, NoOpReason, PassageStatus};
use crate::event::Event;
use crate::ids::{ActorId, LocationId};

/// Position and condition of one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActorSnapshot {
    /// Actor key.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Whether a human drives this actor.
    pub is_player: bool,
    /// Current location.
    pub location: LocationId,
    /// Hit points.
    pub hp: u32,
    /// Hunger stage.
    pub hunger_stage: HungerStage,
    /// Whether the actor is alive.
    pub alive: bool,
    /// Earliest tick the actor may act again.
    pub next_available_tick: u64,
}

/// The state of one passage as seen from its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConnectionSnapshot {
    /// The neighbouring location.
    pub to: LocationId,
    /// Whether the passage is open.
    pub status: PassageStatus,
}

/// Minimal state projection emitted once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Tick this snapshot closes.
    pub tick: u64,
    /// Actors in creation order.
    pub actors: Vec<ActorSnapshot>,
    /// Passage states per location.
    pub connections: BTreeMap<LocationId, Vec<ConnectionSnapshot>>,
    /// Conversations alive at the end of the tick.
    pub conversations: Vec<ConversationSnapshot>,
}

/// What became of an event at the mutation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NarrationOutcome {
    /// The event changed (or described) the world.
    Applied,
    /// The event's preconditions no longer held.
    NoOp {
        /// Why nothing happened.
        reason: NoOpReason,
        /// Human-readable detail.
        detail: String,
    },
}

/// One drained event plus its fate, for an external narrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NarrationRecord {
    /// The event as it was applied.
    pub event: Event,
    /// Whether it took effect.
    pub outcome: NarrationOutcome,
}
