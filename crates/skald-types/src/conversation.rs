//! Conversation data shared between the tool validators and the scheduler.
//!
//! The state machine that creates, advances and dissolves conversations
//! lives in `skald-core`; this module only holds the data and read helpers
//! the validators need (turn checks, membership).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, ConversationId, LocationId};

/// One line of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Utterance {
    /// Tick the line was spoken.
    pub tick: u64,
    /// Who spoke.
    pub speaker: ActorId,
    /// What was said.
    pub content: String,
    /// Whether this was an interjection by someone joining.
    pub interjection: bool,
}

/// A live, turn-ordered, multi-party conversation pinned to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Where the conversation takes place.
    pub location: LocationId,
    /// Current participants. Always at least two while the conversation
    /// exists.
    pub participants: BTreeSet<ActorId>,
    /// Speaking order.
    pub turn_order: Vec<ActorId>,
    /// Whose turn it is.
    pub current_speaker: ActorId,
    /// Everything said so far.
    pub transcript: Vec<Utterance>,
    /// Tick the conversation opened.
    pub started_tick: u64,
    /// Tick of the most recent utterance, join or leave.
    pub last_interaction_tick: u64,
}

impl Conversation {
    /// Whether `actor` takes part.
    pub fn is_participant(&self, actor: &ActorId) -> bool {
        self.participants.contains(actor)
    }

    /// Whether `actor` holds the floor.
    pub fn is_current_speaker(&self, actor: &ActorId) -> bool {
        &self.current_speaker == actor
    }

    /// The participant after `actor` in turn order, wrapping around.
    pub fn next_after(&self, actor: &ActorId) -> Option<&ActorId> {
        let position = self.turn_order.iter().position(|id| id == actor)?;
        let next = position
            .checked_add(1)
            .and_then(|n| n.checked_rem(self.turn_order.len()))
            .unwrap_or(0);
        self.turn_order.get(next)
    }

    /// Project to the snapshot shape.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            id: self.id,
            location: self.location.clone(),
            participants: self.participants.iter().cloned().collect(),
            turn_order: self.turn_order.clone(),
            current_speaker: self.current_speaker.clone(),
            last_interaction_tick: self.last_interaction_tick,
            recent: self
                .transcript
                .iter()
                .rev()
                .take(RECENT_UTTERANCES)
                .rev()
                .cloned()
                .collect(),
        }
    }
}

/// Number of transcript lines carried in a snapshot.
const RECENT_UTTERANCES: usize = 10;

/// Read-only projection of a conversation for planners and observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationSnapshot {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Where it takes place.
    pub location: LocationId,
    /// Participants in key order.
    pub participants: Vec<ActorId>,
    /// Speaking order.
    pub turn_order: Vec<ActorId>,
    /// Whose turn it is.
    pub current_speaker: ActorId,
    /// Tick of the most recent activity.
    pub last_interaction_tick: u64,
    /// The last few transcript lines.
    pub recent: Vec<Utterance>,
}
