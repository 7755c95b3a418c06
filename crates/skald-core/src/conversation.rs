//! The conversation state machine.
//!
//! A conversation goes `NONE -> ACTIVE -> DISSOLVED` and never comes back.
//! The [`ConversationBoard`] owns every live conversation and reacts to
//! applied events:
//!
//! - `talk` from A to a co-located B, with neither already talking, emits
//!   `conversation_started`; applying that event opens the conversation
//!   with turn order `[A, B]` and B holding the floor.
//! - An in-turn `talk` appends to the transcript and passes the floor to
//!   the addressee if they take part, otherwise to the next in turn order.
//! - `interject` adds a newcomer at the end of the turn order.
//! - `leave_conversation`, a `move` away from the pinned location, or
//!   `actor_died` removes a participant.
//!
//! A conversation dissolves when fewer than two participants remain, when
//! fewer than two remain at its location, or when it has been silent for
//! `timeout_ticks`. Dissolution is an ordinary `conversation_ended` event;
//! the board forgets the conversation when that event is applied.

use std::collections::{BTreeMap, BTreeSet};

use skald_types::{
    ActorId, Conversation, ConversationId, ConversationSnapshot, EntityRef, Event, EventType,
    LocationId, Utterance,
};
use skald_world::{AppliedEffect, World};
use tracing::{debug, info};

/// Why a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Nobody spoke for `timeout_ticks`.
    Timeout,
    /// Fewer than two participants remain.
    ParticipantsLeft,
    /// Fewer than two participants remain at the location.
    Dispersed,
}

impl EndReason {
    /// Stable name carried in the `reason` payload.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ParticipantsLeft => "participants_left",
            Self::Dispersed => "dispersed",
        }
    }
}

/// Every live conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationBoard {
    conversations: BTreeMap<ConversationId, Conversation>,
    /// Conversations whose `conversation_ended` is already queued.
    pending_end: BTreeSet<ConversationId>,
    timeout_ticks: u64,
}

impl ConversationBoard {
    /// An empty board dissolving silent conversations after
    /// `timeout_ticks`.
    pub const fn new(timeout_ticks: u64) -> Self {
        Self {
            conversations: BTreeMap::new(),
            pending_end: BTreeSet::new(),
            timeout_ticks,
        }
    }

    /// Live conversations by id.
    pub const fn conversations(&self) -> &BTreeMap<ConversationId, Conversation> {
        &self.conversations
    }

    /// Look up a conversation.
    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    /// The conversation `actor` takes part in, if any.
    pub fn conversation_of(&self, actor: &ActorId) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|conversation| conversation.is_participant(actor))
    }

    /// Snapshots of every live conversation, in id order.
    pub fn snapshots(&self) -> Vec<ConversationSnapshot> {
        self.conversations.values().map(Conversation::snapshot).collect()
    }

    /// React to an applied event. Returns events to enqueue.
    pub fn observe(&mut self, world: &World, event: &Event, effect: &AppliedEffect) -> Vec<Event> {
        match event.event_type {
            EventType::Talk => self.on_talk(world, event),
            EventType::ConversationStarted => {
                self.on_started(event);
                Vec::new()
            }
            EventType::Interject => {
                self.on_interject(event);
                Vec::new()
            }
            EventType::LeaveConversation | EventType::ActorDied => self.on_departure(event, None),
            EventType::Move => self.on_departure(event, effect.destination.as_ref()),
            EventType::ConversationEnded => {
                self.on_ended(event);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Per-tick check for silent or scattered conversations.
    pub fn sweep(&mut self, world: &World, tick: u64) -> Vec<Event> {
        let mut ended = Vec::new();
        for conversation in self.conversations.values() {
            if self.pending_end.contains(&conversation.id) {
                continue;
            }
            let silent_for = tick.saturating_sub(conversation.last_interaction_tick);
            let present = conversation
                .participants
                .iter()
                .filter_map(|id| world.actor(id))
                .filter(|actor| actor.alive && actor.location == conversation.location)
                .count();
            if silent_for > self.timeout_ticks {
                ended.push((conversation.id, conversation.location.clone(), EndReason::Timeout));
            } else if present < 2 {
                ended.push((conversation.id, conversation.location.clone(), EndReason::Dispersed));
            }
        }
        ended
            .into_iter()
            .map(|(id, location, reason)| self.end(id, location, reason, tick))
            .collect()
    }

    fn on_talk(&mut self, world: &World, event: &Event) -> Vec<Event> {
        let Some(speaker) = event.actor_id.as_ref() else {
            return Vec::new();
        };
        let addressee = event.target_actor();
        let content = event.payload_str("content").unwrap_or_default();

        if let Some(conversation) = self
            .conversations
            .values_mut()
            .find(|conversation| conversation.is_participant(speaker))
        {
            if !conversation.is_current_speaker(speaker) {
                debug!(speaker = %speaker, conversation = %conversation.id, "Out-of-turn talk ignored");
                return Vec::new();
            }
            conversation.transcript.push(Utterance {
                tick: event.tick,
                speaker: speaker.clone(),
                content: content.to_owned(),
                interjection: false,
            });
            conversation.last_interaction_tick = event.tick;
            let next = addressee
                .filter(|id| *id != speaker && conversation.is_participant(id))
                .or_else(|| conversation.next_after(speaker))
                .cloned();
            if let Some(next) = next {
                conversation.current_speaker = next;
            }
            return Vec::new();
        }

        let Some(addressee) = addressee else {
            return Vec::new();
        };
        if addressee == speaker
            || !world.co_located(speaker, addressee)
            || self.conversation_of(addressee).is_some()
        {
            return Vec::new();
        }
        let Some(location) = world.actor(speaker).map(|actor| actor.location.clone()) else {
            return Vec::new();
        };
        let id = ConversationId::derive(speaker, addressee, event.tick);
        vec![
            Event::new(EventType::ConversationStarted, event.tick, speaker.clone())
                .with_target(EntityRef::Actor(addressee.clone()))
                .with_target(EntityRef::Conversation(id))
                .with_payload("conversation_id", id.to_string())
                .with_payload("location", location.as_str())
                .with_payload("content", content),
        ]
    }

    fn on_started(&mut self, event: &Event) {
        let (Some(initiator), Some(addressee), Some(id)) = (
            event.actor_id.as_ref(),
            event.target_actor(),
            event.target_conversation(),
        ) else {
            return;
        };
        let Some(location) = event.payload_str("location") else {
            return;
        };
        if self.conversations.contains_key(&id)
            || self.conversation_of(initiator).is_some()
            || self.conversation_of(addressee).is_some()
        {
            debug!(conversation = %id, "Conversation already open or participants busy");
            return;
        }

        let conversation = Conversation {
            id,
            location: LocationId::new(location),
            participants: [initiator.clone(), addressee.clone()].into_iter().collect(),
            turn_order: vec![initiator.clone(), addressee.clone()],
            current_speaker: addressee.clone(),
            transcript: vec![Utterance {
                tick: event.tick,
                speaker: initiator.clone(),
                content: event.payload_str("content").unwrap_or_default().to_owned(),
                interjection: false,
            }],
            started_tick: event.tick,
            last_interaction_tick: event.tick,
        };
        info!(
            tick = event.tick,
            conversation = %id,
            initiator = %initiator,
            addressee = %addressee,
            location,
            "Conversation started"
        );
        self.conversations.insert(id, conversation);
    }

    fn on_interject(&mut self, event: &Event) {
        let (Some(actor), Some(id)) = (event.actor_id.as_ref(), event.target_conversation()) else {
            return;
        };
        if self.conversation_of(actor).is_some() {
            return;
        }
        let Some(conversation) = self.conversations.get_mut(&id) else {
            return;
        };
        conversation.participants.insert(actor.clone());
        conversation.turn_order.push(actor.clone());
        conversation.transcript.push(Utterance {
            tick: event.tick,
            speaker: actor.clone(),
            content: event.payload_str("content").unwrap_or_default().to_owned(),
            interjection: true,
        });
        conversation.last_interaction_tick = event.tick;
        debug!(tick = event.tick, conversation = %id, actor = %actor, "Actor joined conversation");
    }

    /// Remove the event's actor from their conversation. For movement,
    /// `arrived` is where they went; arriving at the pinned location
    /// itself is not a departure.
    fn on_departure(&mut self, event: &Event, arrived: Option<&LocationId>) -> Vec<Event> {
        let Some(actor) = event.actor_id.as_ref() else {
            return Vec::new();
        };
        let Some(conversation) = self
            .conversations
            .values_mut()
            .find(|conversation| conversation.is_participant(actor))
        else {
            return Vec::new();
        };
        if arrived.is_some_and(|to| *to == conversation.location) {
            return Vec::new();
        }

        let had_floor = conversation.is_current_speaker(actor);
        let next = conversation
            .next_after(actor)
            .filter(|next| *next != actor)
            .cloned();
        conversation.participants.remove(actor);
        conversation.turn_order.retain(|id| id != actor);
        if let Some(next) = next.filter(|_| had_floor) {
            conversation.current_speaker = next;
        }
        conversation.last_interaction_tick = event.tick;
        debug!(
            tick = event.tick,
            conversation = %conversation.id,
            actor = %actor,
            remaining = conversation.participants.len(),
            "Actor left conversation"
        );

        if conversation.participants.len() >= 2 || self.pending_end.contains(&conversation.id) {
            return Vec::new();
        }
        let (id, location) = (conversation.id, conversation.location.clone());
        vec![self.end(id, location, EndReason::ParticipantsLeft, event.tick)]
    }

    fn on_ended(&mut self, event: &Event) {
        let Some(id) = event.target_conversation() else {
            return;
        };
        self.pending_end.remove(&id);
        if let Some(conversation) = self.conversations.remove(&id) {
            info!(
                tick = event.tick,
                conversation = %id,
                reason = event.payload_str("reason").unwrap_or("unknown"),
                lines = conversation.transcript.len(),
                "Conversation ended"
            );
        }
    }

    fn end(&mut self, id: ConversationId, location: LocationId, reason: EndReason, tick: u64) -> Event {
        self.pending_end.insert(id);
        Event::system(EventType::ConversationEnded, tick)
            .with_target(EntityRef::Conversation(id))
            .with_payload("conversation_id", id.to_string())
            .with_payload("location", location.as_str())
            .with_payload("reason", reason.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use skald_world::mutation::{self, Outcome};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;

    fn world() -> World {
        starter_world().hydrate(HydrationOptions::default()).unwrap()
    }

    fn id(key: &str) -> ActorId {
        ActorId::new(key)
    }

    /// Apply `event` and everything it causes, like the scheduler's drain.
    fn drain(world: &mut World, board: &mut ConversationBoard, event: Event) {
        let mut queue = std::collections::VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            if let Outcome::Applied(effect) = mutation::apply(world, &event) {
                queue.extend(effect.follow_ups.iter().cloned());
                queue.extend(board.observe(world, &event, &effect));
            }
        }
    }

    fn talk(tick: u64, speaker: &str, to: Option<&str>, content: &str) -> Event {
        let event = Event::new(EventType::Talk, tick, id(speaker)).with_payload("content", content);
        match to {
            Some(to) => event.with_target(EntityRef::Actor(id(to))),
            None => event,
        }
    }

    fn open_conversation(world: &mut World, board: &mut ConversationBoard) -> ConversationId {
        drain(world, board, talk(1, starter::HERO, Some(starter::BARKEEP), "An ale, please."));
        board.conversation_of(&id(starter::HERO)).unwrap().id
    }

    #[test]
    fn addressed_talk_opens_a_conversation() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        let conversation_id = open_conversation(&mut world, &mut board);

        let conversation = board.get(&conversation_id).unwrap();
        assert_eq!(conversation.turn_order, vec![id(starter::HERO), id(starter::BARKEEP)]);
        assert_eq!(conversation.current_speaker, id(starter::BARKEEP));
        assert_eq!(conversation.transcript[0].content, "An ale, please.");
        assert_eq!(conversation_id, ConversationId::derive(&id(starter::HERO), &id(starter::BARKEEP), 1));
    }

    #[test]
    fn unaddressed_talk_opens_nothing() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        drain(&mut world, &mut board, talk(1, starter::HERO, None, "Hello?"));
        assert!(board.conversations().is_empty());
    }

    #[test]
    fn floor_passes_in_turn() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        let conversation_id = open_conversation(&mut world, &mut board);

        drain(&mut world, &mut board, talk(2, starter::BARKEEP, None, "Coming up."));
        let conversation = board.get(&conversation_id).unwrap();
        assert_eq!(conversation.current_speaker, id(starter::HERO));
        assert_eq!(conversation.transcript.len(), 2);
        assert_eq!(conversation.last_interaction_tick, 2);
    }

    #[test]
    fn leaving_a_pair_dissolves_immediately() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        let conversation_id = open_conversation(&mut world, &mut board);

        let leave = Event::new(EventType::LeaveConversation, 2, id(starter::BARKEEP))
            .with_target(EntityRef::Conversation(conversation_id));
        drain(&mut world, &mut board, leave);
        assert!(board.conversations().is_empty());
    }

    #[test]
    fn walking_away_is_leaving() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        open_conversation(&mut world, &mut board);

        let step = Event::new(EventType::Move, 2, id(starter::HERO))
            .with_target(EntityRef::Location(LocationId::new(starter::STREET)));
        drain(&mut world, &mut board, step);
        assert!(board.conversations().is_empty());
    }

    #[test]
    fn silence_must_exceed_the_timeout() {
        let mut world = world();
        let mut board = ConversationBoard::new(5);
        open_conversation(&mut world, &mut board);

        // Last interaction at tick 1: five silent ticks is not yet too many.
        assert!(board.sweep(&world, 6).is_empty());
        let ended = board.sweep(&world, 7);
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].payload_str("reason"), Some("timeout"));
        // Already pending: a second sweep does not duplicate the end.
        assert!(board.sweep(&world, 8).is_empty());

        drain(&mut world, &mut board, ended[0].clone());
        assert!(board.conversations().is_empty());
    }

    #[test]
    fn interjecting_joins_without_taking_the_floor() {
        let mut world = world();
        let mut board = ConversationBoard::new(300);
        let conversation_id = open_conversation(&mut world, &mut board);

        let arrive = Event::new(EventType::Move, 2, id(starter::GUARD))
            .with_target(EntityRef::Location(LocationId::new(starter::TAVERN)));
        drain(&mut world, &mut board, arrive);
        let interject = Event::new(EventType::Interject, 3, id(starter::GUARD))
            .with_target(EntityRef::Conversation(conversation_id))
            .with_payload("content", "Keep it down.");
        drain(&mut world, &mut board, interject);

        let conversation = board.get(&conversation_id).unwrap();
        assert_eq!(
            conversation.turn_order,
            vec![id(starter::HERO), id(starter::BARKEEP), id(starter::GUARD)]
        );
        assert!(conversation.is_participant(&id(starter::GUARD)));
        assert_eq!(conversation.current_speaker, id(starter::BARKEEP));
        assert_eq!(conversation.last_interaction_tick, 3);
        let flags: Vec<bool> = conversation.transcript.iter().map(|line| line.interjection).collect();
        assert_eq!(flags, vec![false, true]);
        assert_eq!(conversation.transcript[1].content, "Keep it down.");
    }
}
