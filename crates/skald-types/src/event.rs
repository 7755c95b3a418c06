//! The event envelope: the only unit of state change.
//!
//! Tools produce events, the mutation engine consumes each exactly once.
//! Events are never edited after construction; the builder methods below
//! consume and return `self` so an event is complete before it is queued.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::enums::EventType;
use crate::ids::{ActorId, ConversationId, ItemId, LocationId};

/// A typed reference to something an event acts upon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EntityRef {
    /// An actor.
    Actor(ActorId),
    /// An item instance.
    Item(ItemId),
    /// A location.
    Location(LocationId),
    /// A conversation.
    Conversation(ConversationId),
}

/// An immutable record of something that happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// What kind of change this is.
    #[ts(type = "string")]
    pub event_type: EventType,
    /// The tick the event was scheduled for.
    pub tick: u64,
    /// The actor who caused the event, absent for system events.
    pub actor_id: Option<ActorId>,
    /// Entities the event acts upon, in handler-specific order.
    pub target_ids: Vec<EntityRef>,
    /// Type-specific data. Ordered so serialisation is stable.
    pub payload: BTreeMap<String, Value>,
}

impl Event {
    /// Start an event caused by `actor`.
    pub const fn new(event_type: EventType, tick: u64, actor: ActorId) -> Self {
        Self {
            event_type,
            tick,
            actor_id: Some(actor),
            target_ids: Vec::new(),
            payload: BTreeMap::new(),
        }
    }

    /// Start an event with no acting actor (conversation bookkeeping).
    pub const fn system(event_type: EventType, tick: u64) -> Self {
        Self {
            event_type,
            tick,
            actor_id: None,
            target_ids: Vec::new(),
            payload: BTreeMap::new(),
        }
    }

    /// Append a target reference.
    #[must_use]
    pub fn with_target(mut self, target: EntityRef) -> Self {
        self.target_ids.push(target);
        self
    }

    /// Set a payload field.
    #[must_use]
    pub fn with_payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_owned(), value.into());
        self
    }

    /// The first actor target, if any.
    pub fn target_actor(&self) -> Option<&ActorId> {
        self.target_ids.iter().find_map(|target| match target {
            EntityRef::Actor(id) => Some(id),
            _ => None,
        })
    }

    /// The first item target, if any.
    pub fn target_item(&self) -> Option<&ItemId> {
        self.target_ids.iter().find_map(|target| match target {
            EntityRef::Item(id) => Some(id),
            _ => None,
        })
    }

    /// The first location target, if any.
    pub fn target_location(&self) -> Option<&LocationId> {
        self.target_ids.iter().find_map(|target| match target {
            EntityRef::Location(id) => Some(id),
            _ => None,
        })
    }

    /// The first conversation target, if any.
    pub fn target_conversation(&self) -> Option<ConversationId> {
        self.target_ids.iter().find_map(|target| match target {
            EntityRef::Conversation(id) => Some(*id),
            _ => None,
        })
    }

    /// A string payload field.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// An unsigned integer payload field.
    pub fn payload_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    /// A boolean payload field.
    pub fn payload_bool(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(Value::as_bool)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_targets_and_payload() {
        let event = Event::new(EventType::Give, 3, ActorId::new("hero"))
            .with_target(EntityRef::Item(ItemId::new("bread-1")))
            .with_target(EntityRef::Actor(ActorId::new("barkeep")))
            .with_payload("note", "a gift");

        assert_eq!(event.target_item(), Some(&ItemId::new("bread-1")));
        assert_eq!(event.target_actor(), Some(&ActorId::new("barkeep")));
        assert_eq!(event.target_location(), None);
        assert_eq!(event.payload_str("note"), Some("a gift"));
    }

    #[test]
    fn wire_format_is_stable() {
        let event = Event::new(EventType::Move, 1, ActorId::new("hero"))
            .with_target(EntityRef::Location(LocationId::new("street")))
            .with_payload("to", "street")
            .with_payload("from", "tavern");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event_type":"move","tick":1,"actor_id":"hero","target_ids":[{"kind":"location","id":"street"}],"payload":{"from":"tavern","to":"street"}}"#
        );
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
