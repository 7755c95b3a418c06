//! Perception records and the bounded short-term memory that stores them.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::enums::EventType;
use crate::event::{EntityRef, Event};
use crate::ids::{ActorId, LocationId};

/// Default number of perception records an actor remembers.
pub const DEFAULT_MEMORY_CAPACITY: usize = 30;

/// A compact projection of an applied event, as one actor perceived it.
///
/// This is a memory entry, not authoritative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PerceptionRecord {
    /// What happened.
    #[ts(type = "string")]
    pub event_type: EventType,
    /// When it happened.
    pub tick: u64,
    /// Who did it.
    pub actor_id: Option<ActorId>,
    /// Who or what it was done to.
    pub target_ids: Vec<EntityRef>,
    /// Where it happened.
    pub location: LocationId,
    /// Summary data copied from the event.
    pub payload: BTreeMap<String, Value>,
}

impl PerceptionRecord {
    /// Project an event that happened at `location`.
    pub fn from_event(event: &Event, location: LocationId) -> Self {
        Self {
            event_type: event.event_type.clone(),
            tick: event.tick,
            actor_id: event.actor_id.clone(),
            target_ids: event.target_ids.clone(),
            location,
            payload: event.payload.clone(),
        }
    }
}

/// Fixed-capacity, oldest-first-evicted sequence of perception records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermMemory {
    capacity: usize,
    records: VecDeque<PerceptionRecord>,
    /// Records ever pushed, including evicted ones.
    #[serde(default)]
    received: u64,
}

impl ShortTermMemory {
    /// Create an empty memory holding at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
            received: 0,
        }
    }

    /// Append a record, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, record: PerceptionRecord) {
        self.received = self.received.saturating_add(1);
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Maximum number of records retained.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &PerceptionRecord> {
        self.records.iter()
    }

    /// How many records have ever been pushed. Unlike [`Self::len`] this
    /// keeps counting past the capacity.
    pub const fn received(&self) -> u64 {
        self.received
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&PerceptionRecord> {
        self.records.back()
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tick: u64) -> PerceptionRecord {
        let event = Event::new(EventType::Talk, tick, ActorId::new("barkeep"))
            .with_payload("content", "hello");
        PerceptionRecord::from_event(&event, LocationId::new("tavern"))
    }

    #[test]
    fn evicts_oldest_first() {
        let mut memory = ShortTermMemory::with_capacity(3);
        for tick in 0..5 {
            memory.push(record(tick));
        }
        let ticks: Vec<u64> = memory.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
        assert_eq!(memory.len(), memory.capacity());
        assert_eq!(memory.received(), 5);
    }

    #[test]
    fn zero_capacity_remembers_nothing() {
        let mut memory = ShortTermMemory::with_capacity(0);
        memory.push(record(1));
        assert!(memory.is_empty());
    }
}
