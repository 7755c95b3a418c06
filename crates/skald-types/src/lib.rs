//! Shared type definitions for the Skald adventure kernel.
//!
//! This crate is the single source of truth for the data that flows
//! between the world, the tools, and the scheduler. Observer-facing types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for actors, locations, items, conversations
//! - [`enums`] -- Event types, entity state enums, rejection and no-op reasons
//! - [`event`] -- The immutable event envelope
//! - [`structs`] -- Actors, item blueprints and instances, static locations
//! - [`memory`] -- Perception records and bounded short-term memory
//! - [`mind`] -- Long-term memories, goals, and relationships
//! - [`conversation`] -- Conversation data and snapshots
//! - [`intent`] -- Unvalidated `{tool, params}` proposals
//! - [`snapshot`] -- Per-tick world snapshots and narration records

pub mod conversation;
pub mod enums;
pub mod event;
pub mod ids;
pub mod intent;
pub mod memory;
pub mod mind;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use conversation::{Conversation, ConversationSnapshot, Utterance};
pub use enums::{EventType, HungerStage, NoOpReason, PassageStatus, Proficiency, RejectionReason};
pub use event::{EntityRef, Event};
pub use ids::{ActorId, BlueprintId, ConversationId, ItemId, LocationId};
pub use intent::{Intent, IntentParseError};
pub use memory::{DEFAULT_MEMORY_CAPACITY, PerceptionRecord, ShortTermMemory};
pub use mind::{
    Goal, GoalStatus, MemoryDraft, MemoryEntry, MemoryStatus, Mind, MindChange, Priority, Reflection,
};
pub use snapshot::{
    ActorSnapshot, ConnectionSnapshot, NarrationOutcome, NarrationRecord, WorldSnapshot,
};
pub use structs::{
    Actor, Attributes, ItemBlueprint, ItemInstance, LocationStatic, PROPERTY_FINESSE,
    PROPERTY_FOOD, Placement, ability_modifier,
};
