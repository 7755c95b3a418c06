//! Error types for the `skald-world` crate.
//!
//! Hydration and invariant checks return [`WorldError`]. Event application
//! never errors: stale events resolve to no-ops instead.

use skald_types::{ActorId, BlueprintId, ItemId, LocationId};

/// Errors raised while loading or checking a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Failed to read a world definition file.
    #[error("failed to read world definition: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse a world definition.
    #[error("failed to parse world definition: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two entities share a key.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entity kind (`location`, `actor`, ...).
        kind: &'static str,
        /// The repeated key.
        id: String,
    },

    /// A location was referenced but never defined.
    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    /// An actor was referenced but never defined.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// An item was referenced but never defined.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// An item names a blueprint that was never defined.
    #[error("blueprint not found: {0}")]
    BlueprintNotFound(BlueprintId),

    /// The two sides of a passage disagree on its status.
    #[error("passage {from} <-> {to} is declared with conflicting status")]
    PassageMismatch {
        /// One end.
        from: LocationId,
        /// Other end.
        to: LocationId,
    },

    /// An equipment entry names an item the actor does not hold, or a slot
    /// the actor does not have.
    #[error("actor {actor} cannot equip {item} in slot {slot}")]
    InvalidEquipment {
        /// The actor.
        actor: ActorId,
        /// The item.
        item: ItemId,
        /// The slot.
        slot: String,
    },

    /// A derived index disagrees with authoritative placement data.
    #[error("world invariant violated: {0}")]
    InvariantViolated(String),
}

impl From<serde_yml::Error> for WorldError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
