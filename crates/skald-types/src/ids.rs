//! Type-safe identifier wrappers.
//!
//! World entities (actors, locations, items, blueprints) are authored in the
//! persisted world definition, so their identifiers are human-readable keys
//! such as `"tavern"` or `"barkeep"`. Conversations are created at runtime
//! and use UUID v5 identifiers derived from their participants and the tick
//! they started on, which keeps replays byte-identical.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a `String` key with standard derives.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like key.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

define_key! {
    /// Unique identifier for an actor (player or NPC).
    ActorId
}

define_key! {
    /// Unique identifier for a location (node in the world graph).
    LocationId
}

define_key! {
    /// Unique identifier for a concrete item instance.
    ItemId
}

define_key! {
    /// Unique identifier for an immutable item template.
    BlueprintId
}

/// Namespace for conversation identifiers.
const CONVERSATION_NAMESPACE: Uuid = Uuid::from_u128(0x6b1d_2c4e_93a7_5f08_b2c1_7e4d_0a9f_3c55);

/// Unique identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Derive the identifier of a conversation opened by `initiator`
    /// addressing `addressee` on `tick`.
    ///
    /// The same inputs always produce the same identifier.
    pub fn derive(initiator: &ActorId, addressee: &ActorId, tick: u64) -> Self {
        let name = format!("{initiator}\u{1f}{addressee}\u{1f}{tick}");
        Self(Uuid::new_v5(&CONVERSATION_NAMESPACE, name.as_bytes()))
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl core::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConversationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_serialize_as_plain_strings() {
        let id = ActorId::new("barkeep");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"barkeep\""));
    }

    #[test]
    fn key_display_matches_inner() {
        let id = LocationId::from("tavern");
        assert_eq!(id.to_string(), "tavern");
        assert_eq!(id.as_str(), "tavern");
    }

    #[test]
    fn conversation_ids_are_deterministic() {
        let a = ActorId::new("hero");
        let b = ActorId::new("barkeep");
        assert_eq!(ConversationId::derive(&a, &b, 7), ConversationId::derive(&a, &b, 7));
        assert_ne!(ConversationId::derive(&a, &b, 7), ConversationId::derive(&a, &b, 8));
        assert_ne!(ConversationId::derive(&a, &b, 7), ConversationId::derive(&b, &a, 7));
    }
}
