//! Location node with passage states and derived occupancy indexes.
//!
//! A [`LocationState`] wraps the immutable [`LocationStatic`] identity and
//! adds the dynamic half: the status of each passage leading out, and the
//! actors and items currently here. The occupancy sets are lookup indexes
//! derived from each actor's and item's own placement field; they never
//! own anything and only the mutation engine updates them.

use std::collections::{BTreeMap, BTreeSet};

use skald_types::{ActorId, ItemId, LocationId, LocationStatic, PassageStatus};

/// Runtime state for a location in the world graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
    info: LocationStatic,
    connections: BTreeMap<LocationId, PassageStatus>,
    occupants: BTreeSet<ActorId>,
    items: BTreeSet<ItemId>,
}

impl LocationState {
    /// Create a location with no connections and nobody present.
    pub(crate) const fn new(info: LocationStatic) -> Self {
        Self {
            info,
            connections: BTreeMap::new(),
            occupants: BTreeSet::new(),
            items: BTreeSet::new(),
        }
    }

    /// Static identity and description.
    pub const fn info(&self) -> &LocationStatic {
        &self.info
    }

    /// Location key.
    pub const fn id(&self) -> &LocationId {
        &self.info.id
    }

    /// Passages leading out, by neighbour.
    pub const fn connections(&self) -> &BTreeMap<LocationId, PassageStatus> {
        &self.connections
    }

    /// Status of the passage to `neighbour`, if one exists.
    pub fn passage_to(&self, neighbour: &LocationId) -> Option<PassageStatus> {
        self.connections.get(neighbour).copied()
    }

    /// Living actors currently here.
    pub const fn occupants(&self) -> &BTreeSet<ActorId> {
        &self.occupants
    }

    /// Items lying here.
    pub const fn items(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    /// Whether `actor` is here.
    pub fn contains_actor(&self, actor: &ActorId) -> bool {
        self.occupants.contains(actor)
    }

    /// Whether `item` lies here.
    pub fn contains_item(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    pub(crate) fn set_passage(&mut self, neighbour: LocationId, status: PassageStatus) {
        self.connections.insert(neighbour, status);
    }

    pub(crate) fn add_occupant(&mut self, actor: ActorId) {
        self.occupants.insert(actor);
    }

    pub(crate) fn remove_occupant(&mut self, actor: &ActorId) -> bool {
        self.occupants.remove(actor)
    }

    pub(crate) fn add_item(&mut self, item: ItemId) {
        self.items.insert(item);
    }

    pub(crate) fn remove_item(&mut self, item: &ItemId) -> bool {
        self.items.remove(item)
    }
}
