//! Intent sources and the context handed to them.
//!
//! When an actor's turn comes up, the scheduler assembles a
//! [`PlannerContext`] and asks an [`IntentSource`] for one [`Intent`]. The
//! source might be a human at a terminal, a language-model planner, a
//! script, or a replay log. Whatever it returns is untrusted and goes
//! through the tool registry like anything else.
//!
//! A source that fails returns a [`PlannerError`]; the scheduler then runs
//! the deterministic fallback instead of stalling.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use skald_actors::ToolDescriptor;
use skald_types::{
    ActorId, ConversationSnapshot, Goal, HungerStage, Intent, IntentParseError, ItemId, LocationId,
    MemoryEntry, PassageStatus, PerceptionRecord,
};
use skald_world::World;

/// Errors an intent source can report.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// No proposal arrived before the deadline.
    #[error("actor {actor_id} timed out (deadline: {deadline_ms}ms)")]
    Timeout {
        /// The actor whose turn it was.
        actor_id: ActorId,
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The source had nothing to offer.
    #[error("no intent available for actor {actor_id}")]
    NoIntent {
        /// The actor whose turn it was.
        actor_id: ActorId,
    },

    /// The proposal could not be parsed.
    #[error("malformed proposal: {source}")]
    Malformed {
        /// The parse failure.
        #[from]
        source: IntentParseError,
    },

    /// An internal error in the intent source.
    #[error("intent source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// An item as the planner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    /// Item key.
    pub id: ItemId,
    /// Display name.
    pub name: String,
}

/// The acting actor as the planner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorView {
    /// Actor key.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Whether a human drives this actor.
    pub is_player: bool,
    /// Current hit points.
    pub hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Hunger stage.
    pub hunger_stage: HungerStage,
    /// Carried items.
    pub inventory: Vec<ItemView>,
    /// Equipment by slot.
    pub equipment: BTreeMap<String, Option<ItemView>>,
    /// Locations the actor knows of.
    pub known_locations: Vec<LocationId>,
}

/// A way out of the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitView {
    /// Neighbour key.
    pub to: LocationId,
    /// Neighbour name.
    pub name: String,
    /// Passage state.
    pub status: PassageStatus,
}

/// Someone else present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupantView {
    /// Actor key.
    pub id: ActorId,
    /// Display name.
    pub name: String,
}

/// The current location as the planner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationView {
    /// Location key.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Prose description.
    pub description: String,
    /// Exits with their passage state.
    pub exits: Vec<ExitView>,
    /// Other living actors here.
    pub occupants: Vec<OccupantView>,
    /// Items lying here.
    pub items: Vec<ItemView>,
}

/// Open goals handed to the planner, highest priority first.
pub const PLANNER_GOALS: usize = 5;

/// Most recent core memories handed to the planner.
pub const PLANNER_CORE_MEMORIES: usize = 10;

/// Long-term memories recalled for the planner.
pub const PLANNER_RECALLED: usize = 5;

/// Everything an intent source is told about one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannerContext {
    /// The current tick.
    pub tick: u64,
    /// The acting actor.
    pub actor: ActorView,
    /// Recent perceptions, oldest first.
    pub memory: Vec<PerceptionRecord>,
    /// Perceptions ever received, including those already forgotten. The
    /// last `memory` entries arrived since the count stood lower.
    pub perceived_total: u64,
    /// Open goals, highest priority first.
    pub goals: Vec<Goal>,
    /// Retrievable core memories, oldest first.
    pub core_memories: Vec<MemoryEntry>,
    /// Long-term memories sharing the most words with recent perceptions
    /// and conversation.
    pub recalled: Vec<MemoryEntry>,
    /// Where the actor stands.
    pub location: LocationView,
    /// The conversation the actor is part of, if any.
    pub conversation: Option<ConversationSnapshot>,
    /// Tools on offer.
    pub tools: Vec<ToolDescriptor>,
}

impl PlannerContext {
    /// Assemble the context for `actor_id`'s turn.
    ///
    /// Returns `None` if the actor or their location does not exist.
    pub fn assemble(
        world: &World,
        actor_id: &ActorId,
        tick: u64,
        conversation: Option<ConversationSnapshot>,
        tools: Vec<ToolDescriptor>,
    ) -> Option<Self> {
        let actor = world.actor(actor_id)?;
        let here = world.location(&actor.location)?;
        let item_view = |id: &ItemId| ItemView {
            id: id.clone(),
            name: world.item_name(id),
        };

        let actor_view = ActorView {
            id: actor.id.clone(),
            name: actor.name.clone(),
            is_player: actor.is_player,
            hp: actor.hp,
            max_hp: actor.attributes.max_hp(),
            hunger_stage: actor.hunger_stage,
            inventory: actor.inventory.iter().map(item_view).collect(),
            equipment: actor
                .slots
                .iter()
                .map(|(slot, occupant)| (slot.clone(), occupant.as_ref().map(item_view)))
                .collect(),
            known_locations: actor.known_locations.iter().cloned().collect(),
        };

        let location = LocationView {
            id: here.id().clone(),
            name: here.info().name.clone(),
            description: here.info().description.clone(),
            exits: here
                .connections()
                .iter()
                .map(|(to, status)| ExitView {
                    to: to.clone(),
                    name: world
                        .location(to)
                        .map_or_else(|| to.to_string(), |loc| loc.info().name.clone()),
                    status: *status,
                })
                .collect(),
            occupants: here
                .occupants()
                .iter()
                .filter(|id| *id != actor_id)
                .filter_map(|id| world.actor(id))
                .map(|other| OccupantView {
                    id: other.id.clone(),
                    name: other.name.clone(),
                })
                .collect(),
            items: here.items().iter().map(item_view).collect(),
        };

        let memory: Vec<PerceptionRecord> = actor.memory.iter().cloned().collect();
        let cues = recall_cues(&memory, conversation.as_ref());
        let mind = &actor.mind;
        let mut core_memories: Vec<MemoryEntry> = mind
            .core_memories
            .iter()
            .rev()
            .filter(|entry| entry.status.is_retrievable())
            .take(PLANNER_CORE_MEMORIES)
            .cloned()
            .collect();
        core_memories.reverse();

        Some(Self {
            tick,
            actor: actor_view,
            perceived_total: actor.memory.received(),
            memory,
            goals: mind
                .live_goals(tick)
                .into_iter()
                .take(PLANNER_GOALS)
                .cloned()
                .collect(),
            core_memories,
            recalled: mind
                .recall(&cues, PLANNER_RECALLED)
                .into_iter()
                .cloned()
                .collect(),
            location,
            conversation,
            tools,
        })
    }

    /// The acting actor's key.
    pub const fn actor_id(&self) -> &ActorId {
        &self.actor.id
    }
}

/// Words to recall long-term memories by: whatever text recent
/// perceptions and the conversation carry.
fn recall_cues(memory: &[PerceptionRecord], conversation: Option<&ConversationSnapshot>) -> String {
    let perceived = memory.iter().flat_map(|record| {
        std::iter::once(record.event_type.as_str().to_owned())
            .chain(record.payload.values().filter_map(|value| value.as_str().map(str::to_owned)))
    });
    let spoken = conversation
        .into_iter()
        .flat_map(|conversation| conversation.recent.iter().map(|line| line.content.clone()));
    perceived.chain(spoken).collect::<Vec<_>>().join(" ")
}

/// A source of intents.
///
/// Called once per turn, strictly one actor at a time.
pub trait IntentSource {
    /// Propose one intent for the actor described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError`] when no usable proposal can be produced.
    /// The scheduler substitutes the fallback intent.
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError>;

    /// Whether this source has permanently run dry (for example, the
    /// terminal closed). The runner stops when it has.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// An intent source that always waits one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePlanner;

impl IdlePlanner {
    /// Create a new idle planner.
    pub const fn new() -> Self {
        Self
    }
}

impl IntentSource for IdlePlanner {
    fn next_intent(&mut self, _ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        Ok(Intent::wait(1))
    }
}

/// One scripted proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// A well-formed intent.
    Intent(Intent),
    /// Raw text, parsed as JSON when its turn comes.
    Raw(String),
}

/// Per-actor FIFO queues of proposals.
///
/// An actor whose queue is empty waits one tick.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIntents {
    queues: BTreeMap<ActorId, VecDeque<Scripted>>,
}

impl ScriptedIntents {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `intent` for `actor`.
    pub fn push(&mut self, actor: impl Into<ActorId>, intent: Intent) -> &mut Self {
        self.queues
            .entry(actor.into())
            .or_default()
            .push_back(Scripted::Intent(intent));
        self
    }

    /// Queue raw, possibly malformed, proposal text for `actor`.
    pub fn push_raw(&mut self, actor: impl Into<ActorId>, raw: impl Into<String>) -> &mut Self {
        self.queues
            .entry(actor.into())
            .or_default()
            .push_back(Scripted::Raw(raw.into()));
        self
    }

    /// Proposals still queued for `actor`.
    pub fn remaining(&self, actor: &ActorId) -> usize {
        self.queues.get(actor).map_or(0, VecDeque::len)
    }
}

impl IntentSource for ScriptedIntents {
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        match self
            .queues
            .get_mut(ctx.actor_id())
            .and_then(VecDeque::pop_front)
        {
            Some(Scripted::Intent(intent)) => Ok(intent),
            Some(Scripted::Raw(raw)) => Ok(Intent::from_json(&raw)?),
            None => Ok(Intent::wait(1)),
        }
    }
}

/// Sends player turns to one source and everyone else to another.
#[derive(Debug, Clone, Default)]
pub struct RoutedSource<P, N> {
    /// Source for actors with `is_player` set.
    pub player: P,
    /// Source for every other actor.
    pub npc: N,
}

impl<P: IntentSource, N: IntentSource> RoutedSource<P, N> {
    /// Route between `player` and `npc`.
    pub const fn new(player: P, npc: N) -> Self {
        Self { player, npc }
    }
}

impl<P: IntentSource, N: IntentSource> IntentSource for RoutedSource<P, N> {
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        if ctx.actor.is_player {
            self.player.next_intent(ctx)
        } else {
            self.npc.next_intent(ctx)
        }
    }

    fn is_exhausted(&self) -> bool {
        self.player.is_exhausted()
    }
}
