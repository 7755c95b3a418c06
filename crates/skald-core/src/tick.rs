//! The tick cycle: the heartbeat of the adventure.
//!
//! [`Simulator::run_tick`] executes one complete tick `t` in fixed phases:
//!
//! 1. **Eligibility** -- living actors with `next_available_tick <= t`,
//!    ordered by `(next_available_tick, creation order)`.
//! 2. **Turns** -- one at a time, each eligible actor is asked for an intent,
//!    the intent goes through the tool registry, and the resulting events are
//!    queued and drained before the next actor is asked. Eligibility is
//!    checked again right before each turn, so an actor killed earlier in
//!    the tick loses their turn.
//! 3. **Passive effects** -- the conversation sweep and hunger progression
//!    emit events which are drained like any other.
//! 4. **Snapshot** -- exactly one [`WorldSnapshot`] closes the tick, then
//!    the clock advances.
//!
//! Draining sends every event through [`mutation::apply`]. Applied events
//! reach the perception router and the conversation board; their follow-ups
//! and the board's reactions go to the back of the queue. Every drained
//! event, no-ops included, becomes a [`NarrationRecord`].

use std::collections::VecDeque;

use serde::Serialize;
use skald_actors::{
    HungerConfig, Prepared, Rejection, ToolContext, ToolError, ToolRegistry, ToolRules, vitals,
};
use skald_types::{
    ActorId, Conversation, Event, Intent, NarrationOutcome, NarrationRecord, RejectionReason, WorldSnapshot,
};
use skald_world::mutation::{self, Outcome};
use skald_world::{World, WorldError};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::conversation::ConversationBoard;
use crate::perception;
use crate::planner::{IntentSource, PlannerContext, PlannerError};
use crate::snapshot;

/// Errors that stop the tick loop.
///
/// Bad proposals never end up here: they are rejections or fallbacks. These
/// are failures of the simulator itself.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The tool registry could not be configured.
    #[error("tool registry error: {source}")]
    Tools {
        /// The underlying registry error.
        #[from]
        source: ToolError,
    },

    /// The deterministic fallback itself was refused.
    #[error("fallback for {actor_id} rejected: {source}")]
    FallbackRejected {
        /// The actor whose turn it was.
        actor_id: ActorId,
        /// The rejection.
        source: Rejection,
    },
}

/// Why a turn fell back to waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// The intent source missed its deadline.
    Timeout,
    /// The intent source failed or had nothing to offer.
    PlannerFailed,
    /// The proposal could not be parsed.
    MalformedIntent,
    /// The proposal named a tool that does not exist.
    UnknownTool,
}

impl FallbackCause {
    const fn from_planner(error: &PlannerError) -> Self {
        match error {
            PlannerError::Timeout { .. } => Self::Timeout,
            PlannerError::Malformed { .. } => Self::MalformedIntent,
            PlannerError::NoIntent { .. } | PlannerError::Internal { .. } => Self::PlannerFailed,
        }
    }

    /// Rejections that mean the proposal was unusable rather than merely
    /// impossible right now.
    const fn from_rejection(reason: RejectionReason) -> Option<Self> {
        if !reason.is_structural() {
            return None;
        }
        match reason {
            RejectionReason::UnknownTool => Some(Self::UnknownTool),
            _ => Some(Self::MalformedIntent),
        }
    }
}

/// What became of one actor's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The intent was accepted and its events queued.
    Accepted {
        /// Ticks charged.
        time_cost: u64,
        /// Number of events generated.
        events: usize,
    },
    /// The intent was refused. The cooldown is unchanged.
    Rejected {
        /// Machine-readable reason.
        reason: RejectionReason,
        /// Human-readable detail.
        detail: String,
    },
    /// The proposal was unusable; the actor waited instead.
    Fallback {
        /// What went wrong.
        cause: FallbackCause,
        /// Human-readable detail.
        detail: String,
        /// Ticks charged for the substitute wait.
        time_cost: u64,
    },
}

/// One actor's turn within a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    /// The acting actor.
    pub actor_id: ActorId,
    /// The proposed tool name, if a proposal arrived.
    pub tool: Option<String>,
    /// What happened.
    pub outcome: TurnOutcome,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Turns taken, in order.
    pub turns: Vec<TurnReport>,
    /// Every drained event with its fate, in drain order.
    pub narration: Vec<NarrationRecord>,
    /// Perception records written into memories.
    pub perceptions_delivered: usize,
    /// Living actors at the end of the tick.
    pub actors_alive: usize,
    /// State at the end of the tick.
    pub snapshot: WorldSnapshot,
}

/// Owns the world and drives it one tick at a time.
#[derive(Debug, Clone)]
pub struct Simulator {
    world: World,
    board: ConversationBoard,
    registry: ToolRegistry,
    clock: WorldClock,
    rules: ToolRules,
    hunger: HungerConfig,
    fallback_wait_ticks: u64,
    queue: VecDeque<Event>,
}

impl Simulator {
    /// Wrap a hydrated world, configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Tools`] if a time cost override names an
    /// unregistered tool.
    pub fn new(world: World, config: &SimulationConfig) -> Result<Self, SimError> {
        let mut registry = ToolRegistry::with_builtin();
        registry.apply_cost_overrides(&config.tools.time_costs)?;
        Ok(Self {
            world,
            board: ConversationBoard::new(config.conversation.timeout_ticks),
            registry,
            clock: WorldClock::new(),
            rules: config.tool_rules(),
            hunger: config.hunger,
            fallback_wait_ticks: config.scheduler.fallback_wait_ticks,
            queue: VecDeque::new(),
        })
    }

    /// The world as it stands.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Live conversations.
    pub const fn board(&self) -> &ConversationBoard {
        &self.board
    }

    /// The tool registry.
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The tick about to run.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Living actors.
    pub fn actors_alive(&self) -> usize {
        self.world.actors().filter(|actor| actor.alive).count()
    }

    /// Execute one complete tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if the fallback is refused, an eligible actor
    /// vanishes, or the clock overflows. Rejected and malformed proposals
    /// are reported in the summary instead.
    pub fn run_tick(&mut self, source: &mut dyn IntentSource) -> Result<TickSummary, SimError> {
        let tick = self.clock.tick();
        let mut turns = Vec::new();
        let mut narration = Vec::new();
        let mut perceptions_delivered: usize = 0;

        for actor_id in self.eligible(tick) {
            if !self.is_eligible(&actor_id, tick) {
                debug!(tick, actor = %actor_id, "Actor lost their turn");
                continue;
            }
            let report = self.take_turn(&actor_id, tick, source)?;
            perceptions_delivered =
                perceptions_delivered.saturating_add(self.drain(&mut narration));
            if let TurnOutcome::Accepted { time_cost, .. } | TurnOutcome::Fallback { time_cost, .. } =
                report.outcome
            {
                mutation::charge_cooldown(&mut self.world, &actor_id, tick.saturating_add(time_cost));
            }
            turns.push(report);
        }

        // Passive effects
        let ended = self.board.sweep(&self.world, tick);
        self.queue.extend(ended);
        self.queue
            .extend(vitals::passive_events(&self.world, tick, &self.hunger));
        perceptions_delivered = perceptions_delivered.saturating_add(self.drain(&mut narration));

        let snapshot = snapshot::capture(&self.world, &self.board, tick);
        let actors_alive = self.actors_alive();
        self.clock.advance()?;

        info!(
            tick,
            turns = turns.len(),
            events = narration.len(),
            perceptions = perceptions_delivered,
            conversations = snapshot.conversations.len(),
            actors_alive,
            "Tick complete"
        );

        Ok(TickSummary {
            tick,
            turns,
            narration,
            perceptions_delivered,
            actors_alive,
            snapshot,
        })
    }

    /// Eligible actors for `tick`, in turn order.
    fn eligible(&self, tick: u64) -> Vec<ActorId> {
        let mut ready: Vec<(u64, usize, ActorId)> = self
            .world
            .actors()
            .filter(|actor| actor.alive && actor.next_available_tick <= tick)
            .map(|actor| {
                let rank = self.world.creation_rank(&actor.id).unwrap_or(usize::MAX);
                (actor.next_available_tick, rank, actor.id.clone())
            })
            .collect();
        ready.sort();
        ready.into_iter().map(|(_, _, id)| id).collect()
    }

    fn is_eligible(&self, actor_id: &ActorId, tick: u64) -> bool {
        self.world
            .actor(actor_id)
            .is_some_and(|actor| actor.alive && actor.next_available_tick <= tick)
    }

    /// Ask for an intent, validate it, and queue its events. The cooldown
    /// is charged by the caller once the events have drained.
    fn take_turn(
        &mut self,
        actor_id: &ActorId,
        tick: u64,
        source: &mut dyn IntentSource,
    ) -> Result<TurnReport, SimError> {
        let conversation = self.board.conversation_of(actor_id).map(Conversation::snapshot);
        let ctx = PlannerContext::assemble(
            &self.world,
            actor_id,
            tick,
            conversation,
            self.registry.catalog(),
        )
        .ok_or_else(|| WorldError::ActorNotFound(actor_id.clone()))?;

        let intent = match source.next_intent(&ctx) {
            Ok(intent) => intent,
            Err(err) => {
                warn!(tick, actor = %actor_id, %err, "Intent source failed, falling back");
                let time_cost = self.fallback(actor_id, tick)?;
                return Ok(TurnReport {
                    actor_id: actor_id.clone(),
                    tool: None,
                    outcome: TurnOutcome::Fallback {
                        cause: FallbackCause::from_planner(&err),
                        detail: err.to_string(),
                        time_cost,
                    },
                });
            }
        };

        let outcome = match self.prepare(actor_id, &intent, tick) {
            Ok(prepared) => {
                debug!(
                    tick,
                    actor = %actor_id,
                    tool = prepared.tool.name(),
                    events = prepared.events.len(),
                    time_cost = prepared.time_cost,
                    "Intent accepted"
                );
                let accepted = TurnOutcome::Accepted {
                    time_cost: prepared.time_cost,
                    events: prepared.events.len(),
                };
                self.queue.extend(prepared.events);
                accepted
            }
            Err(rejection) => match FallbackCause::from_rejection(rejection.reason) {
                Some(cause) => {
                    warn!(tick, actor = %actor_id, %rejection, "Unusable intent, falling back");
                    let time_cost = self.fallback(actor_id, tick)?;
                    TurnOutcome::Fallback {
                        cause,
                        detail: rejection.detail,
                        time_cost,
                    }
                }
                None => {
                    warn!(tick, actor = %actor_id, tool = %intent.tool, %rejection, "Intent rejected");
                    TurnOutcome::Rejected {
                        reason: rejection.reason,
                        detail: rejection.detail,
                    }
                }
            },
        };

        Ok(TurnReport {
            actor_id: actor_id.clone(),
            tool: Some(intent.tool),
            outcome,
        })
    }

    fn prepare(&self, actor_id: &ActorId, intent: &Intent, tick: u64) -> Result<Prepared, Rejection> {
        let ctx = ToolContext {
            world: &self.world,
            conversations: self.board.conversations(),
            tick,
            rules: &self.rules,
        };
        self.registry.prepare(actor_id, intent, &ctx)
    }

    /// Queue the deterministic substitute intent. Returns its cost.
    fn fallback(&mut self, actor_id: &ActorId, tick: u64) -> Result<u64, SimError> {
        let prepared = self
            .prepare(actor_id, &Intent::wait(self.fallback_wait_ticks), tick)
            .map_err(|source| SimError::FallbackRejected {
                actor_id: actor_id.clone(),
                source,
            })?;
        self.queue.extend(prepared.events);
        Ok(prepared.time_cost)
    }

    /// Apply everything queued. Returns the number of perceptions
    /// delivered.
    fn drain(&mut self, narration: &mut Vec<NarrationRecord>) -> usize {
        let mut delivered: usize = 0;
        while let Some(event) = self.queue.pop_front() {
            match mutation::apply(&mut self.world, &event) {
                Outcome::Applied(effect) => {
                    delivered =
                        delivered.saturating_add(perception::route(&mut self.world, &event, &effect));
                    let reactions = self.board.observe(&self.world, &event, &effect);
                    self.queue.extend(effect.follow_ups);
                    self.queue.extend(reactions);
                    narration.push(NarrationRecord {
                        event,
                        outcome: NarrationOutcome::Applied,
                    });
                }
                Outcome::NoOp(no_op) => narration.push(NarrationRecord {
                    event,
                    outcome: NarrationOutcome::NoOp {
                        reason: no_op.reason,
                        detail: no_op.detail,
                    },
                }),
            }
        }
        delivered
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use skald_types::{EventType, NoOpReason};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;
    use crate::planner::ScriptedIntents;

    fn simulator() -> Simulator {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        Simulator::new(world, &SimulationConfig::default()).unwrap()
    }

    fn id(key: &str) -> ActorId {
        ActorId::new(key)
    }

    fn turn<'a>(summary: &'a TickSummary, actor: &str) -> &'a TurnReport {
        summary.turns.iter().find(|turn| turn.actor_id == id(actor)).unwrap()
    }

    #[test]
    fn everyone_acts_in_creation_order_on_tick_zero() {
        let mut sim = simulator();
        let summary = sim.run_tick(&mut ScriptedIntents::new()).unwrap();

        let order: Vec<&str> = summary.turns.iter().map(|turn| turn.actor_id.as_str()).collect();
        assert_eq!(order, [starter::HERO, starter::BARKEEP, starter::GUARD, starter::RAT]);
        assert_eq!(summary.tick, 0);
        assert_eq!(sim.tick(), 1);
        assert_eq!(summary.snapshot.tick, 0);
    }

    #[test]
    fn accepted_intent_charges_its_cost() {
        let mut sim = simulator();
        let mut script = ScriptedIntents::new();
        script.push(
            starter::HERO,
            Intent::new("move").with_param("destination", starter::STREET),
        );
        let summary = sim.run_tick(&mut script).unwrap();

        assert_eq!(
            turn(&summary, starter::HERO).outcome,
            TurnOutcome::Accepted { time_cost: 5, events: 1 }
        );
        let hero = sim.world().actor(&id(starter::HERO)).unwrap();
        assert_eq!(hero.next_available_tick, 5);
        assert_eq!(hero.location.as_str(), starter::STREET);

        // Busy actors sit out until their cooldown expires.
        let summary = sim.run_tick(&mut ScriptedIntents::new()).unwrap();
        assert!(summary.turns.iter().all(|turn| turn.actor_id != id(starter::HERO)));
    }

    #[test]
    fn rejection_leaves_cooldown_alone() {
        let mut sim = simulator();
        let mut script = ScriptedIntents::new();
        script.push(
            starter::HERO,
            Intent::new("move").with_param("destination", starter::CELLAR),
        );
        let summary = sim.run_tick(&mut script).unwrap();

        assert!(matches!(
            turn(&summary, starter::HERO).outcome,
            TurnOutcome::Rejected { reason: RejectionReason::PassageClosed, .. }
        ));
        assert_eq!(sim.world().actor(&id(starter::HERO)).unwrap().next_available_tick, 0);
    }

    #[test]
    fn unknown_tool_falls_back_to_waiting() {
        let mut sim = simulator();
        let mut script = ScriptedIntents::new();
        script.push(starter::HERO, Intent::new("dance"));
        let summary = sim.run_tick(&mut script).unwrap();

        assert!(matches!(
            turn(&summary, starter::HERO).outcome,
            TurnOutcome::Fallback { cause: FallbackCause::UnknownTool, time_cost: 1, .. }
        ));
        assert_eq!(sim.world().actor(&id(starter::HERO)).unwrap().next_available_tick, 1);
    }

    #[test]
    fn only_unusable_proposals_fall_back() {
        let cause = FallbackCause::from_rejection;
        assert_eq!(cause(RejectionReason::UnknownTool), Some(FallbackCause::UnknownTool));
        assert_eq!(cause(RejectionReason::MissingParameter), Some(FallbackCause::MalformedIntent));
        assert_eq!(cause(RejectionReason::InvalidParameter), Some(FallbackCause::MalformedIntent));
        assert_eq!(cause(RejectionReason::EmptyContent), None);
        assert_eq!(cause(RejectionReason::PassageClosed), None);
    }

    #[test]
    fn second_grab_for_the_same_item_is_rejected() {
        let mut sim = simulator();
        let mut script = ScriptedIntents::new();
        script.push(starter::HERO, Intent::new("grab").with_param("item", "apple-1"));
        script.push(starter::BARKEEP, Intent::new("grab").with_param("item", "apple-1"));
        let summary = sim.run_tick(&mut script).unwrap();

        // The hero's grab drains before the barkeep is asked, so the
        // barkeep's intent is rejected at validation rather than applied.
        assert!(matches!(
            turn(&summary, starter::BARKEEP).outcome,
            TurnOutcome::Rejected { reason: RejectionReason::ItemNotHere, .. }
        ));
        let grabs: Vec<_> = summary
            .narration
            .iter()
            .filter(|record| record.event.event_type == EventType::Grab)
            .collect();
        assert_eq!(grabs.len(), 1);
        assert_eq!(grabs[0].outcome, NarrationOutcome::Applied);
    }

    #[test]
    fn queued_events_that_went_stale_are_narrated() {
        let mut sim = simulator();
        sim.queue.push_back(
            Event::new(EventType::Grab, 0, id(starter::HERO))
                .with_target(skald_types::EntityRef::Item(skald_types::ItemId::new("bread-2"))),
        );
        let mut narration = Vec::new();
        sim.drain(&mut narration);

        assert_eq!(narration.len(), 1);
        assert!(matches!(
            narration[0].outcome,
            NarrationOutcome::NoOp { reason: NoOpReason::ItemMoved, .. }
        ));
    }

    #[test]
    fn speech_reaches_memories() {
        let mut sim = simulator();
        let mut script = ScriptedIntents::new();
        script.push(starter::HERO, Intent::new("talk").with_param("content", "Evening."));
        let summary = sim.run_tick(&mut script).unwrap();

        assert_eq!(summary.perceptions_delivered, 1);
        let barkeep = sim.world().actor(&id(starter::BARKEEP)).unwrap();
        assert_eq!(barkeep.memory.len(), 1);
    }
}
