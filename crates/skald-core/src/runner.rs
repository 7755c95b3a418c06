//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`Simulator::run_tick`] until one of:
//!
//! - **Tick limit**: `max_ticks` ticks have completed (0 means no limit)
//! - **Everyone dead**: no living actor remains
//! - **Input closed**: the intent source reports it has run dry
//!
//! After every tick the [`TickCallback`] receives the summary, which is
//! where front ends render narration and snapshots.

use serde::Serialize;
use tracing::{info, warn};

use crate::planner::IntentSource;
use crate::tick::{SimError, Simulator, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: SimError,
    },
}

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Every actor is dead.
    AllActorsDead,
    /// The intent source will produce nothing more.
    InputClosed,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary) {}
}

/// Collects every summary. Used by tests and replay comparison.
#[derive(Debug, Default)]
pub struct CollectingCallback {
    /// Summaries in tick order.
    pub summaries: Vec<TickSummary>,
}

impl TickCallback for CollectingCallback {
    fn on_tick(&mut self, summary: &TickSummary) {
        self.summaries.push(summary.clone());
    }
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub fn run_simulation(
    sim: &mut Simulator,
    source: &mut dyn IntentSource,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks,
        start_tick = sim.tick(),
        actors_alive = sim.actors_alive(),
        "Simulation starting"
    );

    loop {
        if source.is_exhausted() {
            info!(tick = sim.tick(), "Intent source closed");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::InputClosed,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = sim.run_tick(source)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary);

        if summary.actors_alive == 0 {
            info!(tick = summary.tick, "All actors dead");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::AllActorsDead,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        if max_ticks > 0 && total_ticks >= max_ticks {
            info!(tick = summary.tick, max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_actors_alive = result.final_summary.as_ref().map(|s| s.actors_alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            actors_alive = summary.actors_alive,
            conversations = summary.snapshot.conversations.len(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skald_types::{ActorId, Intent};
    use skald_world::{HydrationOptions, starter, starter_world};

    use super::*;
    use crate::config::SimulationConfig;
    use crate::planner::{IdlePlanner, PlannerContext, PlannerError, ScriptedIntents};

    fn simulator() -> Simulator {
        let world = starter_world().hydrate(HydrationOptions::default()).unwrap();
        Simulator::new(world, &SimulationConfig::default()).unwrap()
    }

    /// Runs dry after a fixed number of proposals.
    struct Budget(u32);

    impl IntentSource for Budget {
        fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
            self.0 = self.0.checked_sub(1).ok_or_else(|| PlannerError::NoIntent {
                actor_id: ctx.actor_id().clone(),
            })?;
            Ok(Intent::wait(1))
        }

        fn is_exhausted(&self) -> bool {
            self.0 == 0
        }
    }

    #[test]
    fn stops_at_tick_limit() {
        let mut sim = simulator();
        let mut callback = CollectingCallback::default();
        let result = run_simulation(&mut sim, &mut IdlePlanner::new(), 5, &mut callback).unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 4);
        assert_eq!(callback.summaries.len(), 5);
        assert_eq!(sim.tick(), 5);
    }

    #[test]
    fn stops_when_input_closes() {
        let mut sim = simulator();
        // Four actors wait one tick each: exactly one tick's worth.
        let result = run_simulation(&mut sim, &mut Budget(4), 0, &mut NoOpCallback).unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::InputClosed);
        assert_eq!(result.total_ticks, 1);
    }

    #[test]
    fn stops_when_everyone_is_dead() {
        let world = starter_world()
            .hydrate(HydrationOptions {
                starvation_enabled: true,
                ..HydrationOptions::default()
            })
            .unwrap();
        let yaml = "hunger:\n  hungry_after_ticks: 0\n  starving_after_ticks: 0\n  starvation_damage: 1000\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        let mut sim = Simulator::new(world, &config).unwrap();

        let result =
            run_simulation(&mut sim, &mut ScriptedIntents::new(), 50, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::AllActorsDead);
        assert_eq!(result.total_ticks, 1);
        assert!(sim.world().actors().all(|actor| !actor.alive));
        assert!(!sim.world().actor(&ActorId::new(starter::HERO)).unwrap().alive);
    }
}
