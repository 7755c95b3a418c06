//! Scheduler, conversations, perception, and replay for the Skald kernel.
//!
//! This crate owns the tick cycle that drives an adventure: eligible actors
//! take turns one at a time, their intents become events, the events drain
//! through the mutation engine, and every tick closes with a snapshot.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter.
//! - [`config`] -- Configuration loading from `skald-config.yaml` into
//!   strongly-typed structs.
//! - [`conversation`] -- The conversation state machine and its board.
//! - [`perception`] -- Routing applied events into actor memories.
//! - [`planner`] -- [`IntentSource`] trait, planner context, and the
//!   built-in sources.
//! - [`replay`] -- Intent logs and deterministic replay.
//! - [`runner`] -- The bounded simulation loop.
//! - [`snapshot`] -- Per-tick world snapshots.
//! - [`tick`] -- The [`Simulator`] and its tick cycle.
//!
//! [`IntentSource`]: planner::IntentSource
//! [`Simulator`]: tick::Simulator

pub mod clock;
pub mod config;
pub mod conversation;
pub mod perception;
pub mod planner;
pub mod replay;
pub mod runner;
pub mod snapshot;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use conversation::{ConversationBoard, EndReason};
pub use planner::{
    IdlePlanner, IntentSource, PlannerContext, PlannerError, RoutedSource, ScriptedIntents,
};
pub use replay::{IntentLog, RecordingSource, ReplayError, ReplaySource};
pub use runner::{
    CollectingCallback, NoOpCallback, RunnerError, SimulationEndReason, SimulationResult,
    TickCallback, run_simulation,
};
pub use tick::{FallbackCause, SimError, Simulator, TickSummary, TurnOutcome, TurnReport};
