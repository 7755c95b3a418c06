//! Intent logs and deterministic replay.
//!
//! The world, the scheduler, and combat rolls are all deterministic, so a
//! run is fully described by its initial world plus the proposals each
//! actor made. [`RecordingSource`] captures those proposals into an
//! [`IntentLog`]; [`ReplaySource`] feeds them back in the same order.
//! Replaying against the same initial world reproduces the same snapshots
//! and narration.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skald_types::{ActorId, Intent};
use tracing::{debug, warn};

use crate::planner::{IntentSource, PlannerContext, PlannerError};

/// Errors reading or writing an intent log.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Failed to read or write the log file.
    #[error("intent log I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The log is not valid JSON.
    #[error("intent log is not valid JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// What the source handed back for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedProposal {
    /// A proposal, well-formed or not as far as the registry is concerned.
    Intent {
        /// The proposal.
        intent: Intent,
    },
    /// The source missed its deadline.
    Timeout {
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },
    /// The source failed some other way.
    Failed {
        /// The error message.
        message: String,
    },
}

impl RecordedProposal {
    fn from_result(result: &Result<Intent, PlannerError>) -> Self {
        match result {
            Ok(intent) => Self::Intent {
                intent: intent.clone(),
            },
            Err(PlannerError::Timeout { deadline_ms, .. }) => Self::Timeout {
                deadline_ms: *deadline_ms,
            },
            Err(err) => Self::Failed {
                message: err.to_string(),
            },
        }
    }

    fn into_result(self, actor_id: &ActorId) -> Result<Intent, PlannerError> {
        match self {
            Self::Intent { intent } => Ok(intent),
            Self::Timeout { deadline_ms } => Err(PlannerError::Timeout {
                actor_id: actor_id.clone(),
                deadline_ms,
            }),
            Self::Failed { message } => Err(PlannerError::Internal { message }),
        }
    }
}

/// One recorded turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentLogEntry {
    /// Tick of the turn.
    pub tick: u64,
    /// The acting actor.
    pub actor_id: ActorId,
    /// What the source proposed.
    pub proposal: RecordedProposal,
}

/// Every proposal of a run, in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentLog {
    /// Entries in the order the scheduler asked for them.
    pub entries: Vec<IntentLogEntry>,
}

impl IntentLog {
    /// Read a log written by [`IntentLog::write_to`].
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the file cannot be read or parsed.
    pub fn read_from(path: &Path) -> Result<Self, ReplayError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the log as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of recorded turns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a source and records everything it proposes.
#[derive(Debug, Default)]
pub struct RecordingSource<S> {
    inner: S,
    log: IntentLog,
}

impl<S: IntentSource> RecordingSource<S> {
    /// Record proposals made by `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: IntentLog::default(),
        }
    }

    /// The log so far.
    pub const fn log(&self) -> &IntentLog {
        &self.log
    }

    /// Stop recording and return the log.
    pub fn into_log(self) -> IntentLog {
        self.log
    }
}

impl<S: IntentSource> IntentSource for RecordingSource<S> {
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        let result = self.inner.next_intent(ctx);
        self.log.entries.push(IntentLogEntry {
            tick: ctx.tick,
            actor_id: ctx.actor_id().clone(),
            proposal: RecordedProposal::from_result(&result),
        });
        result
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }
}

/// Feeds a recorded log back, turn by turn.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    entries: VecDeque<IntentLogEntry>,
}

impl ReplaySource {
    /// Replay `log` from the start.
    pub fn new(log: IntentLog) -> Self {
        Self {
            entries: log.entries.into(),
        }
    }

    /// Turns not yet replayed.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl IntentSource for ReplaySource {
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        let entry = self.entries.pop_front().ok_or_else(|| PlannerError::NoIntent {
            actor_id: ctx.actor_id().clone(),
        })?;
        if entry.tick != ctx.tick || entry.actor_id != *ctx.actor_id() {
            warn!(
                expected_tick = entry.tick,
                expected_actor = %entry.actor_id,
                tick = ctx.tick,
                actor = %ctx.actor_id(),
                "Replay diverged from the recording"
            );
            return Err(PlannerError::Internal {
                message: format!(
                    "replay expected {} at tick {}, got {} at tick {}",
                    entry.actor_id,
                    entry.tick,
                    ctx.actor_id(),
                    ctx.tick
                ),
            });
        }
        debug!(tick = ctx.tick, actor = %entry.actor_id, remaining = self.entries.len(), "Replaying turn");
        entry.proposal.into_result(&entry.actor_id)
    }

    fn is_exhausted(&self) -> bool {
        self.entries.is_empty()
    }
}
