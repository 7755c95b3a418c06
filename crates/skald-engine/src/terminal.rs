//! Terminal intake for the human player.
//!
//! [`TerminalIntake`] implements [`IntentSource`] by reading lines from
//! stdin. A background task forwards lines into a channel; each player turn
//! waits on that channel with a wall-clock deadline and hands back
//! [`PlannerError::Timeout`] when the player takes too long.
//!
//! # Input Format
//!
//! - A JSON object: `{"tool": "move", "params": {"destination": "street"}}`
//! - A command: `move street`, `grab apple-1`, `talk barkeep: An ale.`,
//!   `give apple-1 to barkeep`, `equip dagger-1 main_hand`, `wait 3`
//! - `quit` ends the session.
//!
//! # Sync/Async Bridge
//!
//! The [`IntentSource`] trait method is synchronous, but reading stdin is
//! async. We use `block_in_place` plus `Handle::block_on` to wait on the
//! channel from inside the runtime.

use std::time::Duration;

use skald_core::planner::{IntentSource, PlannerContext, PlannerError};
use skald_types::{Intent, IntentParseError, PerceptionRecord};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::console;

/// Lines buffered between stdin and the scheduler.
const INPUT_BUFFER: usize = 16;

/// Player intake over stdin with a per-turn deadline.
pub struct TerminalIntake {
    lines: mpsc::Receiver<String>,
    timeout: Duration,
    closed: bool,
    /// Perceptions already shown to the player, counted over the whole
    /// session.
    shown: u64,
}

impl TerminalIntake {
    /// Start forwarding stdin. Must be called inside a tokio runtime.
    pub fn spawn(timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(INPUT_BUFFER);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "Failed to read stdin");
                        break;
                    }
                }
            }
            debug!("Stdin closed");
        });
        Self::from_channel(rx, timeout)
    }

    /// Intake fed from an existing channel.
    pub const fn from_channel(lines: mpsc::Receiver<String>, timeout: Duration) -> Self {
        Self {
            lines,
            timeout,
            closed: false,
            shown: 0,
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>, tokio::time::error::Elapsed> {
        tokio::time::timeout(self.timeout, self.lines.recv()).await
    }
}

impl IntentSource for TerminalIntake {
    fn next_intent(&mut self, ctx: &PlannerContext) -> Result<Intent, PlannerError> {
        let fresh: Vec<_> = unseen(&ctx.memory, ctx.perceived_total, self.shown).iter().collect();
        console::print_prompt(ctx, &fresh);
        self.shown = ctx.perceived_total;

        let deadline_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let handle = tokio::runtime::Handle::current();
        let received = tokio::task::block_in_place(|| handle.block_on(self.next_line()));

        match received {
            Ok(Some(line)) if is_quit(&line) => {
                self.closed = true;
                Err(PlannerError::NoIntent {
                    actor_id: ctx.actor_id().clone(),
                })
            }
            Ok(Some(line)) => Ok(parse_command(&line)?),
            Ok(None) => {
                self.closed = true;
                Err(PlannerError::NoIntent {
                    actor_id: ctx.actor_id().clone(),
                })
            }
            Err(_elapsed) => Err(PlannerError::Timeout {
                actor_id: ctx.actor_id().clone(),
                deadline_ms,
            }),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.closed
    }
}

/// The tail of `memory` that arrived after `shown` of `total` perceptions
/// were already displayed. Records forgotten before they could be shown
/// are skipped.
fn unseen(memory: &[PerceptionRecord], total: u64, shown: u64) -> &[PerceptionRecord] {
    let fresh = usize::try_from(total.saturating_sub(shown)).unwrap_or(usize::MAX);
    let start = memory.len().saturating_sub(fresh);
    memory.get(start..).unwrap_or_default()
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit" | "q")
}

/// Parse one line of player input into an intent.
///
/// JSON objects go through [`Intent::from_json`]; anything else is read as
/// `tool [argument...]`.
pub fn parse_command(line: &str) -> Result<Intent, IntentParseError> {
    let line = line.trim();
    if line.starts_with('{') {
        return Intent::from_json(line);
    }
    let (tool, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(tool, rest)| (tool, rest.trim()));
    if tool.is_empty() {
        return Err(IntentParseError::MissingTool);
    }
    let tool = match tool.to_ascii_lowercase().as_str() {
        "go" => "move".to_owned(),
        "take" => "grab".to_owned(),
        "shout" => "talk_loud".to_owned(),
        "leave" => "leave_conversation".to_owned(),
        other => other.to_owned(),
    };
    let intent = Intent::new(tool.as_str());
    if rest.is_empty() {
        return Ok(intent);
    }

    let intent = match tool.as_str() {
        "move" | "open" | "close" => intent.with_param("destination", rest),
        "grab" | "drop" | "eat" | "analyze" | "unequip" => intent.with_param("item", rest),
        "attack" => intent.with_param("target", rest),
        "talk" => match rest.split_once(':') {
            Some((to, content)) if !to.trim().contains(char::is_whitespace) => intent
                .with_param("target", to.trim())
                .with_param("content", content.trim()),
            _ => intent.with_param("content", rest),
        },
        "talk_loud" | "scream" | "interject" => intent.with_param("content", rest),
        "give" => match rest.split_once(" to ") {
            Some((item, recipient)) => intent
                .with_param("item", item.trim())
                .with_param("recipient", recipient.trim()),
            None => intent.with_param("item", rest),
        },
        "equip" => match rest.split_once(char::is_whitespace) {
            Some((item, slot)) => intent.with_param("item", item).with_param("slot", slot.trim()),
            None => intent.with_param("item", rest),
        },
        "wait" | "rest" => match rest.parse::<u64>() {
            Ok(ticks) => intent.with_param("ticks", ticks),
            Err(_) => intent.with_param("ticks", rest),
        },
        "toggle_starvation" => {
            let enabled = matches!(rest, "on" | "true" | "yes");
            intent.with_param("enabled", enabled)
        }
        _ => intent.with_param("target", rest),
    };
    Ok(intent)
}
