//! Long-term memories, goals, and relationships.
//!
//! Short-term memory holds raw perceptions and forgets them as it fills.
//! What an actor chooses to keep lives here instead: ordinary memories,
//! core memories that are always handed to the planner, and goals. Only
//! the `reason` and `reflect` events change any of it, through the
//! mutation engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::ActorId;

/// Longest memory text kept, in characters.
pub const MEMORY_TEXT_LIMIT: usize = 1000;

/// Longest goal text kept, in characters.
pub const GOAL_TEXT_LIMIT: usize = 500;

/// Ordinary memories past this count start archiving the oldest.
pub const MEMORY_SOFT_CAP: usize = 1000;

/// How many of the oldest memories are archived when the soft cap is hit.
pub const MEMORY_ARCHIVE_BATCH: usize = 50;

/// Core memories kept; the oldest are dropped beyond this.
pub const CORE_MEMORY_CAP: usize = 50;

/// Goals kept; the oldest are dropped beyond this.
pub const GOAL_CAP: usize = 100;

/// How much weight a memory or goal carries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Background detail.
    Low,
    /// The usual weight.
    #[default]
    Normal,
    /// Worth acting on.
    High,
}

/// Lifecycle of a long-term memory.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MemoryStatus {
    /// Live and retrievable.
    #[default]
    Active,
    /// Recently brought back to mind.
    Recalled,
    /// Kept but no longer retrieved.
    Archived,
    /// Folded into a higher-level memory.
    Consolidated,
}

impl MemoryStatus {
    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "active" => Some(Self::Active),
            "recalled" => Some(Self::Recalled),
            "archived" => Some(Self::Archived),
            "consolidated" => Some(Self::Consolidated),
            _ => None,
        }
    }

    /// Whether memories in this state are offered to the planner.
    pub const fn is_retrievable(self) -> bool {
        matches!(self, Self::Active | Self::Recalled)
    }
}

/// Lifecycle of a goal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GoalStatus {
    /// Being pursued.
    #[default]
    Active,
    /// Waiting on something.
    Pending,
    /// Achieved.
    Done,
    /// Abandoned.
    Cancelled,
}

impl GoalStatus {
    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the goal still matters.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

/// Something an actor decided to remember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEntry {
    /// What is remembered.
    pub text: String,
    /// When it was stored.
    #[serde(default)]
    pub tick: u64,
    /// Weight.
    #[serde(default)]
    pub priority: Priority,
    /// Lifecycle state.
    #[serde(default)]
    pub status: MemoryStatus,
    /// Who the memory came from, if anyone.
    #[serde(default)]
    pub source_id: Option<ActorId>,
    /// Certainty in percent.
    #[serde(default = "full_confidence")]
    pub confidence: u8,
    /// Whether the actor would rather not share it.
    #[serde(default)]
    pub is_secret: bool,
    /// Structured extras.
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub payload: BTreeMap<String, Value>,
}

const fn full_confidence() -> u8 {
    100
}

impl MemoryEntry {
    /// An active, normal-priority memory stored at `tick`.
    pub fn new(text: &str, tick: u64) -> Self {
        Self {
            text: clip(text, MEMORY_TEXT_LIMIT),
            tick,
            priority: Priority::Normal,
            status: MemoryStatus::Active,
            source_id: None,
            confidence: full_confidence(),
            is_secret: false,
            payload: BTreeMap::new(),
        }
    }

    /// Case-insensitive substring match on the text.
    pub fn mentions(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Something an actor wants to bring about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Goal {
    /// What the actor wants.
    pub text: String,
    /// Free-form category such as `go_to` or `permission_granted`.
    #[serde(rename = "type", default = "default_goal_kind")]
    pub kind: String,
    /// Weight.
    #[serde(default)]
    pub priority: Priority,
    /// Lifecycle state.
    #[serde(default)]
    pub status: GoalStatus,
    /// Structured extras.
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub payload: BTreeMap<String, Value>,
    /// Tick after which the goal no longer applies.
    #[serde(default)]
    pub expiry_tick: Option<u64>,
}

fn default_goal_kind() -> String {
    "note".to_owned()
}

impl Goal {
    /// An active, normal-priority goal.
    pub fn new(text: &str, kind: &str) -> Self {
        Self {
            text: clip(text, GOAL_TEXT_LIMIT),
            kind: kind.to_owned(),
            priority: Priority::Normal,
            status: GoalStatus::Active,
            payload: BTreeMap::new(),
            expiry_tick: None,
        }
    }

    /// Whether the goal is open and not expired at `tick`.
    pub fn is_live(&self, tick: u64) -> bool {
        self.status.is_open() && self.expiry_tick.is_none_or(|expiry| tick <= expiry)
    }

    /// Case-insensitive substring match on the text.
    pub fn mentions(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// An actor's lasting inner state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mind {
    /// Ordinary long-term memories, oldest first.
    pub memories: Vec<MemoryEntry>,
    /// Beliefs always offered to the planner, oldest first.
    pub core_memories: Vec<MemoryEntry>,
    /// Goals, oldest first.
    pub goals: Vec<Goal>,
    /// How the actor regards others.
    pub relationships: BTreeMap<ActorId, String>,
}

impl Mind {
    /// Store an ordinary memory. Past the soft cap the oldest batch is
    /// archived rather than dropped.
    pub fn remember(&mut self, entry: MemoryEntry) {
        self.memories.push(entry);
        if self.memories.len() > MEMORY_SOFT_CAP {
            for old in self.memories.iter_mut().take(MEMORY_ARCHIVE_BATCH) {
                old.status = MemoryStatus::Archived;
            }
        }
    }

    /// Store a core memory, dropping the oldest beyond the cap.
    pub fn remember_core(&mut self, entry: MemoryEntry) {
        self.core_memories.push(entry);
        let excess = self.core_memories.len().saturating_sub(CORE_MEMORY_CAP);
        self.core_memories.drain(..excess);
    }

    /// Adopt a goal, dropping the oldest beyond the cap.
    pub fn adopt(&mut self, goal: Goal) {
        self.goals.push(goal);
        let excess = self.goals.len().saturating_sub(GOAL_CAP);
        self.goals.drain(..excess);
    }

    /// Set the status of the first memory mentioning `needle`. Returns
    /// whether one matched.
    pub fn mark_memory(&mut self, needle: &str, status: MemoryStatus) -> bool {
        let Some(memory) = self.memories.iter_mut().find(|memory| memory.mentions(needle)) else {
            return false;
        };
        memory.status = status;
        true
    }

    /// Set the status of the first goal mentioning `needle`. Returns
    /// whether one matched.
    pub fn mark_goal(&mut self, needle: &str, status: GoalStatus) -> bool {
        let Some(goal) = self.goals.iter_mut().find(|goal| goal.mentions(needle)) else {
            return false;
        };
        goal.status = status;
        true
    }

    /// Apply a `reason` change made at `tick`. Returns whether
    /// anything changed; a status update that matches nothing changes
    /// nothing.
    pub fn apply(&mut self, change: MindChange, tick: u64) -> bool {
        match change {
            MindChange::AddMemory(draft) => {
                self.remember(draft.into_entry(tick, full_confidence()));
                true
            }
            MindChange::UpdateMemoryStatus {
                match_text,
                new_status,
            } => self.mark_memory(&match_text, new_status),
            MindChange::AddGoal(mut goal) => {
                goal.text = clip(goal.text.trim(), GOAL_TEXT_LIMIT);
                self.adopt(goal);
                true
            }
            MindChange::UpdateGoalStatus {
                match_text,
                new_status,
            } => self.mark_goal(&match_text, new_status),
            MindChange::UpdateRelationship {
                target_id,
                new_status,
            } => {
                self.relationships.insert(target_id, new_status);
                true
            }
        }
    }

    /// Apply a reflection by `actor` at `tick`.
    ///
    /// Old memories are marked before the new ones are stored, so a
    /// conclusion never archives itself. New memories are sourced to the
    /// actor. Returns how many existing memories were marked.
    pub fn reflect(&mut self, reflection: Reflection, actor: &ActorId, tick: u64) -> usize {
        let mut marked: usize = 0;
        for needle in &reflection.archive_matches {
            marked = marked.saturating_add(self.mark_all(needle, MemoryStatus::Archived));
        }
        for needle in &reflection.consolidate_matches {
            marked = marked.saturating_add(self.mark_all(needle, MemoryStatus::Consolidated));
        }
        let stamp = |draft: MemoryDraft| {
            let mut entry = draft.into_entry(tick, REFLECTED_CONFIDENCE);
            entry.status = MemoryStatus::Active;
            entry.source_id = Some(actor.clone());
            entry
        };
        for draft in reflection.new_core_memories {
            self.remember_core(stamp(draft));
        }
        for draft in reflection.new_memories {
            self.remember(stamp(draft));
        }
        marked
    }

    /// Open goals at `tick`, highest priority first, oldest first within a
    /// priority.
    pub fn live_goals(&self, tick: u64) -> Vec<&Goal> {
        let mut goals: Vec<&Goal> = self.goals.iter().filter(|goal| goal.is_live(tick)).collect();
        goals.sort_by_key(|goal| std::cmp::Reverse(goal.priority));
        goals
    }

    /// Up to `limit` retrievable memories sharing the most words with
    /// `cues`. Ties go to the newer memory; memories sharing no word are
    /// left out.
    pub fn recall(&self, cues: &str, limit: usize) -> Vec<&MemoryEntry> {
        let cue_words = keywords(cues);
        let mut scored: Vec<(usize, &MemoryEntry)> = self
            .memories
            .iter()
            .filter(|memory| memory.status.is_retrievable())
            .map(|memory| {
                let overlap = keywords(&memory.text).intersection(&cue_words).count();
                (overlap, memory)
            })
            .filter(|(overlap, _)| *overlap > 0)
            .collect();
        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score.cmp(a_score).then_with(|| b.tick.cmp(&a.tick))
        });
        scored.into_iter().take(limit).map(|(_, memory)| memory).collect()
    }

    /// Set the status of every memory, ordinary or core, mentioning
    /// `needle`. Returns how many changed.
    pub fn mark_all(&mut self, needle: &str, status: MemoryStatus) -> usize {
        let mut marked: usize = 0;
        for memory in self
            .memories
            .iter_mut()
            .chain(self.core_memories.iter_mut())
            .filter(|memory| memory.mentions(needle))
        {
            memory.status = status;
            marked = marked.saturating_add(1);
        }
        marked
    }
}

/// A memory as a planner proposes it, before it is stamped with a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDraft {
    /// What to remember.
    pub text: String,
    /// Weight.
    #[serde(default)]
    pub priority: Priority,
    /// Initial lifecycle state.
    #[serde(default)]
    pub status: MemoryStatus,
    /// Who the memory came from.
    #[serde(default)]
    pub source_id: Option<ActorId>,
    /// Certainty in percent; each operation picks its own default.
    #[serde(default)]
    pub confidence: Option<u8>,
    /// Whether the actor would rather not share it.
    #[serde(default)]
    pub is_secret: bool,
    /// Structured extras.
    #[serde(default)]
    pub payload: BTreeMap<String, Value>,
}

impl MemoryDraft {
    fn check(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("memory text is empty".to_owned());
        }
        match self.confidence {
            Some(percent) if percent > 100 => {
                Err(format!("confidence {percent} is above 100 percent"))
            }
            _ => Ok(()),
        }
    }

    /// Stamp the draft at `tick`.
    pub fn into_entry(self, tick: u64, default_confidence: u8) -> MemoryEntry {
        MemoryEntry {
            text: clip(self.text.trim(), MEMORY_TEXT_LIMIT),
            tick,
            priority: self.priority,
            status: self.status,
            source_id: self.source_id,
            confidence: self.confidence.unwrap_or(default_confidence),
            is_secret: self.is_secret,
            payload: self.payload,
        }
    }
}

/// Operation names a `reason` event may carry, in the order they are
/// looked for.
pub const MIND_CHANGE_OPS: [&str; 5] = [
    "add_memory",
    "update_memory_status",
    "add_goal",
    "update_goal_status",
    "update_relationship",
];

/// The one change a `reason` event makes to its actor's mind.
///
/// Nothing here can reach hit points, belongings, or position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MindChange {
    /// Store a new ordinary memory.
    AddMemory(MemoryDraft),
    /// Change the status of the first memory mentioning `match_text`.
    UpdateMemoryStatus {
        /// Case-insensitive substring to look for.
        match_text: String,
        /// Status to set.
        new_status: MemoryStatus,
    },
    /// Adopt a goal.
    AddGoal(Goal),
    /// Change the status of the first goal mentioning `match_text`.
    UpdateGoalStatus {
        /// Case-insensitive substring to look for.
        match_text: String,
        /// Status to set.
        new_status: GoalStatus,
    },
    /// Record how the actor now regards someone.
    UpdateRelationship {
        /// The other actor.
        target_id: ActorId,
        /// Free-form standing, such as `friendly` or `owes me`.
        new_status: String,
    },
}

impl MindChange {
    /// Read a change from `{"<op>": {...}}`.
    ///
    /// Keys other than the known operations are ignored; the first known
    /// operation present wins.
    ///
    /// # Errors
    ///
    /// A description of what is wrong when the value is not an object,
    /// names no known operation, or the operation's body does not fit.
    pub fn parse(desired: &Value) -> Result<Self, String> {
        let Value::Object(fields) = desired else {
            return Err(format!("expected an object, got {desired}"));
        };
        let Some((op, body)) = MIND_CHANGE_OPS
            .iter()
            .find_map(|op| fields.get(*op).map(|body| (*op, body)))
        else {
            return Err(format!("expected one of {}", MIND_CHANGE_OPS.join(", ")));
        };
        let tagged = Value::Object(std::iter::once((op.to_owned(), body.clone())).collect());
        let change: Self =
            serde_json::from_value(tagged).map_err(|e| format!("`{op}` is malformed: {e}"))?;
        change.check()?;
        Ok(change)
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Self::AddMemory(draft) => draft.check(),
            Self::AddGoal(goal) if goal.text.trim().is_empty() => {
                Err("goal text is empty".to_owned())
            }
            Self::UpdateMemoryStatus { match_text, .. } | Self::UpdateGoalStatus { match_text, .. }
                if match_text.trim().is_empty() =>
            {
                Err("`match_text` is empty".to_owned())
            }
            Self::UpdateRelationship { target_id, .. } if target_id.as_str().is_empty() => {
                Err("`target_id` is empty".to_owned())
            }
            _ => Ok(()),
        }
    }

    /// Wire form, readable by [`MindChange::parse`].
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The operation name.
    pub const fn op(&self) -> &'static str {
        match self {
            Self::AddMemory(_) => "add_memory",
            Self::UpdateMemoryStatus { .. } => "update_memory_status",
            Self::AddGoal(_) => "add_goal",
            Self::UpdateGoalStatus { .. } => "update_goal_status",
            Self::UpdateRelationship { .. } => "update_relationship",
        }
    }
}

/// Confidence given to reflected memories that state none.
pub const REFLECTED_CONFIDENCE: u8 = 80;

/// What a `reflect` event does to its actor's mind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reflection {
    /// Conclusions to keep as core memories.
    pub new_core_memories: Vec<MemoryDraft>,
    /// Conclusions to keep as ordinary memories.
    pub new_memories: Vec<MemoryDraft>,
    /// Substrings whose memories are archived.
    pub archive_matches: Vec<String>,
    /// Substrings whose memories are marked consolidated.
    pub consolidate_matches: Vec<String>,
}

impl Reflection {
    /// Read a reflection from its object form.
    ///
    /// # Errors
    ///
    /// A description of what is wrong when the value is not an object or a
    /// field has the wrong shape.
    pub fn parse(outputs: &Value) -> Result<Self, String> {
        if !outputs.is_object() {
            return Err(format!("expected an object, got {outputs}"));
        }
        let reflection: Self =
            serde_json::from_value(outputs.clone()).map_err(|e| format!("malformed outputs: {e}"))?;
        for draft in reflection.new_core_memories.iter().chain(&reflection.new_memories) {
            draft.check()?;
        }
        Ok(reflection)
    }

    /// Wire form, readable by [`Reflection::parse`].
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Lowercase words of at least three letters.
fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// Cut `text` to at most `limit` characters.
pub fn clip(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn marking_matches_case_insensitively() {
        let mut mind = Mind::default();
        mind.remember(MemoryEntry::new("The Guard took a bribe", 3));
        mind.remember(MemoryEntry::new("Rats in the cellar", 4));

        assert!(mind.mark_memory("guard", MemoryStatus::Archived));
        assert!(!mind.mark_memory("dragon", MemoryStatus::Archived));
        assert_eq!(mind.memories[0].status, MemoryStatus::Archived);
        assert_eq!(mind.memories[1].status, MemoryStatus::Active);
    }

    #[test]
    fn soft_cap_archives_the_oldest_batch() {
        let mut mind = Mind::default();
        for _ in 0..=MEMORY_SOFT_CAP {
            mind.remember(MemoryEntry::new("small talk", 0));
        }
        assert_eq!(mind.memories.len(), MEMORY_SOFT_CAP + 1);
        let archived = mind
            .memories
            .iter()
            .filter(|memory| memory.status == MemoryStatus::Archived)
            .count();
        assert_eq!(archived, MEMORY_ARCHIVE_BATCH);
    }

    #[test]
    fn goals_are_capped_and_expire() {
        let mut mind = Mind::default();
        for n in 0..=GOAL_CAP {
            mind.adopt(Goal::new(&format!("goal {n}"), "note"));
        }
        assert_eq!(mind.goals.len(), GOAL_CAP);
        assert_eq!(mind.goals[0].text, "goal 1");

        let mut errand = Goal::new("Fetch ale", "errand");
        errand.expiry_tick = Some(10);
        assert!(errand.is_live(10));
        assert!(!errand.is_live(11));
    }

    #[test]
    fn text_is_clipped() {
        let long = "x".repeat(MEMORY_TEXT_LIMIT + 10);
        assert_eq!(MemoryEntry::new(&long, 0).text.len(), MEMORY_TEXT_LIMIT);
    }

    #[test]
    fn reason_reads_only_allowlisted_operations() {
        let change = MindChange::parse(&serde_json::json!({
            "set_hp": {"hp": 99},
            "add_goal": {"text": "Find the cellar key", "type": "go_to"}
        }))
        .unwrap();
        assert_eq!(change.op(), "add_goal");

        assert!(MindChange::parse(&serde_json::json!({"set_hp": {"hp": 99}})).is_err());
        assert!(MindChange::parse(&serde_json::json!("add_memory")).is_err());
        let bad_status = serde_json::json!({
            "update_memory_status": {"match_text": "rat", "new_status": "forgotten"}
        });
        assert!(MindChange::parse(&bad_status).is_err());
        let empty = serde_json::json!({"add_memory": {"text": "  "}});
        assert!(MindChange::parse(&empty).is_err());
    }

    #[test]
    fn applied_changes_stamp_the_tick() {
        let mut mind = Mind::default();
        let change = MindChange::parse(&serde_json::json!({
            "add_memory": {"text": "The hero paid in silver", "priority": "high"}
        }))
        .unwrap();
        let round_tripped = MindChange::parse(&change.to_value()).unwrap();
        assert!(mind.apply(round_tripped, 12));
        assert_eq!(mind.memories[0].tick, 12);
        assert_eq!(mind.memories[0].priority, Priority::High);
        assert_eq!(mind.memories[0].confidence, 100);

        let unmatched = MindChange::UpdateGoalStatus {
            match_text: "dragon".to_owned(),
            new_status: GoalStatus::Done,
        };
        assert!(!mind.apply(unmatched, 13));

        let standing = MindChange::UpdateRelationship {
            target_id: ActorId::new("hero"),
            new_status: "trusted".to_owned(),
        };
        assert!(mind.apply(standing, 14));
        assert_eq!(mind.relationships[&ActorId::new("hero")], "trusted");
    }

    #[test]
    fn reflection_marks_before_it_adds() {
        let mut mind = Mind::default();
        mind.remember(MemoryEntry::new("A rat bit my ankle", 1));
        mind.remember(MemoryEntry::new("Another rat in the flour", 2));
        mind.remember_core(MemoryEntry::new("Rats carry plague", 0));

        let reflection = Reflection::parse(&serde_json::json!({
            "new_memories": [{"text": "The rat problem is getting worse"}],
            "consolidate_matches": ["rat"]
        }))
        .unwrap();
        let actor = ActorId::new("barkeep");
        assert_eq!(mind.reflect(reflection, &actor, 9), 3);

        assert_eq!(mind.memories[0].status, MemoryStatus::Consolidated);
        assert_eq!(mind.core_memories[0].status, MemoryStatus::Consolidated);
        let summary = &mind.memories[2];
        assert_eq!(summary.status, MemoryStatus::Active);
        assert_eq!(summary.source_id, Some(actor));
        assert_eq!(summary.confidence, REFLECTED_CONFIDENCE);
        assert_eq!(summary.tick, 9);
    }

    #[test]
    fn reflection_rejects_wrong_shapes() {
        assert!(Reflection::parse(&serde_json::json!([])).is_err());
        assert!(Reflection::parse(&serde_json::json!({"archive_matches": "rat"})).is_err());
        assert_eq!(Reflection::parse(&serde_json::json!({})).unwrap(), Reflection::default());
    }

    #[test]
    fn recall_prefers_overlap_then_recency() {
        let mut mind = Mind::default();
        mind.remember(MemoryEntry::new("The guard drinks ale", 1));
        mind.remember(MemoryEntry::new("The guard took a bribe from the smuggler", 2));
        mind.remember(MemoryEntry::new("Weather turned cold", 3));
        let mut archived = MemoryEntry::new("The guard is my cousin", 4);
        archived.status = MemoryStatus::Archived;
        mind.remember(archived);

        let recalled = mind.recall("Guard, about that smuggler...", 5);
        let texts: Vec<&str> = recalled.iter().map(|memory| memory.text.as_str()).collect();
        assert_eq!(
            texts,
            ["The guard took a bribe from the smuggler", "The guard drinks ale"]
        );
    }

    #[test]
    fn live_goals_rank_by_priority() {
        let mut mind = Mind::default();
        mind.adopt(Goal::new("Sweep the floor", "chore"));
        let mut urgent = Goal::new("Deal with the rats", "chore");
        urgent.priority = Priority::High;
        mind.adopt(urgent);
        let mut done = Goal::new("Open the tavern", "chore");
        done.status = GoalStatus::Done;
        mind.adopt(done);

        let live: Vec<&str> = mind.live_goals(0).iter().map(|goal| goal.text.as_str()).collect();
        assert_eq!(live, ["Deal with the rats", "Sweep the floor"]);
    }
}
