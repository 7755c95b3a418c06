//! Name-keyed registry of tools and the intent pipeline.
//!
//! [`ToolRegistry::prepare`] is the single path from an unvalidated
//! [`Intent`] to a list of events: actor checks, lookup, parameter
//! normalisation, validation, generation, and the time cost to charge.
//! Nothing here touches the world; the scheduler decides what to do with
//! the result.

use std::collections::BTreeMap;

use serde::Serialize;
use skald_types::{ActorId, Event, Intent, RejectionReason};
use tracing::debug;

use super::costs::default_time_cost;
use super::params::{ParamSpec, Params};
use super::{Rejection, ToolContext, ToolKind};
use crate::error::ToolError;

/// A tool as registered, with its effective time cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredTool {
    /// Which built-in tool.
    pub kind: ToolKind,
    /// Cost in ticks (per requested tick for timed tools).
    pub time_cost: u64,
}

impl RegisteredTool {
    /// Ticks to charge for one use with `params`.
    pub fn time_cost_for(&self, params: &Params) -> Result<u64, Rejection> {
        if self.kind.is_timed() {
            Ok(self.time_cost.saturating_mul(params.ticks()?))
        } else {
            Ok(self.time_cost)
        }
    }
}

/// Catalog entry handed to planners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    /// Registered name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Cost in ticks (per requested tick for `wait` and `rest`).
    pub time_cost: u64,
    /// Declared parameters.
    pub params: Vec<ParamSpec>,
}

/// A validated intent, ready to be queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    /// The tool that ran.
    pub tool: ToolKind,
    /// Events to enqueue, in order.
    pub events: Vec<Event>,
    /// Ticks to add to the actor's cooldown.
    pub time_cost: u64,
}

/// Maps stable tool names to registered tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Registry holding every built-in tool at its default cost.
    pub fn with_builtin() -> Self {
        let tools = ToolKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.name().to_owned(),
                    RegisteredTool {
                        kind: *kind,
                        time_cost: default_time_cost(*kind),
                    },
                )
            })
            .collect();
        Self { tools }
    }

    /// Replace the time cost of named tools.
    ///
    /// Fails on the first name that is not registered; earlier overrides in
    /// key order stay applied.
    pub fn apply_cost_overrides(&mut self, overrides: &BTreeMap<String, u64>) -> Result<(), ToolError> {
        for (name, cost) in overrides {
            let tool = self
                .tools
                .get_mut(name)
                .ok_or_else(|| ToolError::UnknownTool { name: name.clone() })?;
            debug!(tool = name, from = tool.time_cost, to = cost, "Time cost overridden");
            tool.time_cost = *cost;
        }
        Ok(())
    }

    /// Look up a tool by registered name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Every tool with its schema, in name order.
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|(name, tool)| ToolDescriptor {
                name: name.clone(),
                description: tool.kind.description().to_owned(),
                time_cost: tool.time_cost,
                params: tool.kind.params().to_vec(),
            })
            .collect()
    }

    /// Run `intent` for `actor` through the full pipeline without applying
    /// anything.
    pub fn prepare(
        &self,
        actor: &ActorId,
        intent: &Intent,
        ctx: &ToolContext<'_>,
    ) -> Result<Prepared, Rejection> {
        let state = ctx.world.actor(actor).ok_or_else(|| {
            Rejection::new(RejectionReason::UnknownActor, format!("no actor {actor}"))
        })?;
        if !state.alive {
            return Err(Rejection::new(RejectionReason::ActorDead, format!("{actor} is dead")));
        }
        if state.next_available_tick > ctx.tick {
            return Err(Rejection::new(
                RejectionReason::OnCooldown,
                format!(
                    "{actor} is busy until tick {} (now {})",
                    state.next_available_tick, ctx.tick
                ),
            ));
        }

        let name = intent.tool.trim().to_ascii_lowercase();
        let tool = self.get(&name).ok_or_else(|| {
            Rejection::new(RejectionReason::UnknownTool, format!("no tool named `{}`", intent.tool))
        })?;
        let params = Params::normalize(tool.kind, &intent.params, ctx.rules.max_content_chars);

        tool.kind.validate_intent(actor, &params, ctx)?;
        let events = tool.kind.generate_events(actor, &params, ctx)?;
        let time_cost = tool.time_cost_for(&params)?;
        Ok(Prepared {
            tool: tool.kind,
            events,
            time_cost,
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skald_types::{Conversation, ConversationId, EventType};
    use skald_world::{HydrationOptions, World, starter, starter_world};

    use super::*;
    use crate::config::ToolRules;

    fn world() -> World {
        starter_world().hydrate(HydrationOptions::default()).unwrap()
    }

    fn prepare(world: &World, tick: u64, actor: &str, intent: &Intent) -> Result<Prepared, Rejection> {
        let conversations: BTreeMap<ConversationId, Conversation> = BTreeMap::new();
        let rules = ToolRules::default();
        let ctx = ToolContext {
            world,
            conversations: &conversations,
            tick,
            rules: &rules,
        };
        ToolRegistry::with_builtin().prepare(&ActorId::new(actor), intent, &ctx)
    }

    #[test]
    fn every_builtin_is_registered() {
        let registry = ToolRegistry::with_builtin();
        assert_eq!(registry.len(), ToolKind::ALL.len());
        for kind in ToolKind::ALL {
            assert_eq!(registry.get(kind.name()).unwrap().kind, kind);
        }
    }

    #[test]
    fn prepare_move_charges_five_ticks() {
        let world = world();
        let intent = Intent::new("move").with_param("to", starter::STREET);
        let prepared = prepare(&world, 0, starter::HERO, &intent).unwrap();
        assert_eq!(prepared.tool, ToolKind::Move);
        assert_eq!(prepared.time_cost, 5);
        assert_eq!(prepared.events.len(), 1);
        assert_eq!(prepared.events[0].event_type, EventType::Move);
    }

    #[test]
    fn wait_scales_with_ticks() {
        let world = world();
        let prepared = prepare(&world, 0, starter::HERO, &Intent::wait(4)).unwrap();
        assert_eq!(prepared.time_cost, 4);
    }

    #[test]
    fn unknown_tool_is_structural() {
        let world = world();
        let rejection = prepare(&world, 0, starter::HERO, &Intent::new("fly")).unwrap_err();
        assert_eq!(rejection.reason, RejectionReason::UnknownTool);
        assert!(rejection.reason.is_structural());
    }

    #[test]
    fn cooldown_blocks_before_lookup() {
        let mut world = world();
        skald_world::mutation::charge_cooldown(&mut world, &ActorId::new(starter::HERO), 3);
        let rejection = prepare(&world, 2, starter::HERO, &Intent::new("fly")).unwrap_err();
        assert_eq!(rejection.reason, RejectionReason::OnCooldown);
        assert!(prepare(&world, 3, starter::HERO, &Intent::new("look")).is_ok());
    }

    #[test]
    fn cost_overrides() {
        let mut registry = ToolRegistry::with_builtin();
        let overrides: BTreeMap<String, u64> = [("move".to_owned(), 2)].into_iter().collect();
        registry.apply_cost_overrides(&overrides).unwrap();
        assert_eq!(registry.get("move").unwrap().time_cost, 2);

        let bogus: BTreeMap<String, u64> = [("teleport".to_owned(), 1)].into_iter().collect();
        assert!(matches!(
            registry.apply_cost_overrides(&bogus),
            Err(ToolError::UnknownTool { .. })
        ));
    }

    #[test]
    fn catalog_is_name_ordered() {
        let catalog = ToolRegistry::with_builtin().catalog();
        let names: Vec<&str> = catalog.iter().map(|tool| tool.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        let give = catalog.iter().find(|tool| tool.name == "give").unwrap();
        assert_eq!(give.params.len(), 2);
    }
}
