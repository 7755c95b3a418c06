//! Tunables for actor mechanics.
//!
//! These correspond to the `hunger` and `movement` sections of
//! `skald-config.yaml`. Every field has a default so partial YAML works.

use serde::Deserialize;

/// Hunger progression and starvation damage.
///
/// Hunger is derived from ticks elapsed since an actor's last meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    /// Ticks without food before an actor becomes hungry (default: 20).
    pub hungry_after_ticks: u64,

    /// Ticks without food before an actor starts starving (default: 40).
    pub starving_after_ticks: u64,

    /// Hit points lost per tick while starving (default: 1).
    pub starvation_damage: u32,

    /// Whether starvation starts enabled (default: true).
    pub starvation_enabled: bool,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            hungry_after_ticks: 20,
            starving_after_ticks: 40,
            starvation_damage: 1,
            starvation_enabled: true,
        }
    }
}

/// Rules the tool validators enforce beyond raw world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolRules {
    /// Restrict `move` to destinations the actor already knows
    /// (default: false).
    pub require_known_destination: bool,

    /// Speech longer than this many characters is cut (default: 200).
    pub max_content_chars: usize,
}

impl Default for ToolRules {
    fn default() -> Self {
        Self {
            require_known_destination: false,
            max_content_chars: 200,
        }
    }
}
