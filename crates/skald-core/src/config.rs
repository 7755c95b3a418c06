//! Configuration loading and typed config structures for Skald.
//!
//! The canonical configuration lives in `skald-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads the file. Every section and field has
//! a default, so an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use skald_actors::{HungerConfig, ToolRules};
use skald_world::HydrationOptions;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override holds an unusable value.
    #[error("invalid value for {variable}: `{value}`")]
    InvalidEnv {
        /// The environment variable.
        variable: &'static str,
        /// Its value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `skald-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// World selection and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick loop limits and planner fallback.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Conversation timeouts.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Short-term memory sizing.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Hunger and starvation tunables.
    #[serde(default)]
    pub hunger: HungerConfig,

    /// Movement policy.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Tool cost overrides.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] for a bad override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Options for hydrating the world definition.
    pub const fn hydration_options(&self) -> HydrationOptions {
        HydrationOptions {
            memory_capacity: self.memory.short_term_capacity,
            starvation_enabled: self.hunger.starvation_enabled,
        }
    }

    /// Tool validation policy derived from the movement and conversation
    /// sections.
    pub const fn tool_rules(&self) -> ToolRules {
        ToolRules {
            require_known_destination: self.movement.require_known_destination,
            max_content_chars: self.conversation.max_content_chars,
        }
    }
}

/// World selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Display name of the adventure.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Overrides the seed stored in the world definition when set.
    #[serde(default)]
    pub seed: Option<u64>,

    /// World definition file (YAML). The built-in starter world is used
    /// when absent.
    #[serde(default)]
    pub definition_path: Option<PathBuf>,

    /// Actor driven by the terminal.
    #[serde(default = "default_player_id")]
    pub player_id: String,

    /// Where to write the intent log for replay, if anywhere.
    #[serde(default)]
    pub replay_log: Option<PathBuf>,
}

impl WorldConfig {
    /// Apply `SKALD_SEED` and `SKALD_WORLD` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var("SKALD_SEED") {
            let seed = value.parse().ok().ok_or_else(|| ConfigError::InvalidEnv {
                variable: "SKALD_SEED",
                value: value.clone(),
            })?;
            self.seed = Some(seed);
        }
        if let Ok(value) = std::env::var("SKALD_WORLD") {
            self.definition_path = Some(PathBuf::from(value));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
            definition_path: None,
            player_id: default_player_id(),
            replay_log: None,
        }
    }
}

/// Tick loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Stop after this many ticks (0 runs until the input ends).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Wall-clock deadline for one human or planner proposal.
    #[serde(default = "default_planner_timeout_ms")]
    pub planner_timeout_ms: u64,

    /// Length of the wait substituted for a failed proposal.
    #[serde(default = "default_fallback_wait_ticks")]
    pub fallback_wait_ticks: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            planner_timeout_ms: default_planner_timeout_ms(),
            fallback_wait_ticks: default_fallback_wait_ticks(),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConversationConfig {
    /// Ticks of silence after which a conversation dissolves.
    #[serde(default = "default_conversation_timeout")]
    pub timeout_ticks: u64,

    /// Speech is cut to this many characters.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: default_conversation_timeout(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

/// Memory settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Perception records each actor keeps.
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: default_short_term_capacity(),
        }
    }
}

/// Movement policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MovementConfig {
    /// Only allow moves to locations the actor already knows.
    #[serde(default)]
    pub require_known_destination: bool,
}

/// Per-tool overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolsConfig {
    /// Time cost by tool name.
    #[serde(default)]
    pub time_costs: BTreeMap<String, u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable logs.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_world_name() -> String {
    "The Prancing Pony".to_owned()
}

fn default_player_id() -> String {
    skald_world::starter::HERO.to_owned()
}

const fn default_max_ticks() -> u64 {
    100
}

const fn default_planner_timeout_ms() -> u64 {
    30_000
}

const fn default_fallback_wait_ticks() -> u64 {
    1
}

const fn default_conversation_timeout() -> u64 {
    300
}

const fn default_max_content_chars() -> usize {
    200
}

const fn default_short_term_capacity() -> usize {
    skald_types::DEFAULT_MEMORY_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}
