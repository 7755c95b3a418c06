//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the run itself.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skald_core::config::ConfigError,
    },

    /// The world definition could not be loaded or hydrated.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: skald_world::WorldError,
    },

    /// The simulator could not be built.
    #[error("simulator error: {source}")]
    Simulator {
        /// The underlying scheduler error.
        #[from]
        source: skald_core::tick::SimError,
    },

    /// The simulation loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: skald_core::runner::RunnerError,
    },

    /// An intent log could not be read or written.
    #[error("replay error: {source}")]
    Replay {
        /// The underlying replay error.
        #[from]
        source: skald_core::replay::ReplayError,
    },

    /// The configured player is not in the world.
    #[error("player actor `{player_id}` is not defined in the world")]
    UnknownPlayer {
        /// The configured id.
        player_id: String,
    },

    /// Logging could not be initialised.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
