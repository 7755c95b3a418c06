//! Tools, combat, and vital mechanics for Skald actors.
//!
//! This crate is the read-only logic layer between the world and the
//! scheduler. Everything here inspects a `&World` and produces events or
//! rejections; applying them is left to the mutation engine in
//! `skald-world`.
//!
//! # Modules
//!
//! - [`combat`] -- Attack rolls and the attack event chain
//! - [`config`] -- Hunger tunables and tool policy ([`HungerConfig`], [`ToolRules`])
//! - [`error`] -- Registry configuration errors ([`ToolError`])
//! - [`tools`] -- The tool contract, built-in tools, and the [`ToolRegistry`]
//! - [`vitals`] -- Per-tick hunger progression and starvation damage

pub mod combat;
pub mod config;
pub mod error;
pub mod tools;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use config::{HungerConfig, ToolRules};
pub use error::ToolError;
pub use tools::params::{ParamKind, ParamSpec, Params};
pub use tools::registry::{Prepared, RegisteredTool, ToolDescriptor, ToolRegistry};
pub use tools::{Rejection, ToolContext, ToolKind};
