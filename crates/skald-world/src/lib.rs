//! World state and the single-writer mutation engine for Skald.
//!
//! This crate owns the entity graph: actors, locations with their passages,
//! and item instances, all held in one [`World`] aggregate. The aggregate is
//! read through shared references everywhere; the only mutable surface is
//! the [`mutation`] module.
//!
//! # Modules
//!
//! - [`definition`] -- Persisted world format, hydration, and the starter
//!   world.
//! - [`error`] -- Error types for hydration and invariant checks.
//! - [`location`] -- [`LocationState`]: passages plus derived occupancy
//!   indexes.
//! - [`mutation`] -- Event application, cooldown charging, perception
//!   delivery.
//! - [`world`] -- The [`World`] aggregate and its read-only API.
//!
//! [`LocationState`]: location::LocationState
//! [`World`]: world::World

pub mod definition;
pub mod error;
pub mod location;
pub mod mutation;
pub mod world;

// Re-export primary types at crate root.
pub use definition::{HydrationOptions, WorldDefinition, starter, starter_world};
pub use error::WorldError;
pub use location::LocationState;
pub use mutation::{AppliedEffect, NoOp, Outcome};
pub use world::World;
