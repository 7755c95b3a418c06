//! Error types for the `skald-actors` crate.
//!
//! Refused intents are not errors: they are [`Rejection`] values returned
//! to the scheduler. [`ToolError`] covers misconfiguration of the registry.
//!
//! [`Rejection`]: crate::tools::Rejection

/// Errors raised while building or configuring the tool registry.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A cost override names a tool that is not registered.
    #[error("cannot override time cost of unknown tool `{name}`")]
    UnknownTool {
        /// The unrecognised tool name.
        name: String,
    },
}
