//! Unvalidated action proposals.
//!
//! An [`Intent`] comes from a human front end or from a planner. Nothing
//! about it is trusted: the tool registry validates it against the world
//! before any event is produced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Errors raised while parsing a raw proposal.
#[derive(Debug, thiserror::Error)]
pub enum IntentParseError {
    /// The text is not JSON.
    #[error("proposal is not valid JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The JSON is not an object.
    #[error("proposal must be a JSON object")]
    NotAnObject,

    /// No tool name was given.
    #[error("proposal names no tool")]
    MissingTool,

    /// `params` is present but not an object.
    #[error("proposal params must be a JSON object")]
    ParamsNotAnObject,
}

/// A proposed action: a tool name plus loosely-typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Intent {
    /// Registered tool name.
    pub tool: String,
    /// Tool parameters.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl Intent {
    /// Intent for `tool` with no parameters.
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    /// The safe default: wait for `ticks` ticks.
    pub fn wait(ticks: u64) -> Self {
        Self::new("wait").with_param("ticks", ticks)
    }

    /// Parse a raw JSON proposal.
    ///
    /// Accepts `{"tool": ..., "params": {...}}`. The tool name may also be
    /// given as `action`, and when `params` is absent any other top-level
    /// keys are taken as parameters.
    pub fn from_json(raw: &str) -> Result<Self, IntentParseError> {
        let value: Value = serde_json::from_str(raw.trim())?;
        let Value::Object(mut object) = value else {
            return Err(IntentParseError::NotAnObject);
        };

        let tool = object
            .remove("tool")
            .or_else(|| object.remove("action"))
            .and_then(|v| v.as_str().map(str::to_owned))
            .filter(|name| !name.trim().is_empty())
            .ok_or(IntentParseError::MissingTool)?;

        let params = match object.remove("params") {
            Some(Value::Object(params)) => params.into_iter().collect(),
            Some(Value::Null) => BTreeMap::new(),
            Some(_) => return Err(IntentParseError::ParamsNotAnObject),
            None => object.into_iter().collect(),
        };

        Ok(Self {
            tool: tool.trim().to_owned(),
            params,
        })
    }
}
