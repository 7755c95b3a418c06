//! Parameter schemas and normalisation of raw intent parameters.
//!
//! Planners and humans name parameters inconsistently (`target`, `to`,
//! `location_id`, ...). Each tool declares canonical parameter names with
//! accepted aliases; [`Params::normalize`] maps raw input onto the
//! canonical names once, so validators and generators only ever see one
//! spelling.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use skald_types::RejectionReason;

use super::{Rejection, ToolKind};

/// What sort of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free text.
    Text,
    /// A positive whole number.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A location key or name.
    Location,
    /// An item key or name.
    Item,
    /// An actor key or name.
    Actor,
    /// A conversation identifier.
    Conversation,
    /// An equipment slot name.
    Slot,
    /// A structured JSON object.
    Object,
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Canonical name.
    pub name: &'static str,
    /// Value kind.
    pub kind: ParamKind,
    /// Whether the tool refuses to run without it.
    pub required: bool,
    /// Other names accepted on input.
    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

const fn spec(
    name: &'static str,
    kind: ParamKind,
    required: bool,
    aliases: &'static [&'static str],
) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required,
        aliases,
    }
}

const DESTINATION: ParamSpec = spec(
    "target_location",
    ParamKind::Location,
    true,
    &["location_id", "location", "destination", "to", "target"],
);
const ITEM: ParamSpec = spec("item_id", ParamKind::Item, true, &["item", "target", "target_id"]);
const TARGET: ParamSpec = spec("target_id", ParamKind::Actor, true, &["target", "target_ids"]);
const ADDRESSEE: ParamSpec = spec("target_id", ParamKind::Actor, false, &["target", "target_ids"]);
const RECIPIENT: ParamSpec = spec("recipient_id", ParamKind::Actor, true, &["recipient", "target_id"]);
const SLOT: ParamSpec = spec("slot", ParamKind::Slot, true, &["equipment_slot"]);
const OPTIONAL_SLOT: ParamSpec = spec("slot", ParamKind::Slot, false, &["equipment_slot"]);
const OPTIONAL_ITEM: ParamSpec = spec("item_id", ParamKind::Item, false, &["item"]);
const CONTENT: ParamSpec = spec("content", ParamKind::Text, true, &["message", "text", "speech"]);
const TICKS: ParamSpec = spec("ticks", ParamKind::Integer, false, &["duration"]);
const CONVERSATION: ParamSpec = spec("conversation_id", ParamKind::Conversation, false, &["conversation"]);
const ENABLED: ParamSpec = spec("enabled", ParamKind::Boolean, true, &["value"]);
const THOUGHT: ParamSpec = spec("thought", ParamKind::Text, false, &["reasoning"]);
const DESIRED_OUTCOME: ParamSpec = spec("desired_outcome", ParamKind::Object, true, &["outcome"]);
const OUTPUTS: ParamSpec = spec("outputs", ParamKind::Object, true, &["reflection"]);

/// The parameter schema of `kind`.
pub const fn schema(kind: ToolKind) -> &'static [ParamSpec] {
    match kind {
        ToolKind::Look | ToolKind::Inventory | ToolKind::Stats => &[],
        ToolKind::Move | ToolKind::Open | ToolKind::Close => &[DESTINATION],
        ToolKind::Grab | ToolKind::Drop | ToolKind::Eat | ToolKind::Analyze => &[ITEM],
        ToolKind::Give => &[ITEM, RECIPIENT],
        ToolKind::Equip => &[ITEM, SLOT],
        ToolKind::Unequip => &[OPTIONAL_SLOT, OPTIONAL_ITEM],
        ToolKind::Attack => &[TARGET],
        ToolKind::Talk => &[CONTENT, ADDRESSEE],
        ToolKind::TalkLoud | ToolKind::Scream => &[CONTENT],
        ToolKind::Wait | ToolKind::Rest => &[TICKS],
        ToolKind::Interject => &[CONTENT, CONVERSATION],
        ToolKind::LeaveConversation => &[CONVERSATION],
        ToolKind::ToggleStarvation => &[ENABLED],
        ToolKind::Reason => &[THOUGHT, DESIRED_OUTCOME],
        ToolKind::Reflect => &[THOUGHT, OUTPUTS],
    }
}

/// Parameters keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, Value>,
}

impl Params {
    /// Map raw parameters onto `kind`'s canonical names.
    ///
    /// For each declared parameter the canonical name wins, then the first
    /// alias present. An array value (as in `target_ids`) contributes its
    /// first element, except for objects, which are kept whole. Text is
    /// trimmed and cut to `max_content_chars` characters. Undeclared keys
    /// are dropped.
    pub fn normalize(
        kind: ToolKind,
        raw: &BTreeMap<String, Value>,
        max_content_chars: usize,
    ) -> Self {
        let mut values = BTreeMap::new();
        for spec in kind.params() {
            let found = std::iter::once(spec.name)
                .chain(spec.aliases.iter().copied())
                .find_map(|key| raw.get(key));
            let Some(value) = found else {
                continue;
            };
            let value = match value {
                Value::Array(items) if spec.kind != ParamKind::Object => match items.first() {
                    Some(first) => first.clone(),
                    None => continue,
                },
                Value::String(text) if spec.kind == ParamKind::Text => {
                    Value::String(text.trim().chars().take(max_content_chars).collect())
                }
                Value::String(text) => Value::String(text.trim().to_owned()),
                other => other.clone(),
            };
            values.insert(spec.name.to_owned(), value);
        }
        Self { values }
    }

    /// Build directly from canonical pairs. Test and replay helper.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        }
    }

    /// A text parameter, if present and non-empty.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }

    /// A required text parameter.
    pub fn require_text(&self, name: &str) -> Result<&str, Rejection> {
        match self.values.get(name) {
            None => Err(Rejection::new(
                RejectionReason::MissingParameter,
                format!("`{name}` is required"),
            )),
            Some(Value::String(text)) if !text.is_empty() => Ok(text),
            Some(Value::String(_)) => Err(Rejection::new(
                RejectionReason::MissingParameter,
                format!("`{name}` is empty"),
            )),
            Some(other) => Err(Rejection::new(
                RejectionReason::InvalidParameter,
                format!("`{name}` must be text, got {other}"),
            )),
        }
    }

    /// A required object parameter, returned whole.
    pub fn require_object(&self, name: &str) -> Result<&Value, Rejection> {
        match self.values.get(name) {
            None | Some(Value::Null) => Err(Rejection::new(
                RejectionReason::MissingParameter,
                format!("`{name}` is required"),
            )),
            Some(value @ Value::Object(_)) => Ok(value),
            Some(other) => Err(Rejection::new(
                RejectionReason::InvalidParameter,
                format!("`{name}` must be an object, got {other}"),
            )),
        }
    }

    /// The `ticks` parameter: defaults to 1, must be at least 1.
    ///
    /// Numeric strings are accepted.
    pub fn ticks(&self) -> Result<u64, Rejection> {
        let ticks = match self.values.get("ticks") {
            None | Some(Value::Null) => 1,
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid_ticks(n))?,
            Some(Value::String(s)) => s.parse::<u64>().ok().ok_or_else(|| invalid_ticks(s))?,
            Some(other) => return Err(invalid_ticks(other)),
        };
        if ticks == 0 {
            return Err(invalid_ticks(&ticks));
        }
        Ok(ticks)
    }

    /// A required boolean parameter. Accepts `true`/`false`, `on`/`off`.
    pub fn require_bool(&self, name: &str) -> Result<bool, Rejection> {
        match self.values.get(name) {
            None => Err(Rejection::new(
                RejectionReason::MissingParameter,
                format!("`{name}` is required"),
            )),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::String(s)) if matches!(s.as_str(), "true" | "on" | "yes") => Ok(true),
            Some(Value::String(s)) if matches!(s.as_str(), "false" | "off" | "no") => Ok(false),
            Some(other) => Err(Rejection::new(
                RejectionReason::InvalidParameter,
                format!("`{name}` must be a boolean, got {other}"),
            )),
        }
    }
}

fn invalid_ticks(value: &impl core::fmt::Display) -> Rejection {
    Rejection::new(
        RejectionReason::InvalidParameter,
        format!("`ticks` must be a whole number of at least 1, got {value}"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn aliases_map_to_canonical_names() {
        let params = Params::normalize(ToolKind::Move, &raw(&[("to", Value::from("street"))]), 200);
        assert_eq!(params.text("target_location"), Some("street"));

        let params = Params::normalize(
            ToolKind::Attack,
            &raw(&[("target_ids", serde_json::json!(["rat", "guard"]))]),
            200,
        );
        assert_eq!(params.text("target_id"), Some("rat"));
    }

    #[test]
    fn canonical_name_beats_alias() {
        let params = Params::normalize(
            ToolKind::Give,
            &raw(&[
                ("item_id", Value::from("bread-1")),
                ("item", Value::from("apple-1")),
                ("recipient", Value::from("barkeep")),
            ]),
            200,
        );
        assert_eq!(params.text("item_id"), Some("bread-1"));
        assert_eq!(params.text("recipient_id"), Some("barkeep"));
    }

    #[test]
    fn content_is_trimmed_and_cut() {
        let long = format!("  {}  ", "a".repeat(300));
        let params = Params::normalize(ToolKind::Talk, &raw(&[("message", Value::from(long))]), 200);
        assert_eq!(params.require_text("content").unwrap().len(), 200);
    }

    #[test]
    fn ticks_validation() {
        assert_eq!(Params::default().ticks().unwrap(), 1);
        let params = Params::from_pairs([("ticks", Value::from("3"))]);
        assert_eq!(params.ticks().unwrap(), 3);
        let zero = Params::from_pairs([("ticks", Value::from(0))]);
        assert_eq!(zero.ticks().unwrap_err().reason, RejectionReason::InvalidParameter);
        let negative = Params::from_pairs([("ticks", Value::from(-2))]);
        assert!(negative.ticks().is_err());
    }

    #[test]
    fn objects_are_kept_whole() {
        let outcome = serde_json::json!({"add_goal": {"text": "Find the key", "type": "go_to"}});
        let params = Params::normalize(ToolKind::Reason, &raw(&[("outcome", outcome.clone())]), 200);
        assert_eq!(params.require_object("desired_outcome").unwrap(), &outcome);

        let listed = Params::normalize(ToolKind::Reflect, &raw(&[("outputs", serde_json::json!([1]))]), 200);
        assert_eq!(
            listed.require_object("outputs").unwrap_err().reason,
            RejectionReason::InvalidParameter
        );
        assert_eq!(
            Params::default().require_object("outputs").unwrap_err().reason,
            RejectionReason::MissingParameter
        );
    }

    #[test]
    fn missing_and_mistyped_text() {
        let params = Params::from_pairs([("content", Value::from(5))]);
        assert_eq!(
            params.require_text("content").unwrap_err().reason,
            RejectionReason::InvalidParameter
        );
        assert_eq!(
            Params::default().require_text("content").unwrap_err().reason,
            RejectionReason::MissingParameter
        );
    }
}
