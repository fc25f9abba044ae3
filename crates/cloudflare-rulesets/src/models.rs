//! Ruleset models.
//!
//! Rulesets and rules are provider-defined documents. They are kept as
//! transparent JSON objects so every field round-trips unchanged, with typed
//! accessors for the fields callers commonly read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A zone ruleset as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ruleset(Map<String, Value>);

impl Ruleset {
    /// Wrap a raw JSON object.
    #[must_use]
    pub const fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Ruleset ID.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Informative description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Ruleset kind (`zone`, `custom`, `managed`, `root`).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.str_field("kind")
    }

    /// Processing phase, e.g. `http_request_dynamic_redirect`.
    #[must_use]
    pub fn phase(&self) -> Option<&str> {
        self.str_field("phase")
    }

    /// Version string, bumped by the API on every update.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    /// Timestamp of the last update, if present and well formed.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.str_field("last_updated")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Rules in evaluation order. Entries that are not JSON objects are skipped.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        self.rule_values()
            .iter()
            .filter_map(|value| value.as_object().cloned().map(Rule))
            .collect()
    }

    /// Raw `rules` entries; empty when the field is absent or not an array.
    #[must_use]
    pub fn rule_values(&self) -> &[Value] {
        self.0
            .get("rules")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up an arbitrary field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when the API returned no ruleset data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Ruleset {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A single rule within a ruleset.
///
/// The `description` doubles as the rule's human-assigned name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(Map<String, Value>);

impl Rule {
    /// Create a rule with the given action and filter expression.
    #[must_use]
    pub fn new(action: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::default()
            .with_field("action", Value::String(action.into()))
            .with_field("expression", Value::String(expression.into()))
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_field("description", Value::String(description.into()))
    }

    /// Set the enabled flag.
    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        self.with_field("enabled", Value::Bool(enabled))
    }

    /// Set an arbitrary field such as `action_parameters`.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Rule ID, assigned by the API.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Description (rule name).
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Action taken when the expression matches.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.str_field("action")
    }

    /// Filter expression.
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        self.str_field("expression")
    }

    /// Enabled flag.
    #[must_use]
    pub fn enabled(&self) -> Option<bool> {
        self.0.get("enabled").and_then(Value::as_bool)
    }

    /// Look up an arbitrary field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Rule {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Ruleset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesetKind {
    /// Provided by the service and deployed into zones.
    Managed,
    /// Account-level custom ruleset.
    Custom,
    /// Account-level entry point.
    Root,
    /// Zone-level entry point.
    Zone,
}

/// Payload for creating or replacing a ruleset.
///
/// Only the fields that are set are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetRequest {
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RulesetKind>,
    /// Phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Rules, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

impl RulesetRequest {
    /// Start a zone entry-point ruleset for `phase`.
    #[must_use]
    pub fn zone(name: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(RulesetKind::Zone),
            phase: Some(phase.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }
}
