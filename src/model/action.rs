//! Custom-action configuration payloads.
//!
//! Each custom-action kind carries its own strongly-typed config, admitted
//! through a per-kind JSON schema at construction and serialized untagged for
//! backend compatibility.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Result, model::CustomActionKind};

/// Config payload of a custom-action node, one case per action kind.
///
/// Discriminated at construction ([`ActionConfig::create`]), pattern-matched
/// at render/serialize time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ActionConfig {
    Webhook(WebhookConfig),
    Delay(DelayConfig),
    Condition(ConditionConfig),
}

/// HTTP method of a webhook call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

/// Time unit of a delay step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DelayUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

/// Webhook action: make an HTTP call when the step runs.
///
/// `headers` and `body` hold JSON-encoded text, exactly as the inline config
/// editor stores them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    pub url: String,
    pub method: HttpMethod,
    pub headers: String,
    pub body: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: HttpMethod::GET,
            headers: "{}".to_string(),
            body: String::new(),
        }
    }
}

/// Delay action: pause between operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DelayConfig {
    pub duration: u64,
    pub unit: DelayUnit,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            duration: 5,
            unit: DelayUnit::Seconds,
        }
    }
}

/// Condition action: branch on a server-evaluated expression.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ConditionConfig {
    pub condition: String,
    pub condition_type: String,
    pub true_action: String,
    pub false_action: String,
    pub target_node_id: String,
    pub notification_message: String,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            condition: String::new(),
            condition_type: "custom".to_string(),
            true_action: "continue".to_string(),
            false_action: "skip".to_string(),
            target_node_id: String::new(),
            notification_message: String::new(),
        }
    }
}

impl ActionConfig {
    /// Admits a loose config map as the config of the given action kind.
    ///
    /// The params are validated against the kind's schema before they are
    /// deserialized, so a config that survives construction always matches
    /// its node's `customType`.
    pub fn create(
        kind: CustomActionKind,
        params: JsonValue,
    ) -> Result<Self> {
        jsonschema::validate(&params, &Self::schema(kind))?;
        let config = match kind {
            CustomActionKind::Webhook => ActionConfig::Webhook(serde_json::from_value(params)?),
            CustomActionKind::Delay => ActionConfig::Delay(serde_json::from_value(params)?),
            CustomActionKind::Condition => ActionConfig::Condition(serde_json::from_value(params)?),
        };
        Ok(config)
    }

    /// The default config form of the given action kind.
    pub fn default_for(kind: CustomActionKind) -> Self {
        match kind {
            CustomActionKind::Webhook => ActionConfig::Webhook(WebhookConfig::default()),
            CustomActionKind::Delay => ActionConfig::Delay(DelayConfig::default()),
            CustomActionKind::Condition => ActionConfig::Condition(ConditionConfig::default()),
        }
    }

    /// The action kind this config belongs to.
    pub fn kind(&self) -> CustomActionKind {
        match self {
            ActionConfig::Webhook(_) => CustomActionKind::Webhook,
            ActionConfig::Delay(_) => CustomActionKind::Delay,
            ActionConfig::Condition(_) => CustomActionKind::Condition,
        }
    }

    fn schema(kind: CustomActionKind) -> JsonValue {
        match kind {
            CustomActionKind::Webhook => serde_json::json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Request URL"
                    },
                    "method": {
                        "type": "string",
                        "enum": ["GET", "POST", "PUT", "PATCH", "DELETE"]
                    },
                    "headers": {
                        "type": "string",
                        "description": "JSON-encoded header map"
                    },
                    "body": {
                        "type": "string",
                        "description": "JSON-encoded request body"
                    }
                }
            }),
            CustomActionKind::Delay => serde_json::json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "duration": {
                        "type": "integer",
                        "minimum": 1
                    },
                    "unit": {
                        "type": "string",
                        "enum": ["seconds", "minutes", "hours"]
                    }
                }
            }),
            CustomActionKind::Condition => serde_json::json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "condition": { "type": "string" },
                    "conditionType": { "type": "string" },
                    "trueAction": { "type": "string" },
                    "falseAction": { "type": "string" },
                    "targetNodeId": { "type": "string" },
                    "notificationMessage": { "type": "string" }
                }
            }),
        }
    }
}
