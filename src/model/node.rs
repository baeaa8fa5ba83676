//! Node definitions for the authored graph.
//!
//! A node is either a reference to a piece of published content or a custom
//! action (webhook, delay, condition). Payloads arrive as loose JSON from the
//! host's drag-and-drop surface and are discriminated here, at construction.

use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    DagflowError, Result,
    model::{ActionConfig, SearchResult},
};

/// Unique identifier for a node within a graph.
pub type NodeId = String;

/// The two vertex families the canvas can hold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
pub enum NodeKind {
    /// A reference to published content, dropped from a search result.
    #[serde(rename = "contentNode")]
    #[strum(serialize = "contentNode")]
    Content,
    /// A configurable action step (webhook, delay, condition).
    #[serde(rename = "customNode")]
    #[strum(serialize = "customNode")]
    Custom,
}

/// Canvas coordinate of a node, in graph space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A vertex in the authored workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique node identifier, minted client-side.
    pub id: NodeId,
    /// Which vertex family this node belongs to.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Canvas position; opaque to validation.
    pub position: Position,
    /// Kind-dependent payload.
    pub data: NodeData,
}

/// Kind-dependent node payload.
///
/// Serialized untagged: the two shapes are disjoint on the wire
/// (`contentGuid` vs `customType`), matching the backend contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NodeData {
    Content(ContentData),
    Custom(CustomActionData),
}

/// Payload of a content-reference node.
///
/// All fields are copied verbatim from a search result at drop time and are
/// immutable afterwards, except `label`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub label: String,
    pub content_guid: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<String>,
}

impl ContentData {
    /// Builds a drop payload from a content search result.
    pub fn from_search(item: &SearchResult) -> Self {
        Self {
            label: item.name.clone(),
            content_guid: item.guid.clone(),
            content_type: item.content_type.clone(),
            content_url: item.url.clone(),
            author: Some(item.author.clone().unwrap_or_else(|| "Unknown".to_string())),
            description: item.description.clone(),
            last_deployed: item.last_deployed_time.clone().or_else(|| item.created_time.clone()),
        }
    }
}

/// Which custom action a custom node performs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustomActionKind {
    Webhook,
    Delay,
    Condition,
}

/// Payload of a custom-action node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomActionData {
    pub label: String,
    pub node_type: String,
    pub custom_type: CustomActionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub config: ActionConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomActionPayload {
    label: String,
    node_type: String,
    custom_type: CustomActionKind,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    config: Option<JsonValue>,
}

impl CustomActionData {
    /// Creates custom-action data from a loose drop payload.
    ///
    /// The `config` map is admitted through the per-kind schema; a missing
    /// config takes the kind's default form.
    pub fn create(payload: JsonValue) -> Result<Self> {
        let raw: CustomActionPayload = serde_json::from_value(payload).map_err(|e| DagflowError::Node(format!("invalid custom node payload: {}", e)))?;

        let config = match raw.config {
            Some(params) => ActionConfig::create(raw.custom_type, params)?,
            None => ActionConfig::default_for(raw.custom_type),
        };

        Ok(Self {
            label: raw.label,
            node_type: raw.node_type,
            custom_type: raw.custom_type,
            description: raw.description,
            icon: raw.icon,
            config,
        })
    }
}

impl Node {
    /// Creates a node of the given kind from a drop payload, with a fresh id.
    pub fn from_drop(
        kind: NodeKind,
        payload: JsonValue,
        position: Position,
    ) -> Result<Self> {
        let data = match kind {
            NodeKind::Content => {
                let content = serde_json::from_value::<ContentData>(payload).map_err(|e| DagflowError::Node(format!("invalid content node payload: {}", e)))?;
                NodeData::Content(content)
            }
            NodeKind::Custom => NodeData::Custom(CustomActionData::create(payload)?),
        };

        Ok(Self {
            id: Self::mint_id(),
            kind,
            position,
            data,
        })
    }

    /// Mints a fresh node id, unique within any realistic editing session.
    pub fn mint_id() -> NodeId {
        format!("node-{}", nanoid!(10))
    }

    /// The user-facing label, regardless of kind.
    pub fn label(&self) -> &str {
        match &self.data {
            NodeData::Content(data) => &data.label,
            NodeData::Custom(data) => &data.label,
        }
    }
}
