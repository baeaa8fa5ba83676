//! Externally exchanged graph state.
//!
//! A [`GraphSnapshot`] is the full node/edge/title state of one editing
//! session, serialized wholesale for every network exchange. An artifact is a
//! snapshot the server has persisted under its own identity.

use serde::{Deserialize, Serialize};

use crate::model::{Edge, Node};

/// The externally persisted unit: everything one editing session holds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub title: String,
}

impl GraphSnapshot {
    /// True when the snapshot carries no nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Server-computed verdict for the latest pushed snapshot.
///
/// Purely advisory: the client performs no structural validation of its own
/// beyond acyclicity and self-loop checks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Metadata of a server-persisted artifact, as listed by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArtifactMeta {
    pub id: String,
    pub name: String,
    pub title: String,
    pub timestamp: String,
    pub nodes_count: u32,
    pub edges_count: u32,
    pub batches_count: u32,
}

/// One item of a content search, the raw material of a content-node drop.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub guid: String,
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_deployed_time: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}
