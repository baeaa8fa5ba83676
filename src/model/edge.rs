use serde::{Deserialize, Serialize};

use crate::model::NodeId;

/// Unique identifier for an edge within a graph.
pub type EdgeId = String;

/// Interaction affordance of an edge. Every edge this system produces
/// supports interactive removal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Deletable,
}

/// A directed connection between two nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Unique edge identifier, derived from its endpoints.
    pub id: EdgeId,
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node.
    pub target: NodeId,
    /// Interaction affordance; always deletable.
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
}

impl Edge {
    /// Creates a deletable edge between two nodes with its derived id.
    pub fn between(
        source: &NodeId,
        target: &NodeId,
    ) -> Self {
        Self {
            id: Self::derive_id(source, target),
            source: source.clone(),
            target: target.clone(),
            kind: EdgeKind::Deletable,
        }
    }

    /// The deterministic id of the edge source→target.
    pub fn derive_id(
        source: &NodeId,
        target: &NodeId,
    ) -> EdgeId {
        format!("{}->{}", source, target)
    }
}
