mod action;
mod edge;
mod node;
mod snapshot;

pub use action::{ActionConfig, ConditionConfig, DelayConfig, DelayUnit, HttpMethod, WebhookConfig};
pub use edge::{Edge, EdgeId, EdgeKind};
pub use node::{ContentData, CustomActionData, CustomActionKind, Node, NodeData, NodeId, NodeKind, Position};
pub use snapshot::{ArtifactMeta, GraphSnapshot, SearchResult, ValidationResult};
