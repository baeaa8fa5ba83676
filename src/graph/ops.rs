//! Edit operations over the graph model.
//!
//! This is the only path through which nodes and edges are mutated. The two
//! structural invariants are enforced here, before a mutation is admitted:
//! no self-loops or cycles on connect, and reachability-preserving edge
//! rewiring on node deletion. Invariant violations are silently rejected:
//! the attempted edge simply never appears.

use std::{collections::HashSet, sync::Arc};

use serde_json::Value as JsonValue;

use crate::{
    DagflowError, Result,
    common::BroadcastQueue,
    graph::GraphModel,
    model::{ActionConfig, Edge, EdgeId, GraphSnapshot, Node, NodeData, NodeId, NodeKind, Position},
};

const CHANGE_QUEUE_SIZE: usize = 256;

/// Notification that the graph content changed, carrying the new revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphChange {
    pub revision: u64,
}

/// The host canvas's coordinate transform: pan offset plus zoom factor.
///
/// Drop coordinates arrive in screen space; nodes live in graph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Translates a screen-space coordinate into graph space.
    pub fn to_graph(
        &self,
        screen: Position,
    ) -> Position {
        Position {
            x: (screen.x - self.x) / self.zoom,
            y: (screen.y - self.y) / self.zoom,
        }
    }
}

/// Invariant-enforcing mutation surface over a [`GraphModel`].
///
/// Every successful mutation broadcasts a [`GraphChange`]; an observer
/// recomputes and pushes the snapshot to the validation gateway whenever one
/// arrives.
pub struct GraphEditor {
    graph: Arc<GraphModel>,
    changes: Arc<BroadcastQueue<GraphChange>>,
}

impl GraphEditor {
    pub fn new(graph: Arc<GraphModel>) -> Self {
        Self {
            graph,
            changes: BroadcastQueue::new(CHANGE_QUEUE_SIZE),
        }
    }

    /// The change broadcast other components subscribe to.
    pub fn changes(&self) -> Arc<BroadcastQueue<GraphChange>> {
        self.changes.clone()
    }

    /// The underlying model.
    pub fn graph(&self) -> Arc<GraphModel> {
        self.graph.clone()
    }

    fn committed(&self) {
        let revision = self.graph.bump_revision();
        let _ = self.changes.send(GraphChange {
            revision,
        });
    }

    /// Attempts to connect `source` to `target`.
    ///
    /// The candidate is rejected, with no other effect, when the target
    /// cannot be resolved, the edge would be a self-loop, an identical edge
    /// already exists, or admitting it would close a cycle.
    pub fn attempt_connect(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> bool {
        if self.graph.get_node(target).is_none() {
            return false;
        }
        if source == target {
            return false;
        }
        if self.graph.get_edge(&Edge::derive_id(source, target)).is_some() {
            return false;
        }
        if self.would_close_cycle(source, target) {
            return false;
        }

        match self.graph.add_edge(Edge::between(source, target)) {
            Ok(()) => {
                self.committed();
                true
            }
            Err(_) => false,
        }
    }

    /// Walks forward from `target` along existing edges; reaching `source`
    /// means the candidate edge would close a cycle. The visited set makes the
    /// walk terminate on any graph shape, including ones that already
    /// contain cycles.
    fn would_close_cycle(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> bool {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![target.clone()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for outgoer in self.graph.outgoers(&current) {
                if outgoer.eq(source) {
                    return true;
                }
                stack.push(outgoer);
            }
        }
        false
    }

    /// Deletes a node, removing every edge touching it and synthesizing a
    /// direct incomer→outgoer edge for each pair, so transitive reachability
    /// through the deleted node survives. Pairs whose direct edge already
    /// exists are left as they are.
    pub fn delete_node(
        &self,
        id: &NodeId,
    ) -> bool {
        if self.graph.get_node(id).is_none() {
            return false;
        }

        let incomers = self.graph.incomers(id);
        let outgoers = self.graph.outgoers(id);
        self.graph.remove_node(id);

        for source in incomers.iter() {
            for target in outgoers.iter() {
                let edge = Edge::between(source, target);
                if self.graph.get_edge(&edge.id).is_none() {
                    let _ = self.graph.add_edge(edge);
                }
            }
        }

        self.committed();
        true
    }

    /// Deletes a batch of nodes in order. Each deletion computes its
    /// incomers/outgoers against the edge set as already rewritten by the
    /// deletions before it in the same batch.
    pub fn delete_nodes(
        &self,
        ids: &[NodeId],
    ) {
        for id in ids.iter() {
            self.delete_node(id);
        }
    }

    /// Removes an edge; removing an edge that is already gone is a no-op.
    pub fn delete_edge(
        &self,
        id: &EdgeId,
    ) -> bool {
        if self.graph.remove_edge(id) {
            self.committed();
            return true;
        }
        false
    }

    /// Creates a node of the given kind from a drop payload, translating the
    /// screen-space drop coordinate into graph space.
    pub fn drop_node(
        &self,
        kind: NodeKind,
        payload: JsonValue,
        screen: Position,
        viewport: &Viewport,
    ) -> Result<NodeId> {
        let node = Node::from_drop(kind, payload, viewport.to_graph(screen))?;
        let id = node.id.clone();
        self.graph.add_node(node)?;
        self.committed();
        Ok(id)
    }

    /// Re-syncs a custom node's action config from the inline editor.
    ///
    /// The params pass the node's own kind schema, so a condition node can
    /// never end up holding a webhook config.
    pub fn update_node_config(
        &self,
        id: &NodeId,
        params: JsonValue,
    ) -> Result<()> {
        let node = self.graph.get_node(id).ok_or(DagflowError::Node(format!("node {} not found", id)))?;
        let kind = match &node.data {
            NodeData::Custom(data) => data.custom_type,
            NodeData::Content(_) => return Err(DagflowError::Node(format!("node {} carries no action config", id))),
        };

        let config = ActionConfig::create(kind, params)?;
        self.graph.update_node(id, |node| {
            if let NodeData::Custom(data) = &mut node.data {
                data.config = config;
            }
        });
        self.committed();
        Ok(())
    }

    /// Renames a node's label, the one mutable field of content data.
    pub fn rename_node(
        &self,
        id: &NodeId,
        label: &str,
    ) -> Result<()> {
        let renamed = self.graph.update_node(id, |node| match &mut node.data {
            NodeData::Content(data) => data.label = label.to_string(),
            NodeData::Custom(data) => data.label = label.to_string(),
        });
        if !renamed {
            return Err(DagflowError::Node(format!("node {} not found", id)));
        }
        self.committed();
        Ok(())
    }

    /// Sets the snapshot title.
    pub fn set_title(
        &self,
        title: &str,
    ) {
        self.graph.set_title(title);
        self.committed();
    }

    /// Replaces the session state with a loaded snapshot.
    pub fn load_snapshot(
        &self,
        snapshot: &GraphSnapshot,
    ) -> Result<()> {
        self.graph.load_snapshot(snapshot)?;
        self.committed();
        Ok(())
    }

    /// Returns the session to the empty state unconditionally.
    pub fn reset(&self) {
        self.graph.clear();
        self.committed();
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::model::{ContentData, NodeData, NodeKind};

    fn editor() -> GraphEditor {
        GraphEditor::new(Arc::new(GraphModel::new()))
    }

    fn add_content_node(
        editor: &GraphEditor,
        id: &str,
    ) {
        editor
            .graph()
            .add_node(Node {
                id: id.to_string(),
                kind: NodeKind::Content,
                position: Position::default(),
                data: NodeData::Content(ContentData {
                    label: id.to_string(),
                    content_guid: format!("guid-{}", id),
                    content_type: "quarto".to_string(),
                    ..Default::default()
                }),
            })
            .unwrap();
    }

    fn edge_ids(editor: &GraphEditor) -> Vec<String> {
        let mut ids: Vec<String> = editor.graph().to_snapshot().edges.into_iter().map(|e| e.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_connect_sequences_stay_acyclic() {
        let editor = editor();
        for id in ["a", "b", "c", "d", "e"] {
            add_content_node(&editor, id);
        }

        // Build a chain with a diamond in the middle
        assert!(editor.attempt_connect(&"a".to_string(), &"b".to_string()));
        assert!(editor.attempt_connect(&"b".to_string(), &"c".to_string()));
        assert!(editor.attempt_connect(&"b".to_string(), &"d".to_string()));
        assert!(editor.attempt_connect(&"c".to_string(), &"e".to_string()));
        assert!(editor.attempt_connect(&"d".to_string(), &"e".to_string()));

        // Every back edge that would close a cycle is rejected
        assert!(!editor.attempt_connect(&"e".to_string(), &"a".to_string()));
        assert!(!editor.attempt_connect(&"e".to_string(), &"b".to_string()));
        assert!(!editor.attempt_connect(&"c".to_string(), &"a".to_string()));
        assert!(!editor.attempt_connect(&"d".to_string(), &"b".to_string()));
        assert_eq!(editor.graph().edge_count(), 5);

        // Cross edges that keep the graph acyclic are still admitted
        assert!(editor.attempt_connect(&"a".to_string(), &"e".to_string()));
        assert_eq!(editor.graph().edge_count(), 6);
    }

    #[test]
    fn test_self_loop_rejected() {
        let editor = editor();
        add_content_node(&editor, "only");
        assert!(!editor.attempt_connect(&"only".to_string(), &"only".to_string()));
        assert_eq!(editor.graph().edge_count(), 0);
    }

    #[test]
    fn test_unresolved_target_rejected() {
        let editor = editor();
        add_content_node(&editor, "a");
        assert!(!editor.attempt_connect(&"a".to_string(), &"ghost".to_string()));
    }

    #[test]
    fn test_duplicate_connect_rejected() {
        let editor = editor();
        add_content_node(&editor, "a");
        add_content_node(&editor, "b");
        assert!(editor.attempt_connect(&"a".to_string(), &"b".to_string()));
        assert!(!editor.attempt_connect(&"a".to_string(), &"b".to_string()));
        assert_eq!(editor.graph().edge_count(), 1);
    }

    #[test]
    fn test_delete_node_synthesizes_cross_product() {
        let editor = editor();
        for id in ["a", "b", "hub", "c", "d"] {
            add_content_node(&editor, id);
        }
        assert!(editor.attempt_connect(&"a".to_string(), &"hub".to_string()));
        assert!(editor.attempt_connect(&"b".to_string(), &"hub".to_string()));
        assert!(editor.attempt_connect(&"hub".to_string(), &"c".to_string()));
        assert!(editor.attempt_connect(&"hub".to_string(), &"d".to_string()));

        assert!(editor.delete_node(&"hub".to_string()));

        assert!(editor.graph().get_node(&"hub".to_string()).is_none());
        assert_eq!(edge_ids(&editor), vec!["a->c", "a->d", "b->c", "b->d"]);
    }

    #[test]
    fn test_delete_node_with_empty_side_synthesizes_nothing() {
        let editor = editor();
        for id in ["a", "sink"] {
            add_content_node(&editor, id);
        }
        assert!(editor.attempt_connect(&"a".to_string(), &"sink".to_string()));

        // A node with incomers but zero outgoers leaves no dangling half-edges
        assert!(editor.delete_node(&"sink".to_string()));
        assert_eq!(editor.graph().edge_count(), 0);
        assert_eq!(editor.graph().node_count(), 1);
    }

    #[test]
    fn test_delete_nodes_chain_rewires_progressively() {
        let editor = editor();
        for id in ["x", "a", "b", "y"] {
            add_content_node(&editor, id);
        }
        assert!(editor.attempt_connect(&"x".to_string(), &"a".to_string()));
        assert!(editor.attempt_connect(&"a".to_string(), &"b".to_string()));
        assert!(editor.attempt_connect(&"b".to_string(), &"y".to_string()));

        // Deleting a rewires x->b; deleting b must see that synthesized edge,
        // not the original set, so x->y survives the whole batch.
        editor.delete_nodes(&["a".to_string(), "b".to_string()]);

        assert_eq!(editor.graph().node_count(), 2);
        assert_eq!(edge_ids(&editor), vec!["x->y"]);
    }

    #[test]
    fn test_delete_node_keeps_existing_direct_edge() {
        let editor = editor();
        for id in ["a", "hub", "c"] {
            add_content_node(&editor, id);
        }
        assert!(editor.attempt_connect(&"a".to_string(), &"hub".to_string()));
        assert!(editor.attempt_connect(&"hub".to_string(), &"c".to_string()));
        assert!(editor.attempt_connect(&"a".to_string(), &"c".to_string()));

        assert!(editor.delete_node(&"hub".to_string()));
        assert_eq!(edge_ids(&editor), vec!["a->c"]);
    }

    #[test]
    fn test_delete_edge_is_idempotent() {
        let editor = editor();
        add_content_node(&editor, "a");
        add_content_node(&editor, "b");
        assert!(editor.attempt_connect(&"a".to_string(), &"b".to_string()));

        assert!(editor.delete_edge(&"a->b".to_string()));
        assert!(!editor.delete_edge(&"a->b".to_string()));
        assert_eq!(editor.graph().edge_count(), 0);
    }

    #[test]
    fn test_drop_node_transforms_screen_position() {
        let editor = editor();
        let viewport = Viewport {
            x: 50.0,
            y: 20.0,
            zoom: 2.0,
        };
        let id = editor
            .drop_node(
                NodeKind::Content,
                json!({ "label": "report", "contentGuid": "guid-1", "contentType": "quarto" }),
                Position {
                    x: 150.0,
                    y: 120.0,
                },
                &viewport,
            )
            .unwrap();

        let node = editor.graph().get_node(&id).unwrap();
        assert_eq!(node.position, Position { x: 50.0, y: 50.0 });
    }

    #[test]
    fn test_update_node_config_respects_kind() {
        let editor = editor();
        let id = editor
            .drop_node(
                NodeKind::Custom,
                json!({ "label": "Webhook", "nodeType": "webhook", "customType": "webhook" }),
                Position::default(),
                &Viewport::default(),
            )
            .unwrap();

        editor.update_node_config(&id, json!({ "url": "https://api.example.com", "method": "POST" })).unwrap();
        // A delay-shaped config never lands on a webhook node
        assert!(editor.update_node_config(&id, json!({ "duration": 5, "unit": "seconds" })).is_err());
    }

    #[test]
    fn test_mutations_broadcast_changes() {
        let editor = editor();
        let mut changes = editor.changes().subscribe();

        add_content_node(&editor, "a");
        add_content_node(&editor, "b");
        assert!(editor.attempt_connect(&"a".to_string(), &"b".to_string()));
        let change = changes.try_recv().unwrap();
        assert_eq!(change.revision, editor.graph().revision());

        editor.set_title("pipeline");
        assert!(changes.try_recv().unwrap().revision > change.revision);

        // Rejected mutations broadcast nothing
        assert!(!editor.attempt_connect(&"a".to_string(), &"a".to_string()));
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_editing_scenario_end_to_end() {
        let editor = editor();

        // Drop one content node
        let content = editor
            .drop_node(
                NodeKind::Content,
                json!({ "label": "report", "contentGuid": "guid-1", "contentType": "quarto" }),
                Position {
                    x: 100.0,
                    y: 100.0,
                },
                &Viewport::default(),
            )
            .unwrap();
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(editor.graph().edge_count(), 0);

        // Drop a custom action and connect content -> action
        let action = editor
            .drop_node(
                NodeKind::Custom,
                json!({ "label": "Webhook", "nodeType": "webhook", "customType": "webhook" }),
                Position {
                    x: 300.0,
                    y: 100.0,
                },
                &Viewport::default(),
            )
            .unwrap();
        assert!(editor.attempt_connect(&content, &action));
        assert_eq!(editor.graph().node_count(), 2);
        assert_eq!(editor.graph().edge_count(), 1);

        // The reverse connect would close a 2-cycle
        assert!(!editor.attempt_connect(&action, &content));
        assert_eq!(editor.graph().edge_count(), 1);

        // Deleting the content node leaves the action alone, with nothing
        // synthesized (zero incomers to cross with zero outgoers)
        assert!(editor.delete_node(&content));
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(editor.graph().edge_count(), 0);

        // Reset returns to the empty state
        editor.set_title("demo");
        editor.reset();
        assert_eq!(editor.graph().node_count(), 0);
        assert_eq!(editor.graph().title(), "");
    }
}
