//! Canonical graph storage.
//!
//! This module holds the node/edge collections one editing session owns. It is
//! pure data: no network, no invariant enforcement. Admission checks and edge
//! rewiring live in the edit operations, which are the only mutation path.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use petgraph::{
    Direction,
    stable_graph::{NodeIndex, StableDiGraph},
    visit::EdgeRef,
};

use crate::{
    DagflowError, Result, ShareLock,
    model::{Edge, EdgeId, GraphSnapshot, Node, NodeId},
};

/// The canonical node/edge collections of one editing session.
///
/// Backed by a stable directed graph so node removal never invalidates the
/// indices of surviving nodes. Accessors address nodes and edges by their
/// string ids, the only identity the wire protocol knows.
pub struct GraphModel {
    graph: ShareLock<StableDiGraph<Node, Edge>>,
    title: ShareLock<String>,
    revision: AtomicU64,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    /// create an empty graph
    pub fn new() -> Self {
        Self {
            graph: ShareLock::new(StableDiGraph::new().into()),
            title: ShareLock::new(String::new().into()),
            revision: AtomicU64::new(0),
        }
    }

    /// add a node; the id must not already exist
    pub fn add_node(
        &self,
        node: Node,
    ) -> Result<()> {
        let mut graph = self.graph.write().unwrap();
        if find_node(&graph, &node.id).is_some() {
            return Err(DagflowError::Node(format!("node id {} already exists", node.id)));
        }
        graph.add_node(node);
        Ok(())
    }

    /// add an edge between two existing nodes; admission checks happen upstream
    pub fn add_edge(
        &self,
        edge: Edge,
    ) -> Result<()> {
        let mut graph = self.graph.write().unwrap();
        let source = find_node(&graph, &edge.source).ok_or(DagflowError::Edge(format!("source node {} not found", edge.source)))?;
        let target = find_node(&graph, &edge.target).ok_or(DagflowError::Edge(format!("target node {} not found", edge.target)))?;
        graph.add_edge(source, target, edge);
        Ok(())
    }

    /// remove a node and every edge touching it, returning the removed node
    pub fn remove_node(
        &self,
        id: &NodeId,
    ) -> Option<Node> {
        let mut graph = self.graph.write().unwrap();
        let idx = find_node(&graph, id)?;
        graph.remove_node(idx)
    }

    /// remove an edge by id
    pub fn remove_edge(
        &self,
        id: &EdgeId,
    ) -> bool {
        let mut graph = self.graph.write().unwrap();
        let idx = graph.edge_indices().find(|idx| graph[*idx].id.eq(id));
        match idx {
            Some(idx) => graph.remove_edge(idx).is_some(),
            None => false,
        }
    }

    /// get node by id
    pub fn get_node(
        &self,
        id: &NodeId,
    ) -> Option<Node> {
        let graph = self.graph.read().unwrap();
        find_node(&graph, id).map(|idx| graph[idx].clone())
    }

    /// get edge by id
    pub fn get_edge(
        &self,
        id: &EdgeId,
    ) -> Option<Edge> {
        let graph = self.graph.read().unwrap();
        graph.edge_indices().find(|idx| graph[*idx].id.eq(id)).map(|idx| graph[idx].clone())
    }

    /// apply `f` to the node with the given id; returns false when absent
    pub fn update_node(
        &self,
        id: &NodeId,
        f: impl FnOnce(&mut Node),
    ) -> bool {
        let mut graph = self.graph.write().unwrap();
        match find_node(&graph, id) {
            Some(idx) => {
                f(&mut graph[idx]);
                true
            }
            None => false,
        }
    }

    /// ids of nodes with an edge into the given node
    pub fn incomers(
        &self,
        id: &NodeId,
    ) -> Vec<NodeId> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// ids of nodes the given node has an edge to
    pub fn outgoers(
        &self,
        id: &NodeId,
    ) -> Vec<NodeId> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    fn neighbor_ids(
        &self,
        id: &NodeId,
        direction: Direction,
    ) -> Vec<NodeId> {
        let graph = self.graph.read().unwrap();
        let Some(idx) = find_node(&graph, id) else {
            return Vec::new();
        };
        graph
            .edges_directed(idx, direction)
            .map(|edge_ref| {
                let neighbor = match direction {
                    Direction::Incoming => edge_ref.source(),
                    Direction::Outgoing => edge_ref.target(),
                };
                graph[neighbor].id.clone()
            })
            .collect()
    }

    /// number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.read().unwrap().node_count()
    }

    /// number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.read().unwrap().edge_count()
    }

    /// the snapshot title
    pub fn title(&self) -> String {
        self.title.read().unwrap().clone()
    }

    /// set the snapshot title
    pub fn set_title(
        &self,
        title: &str,
    ) {
        *self.title.write().unwrap() = title.to_string();
    }

    /// the full session state by value, in insertion order
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let graph = self.graph.read().unwrap();
        GraphSnapshot {
            nodes: graph.node_indices().map(|idx| graph[idx].clone()).collect(),
            edges: graph.edge_indices().map(|idx| graph[idx].clone()).collect(),
            title: self.title(),
        }
    }

    /// replace the whole session state with a snapshot's contents
    pub fn load_snapshot(
        &self,
        snapshot: &GraphSnapshot,
    ) -> Result<()> {
        let mut graph: StableDiGraph<Node, Edge> = StableDiGraph::new();
        let mut nodes = HashMap::new();

        for node in snapshot.nodes.iter() {
            if nodes.contains_key(&node.id) {
                return Err(DagflowError::Node(format!("node id {} already exists", node.id)));
            }
            let nid = node.id.clone();
            let node_idx = graph.add_node(node.clone());
            nodes.insert(nid, node_idx);
        }
        for edge in snapshot.edges.iter() {
            let source = nodes.get(&edge.source).ok_or(DagflowError::Edge(format!("source node {} not found", edge.source)))?;
            let target = nodes.get(&edge.target).ok_or(DagflowError::Edge(format!("target node {} not found", edge.target)))?;
            graph.add_edge(*source, *target, edge.clone());
        }

        *self.graph.write().unwrap() = graph;
        *self.title.write().unwrap() = snapshot.title.clone();
        Ok(())
    }

    /// discard every node, edge and the title
    pub fn clear(&self) {
        *self.graph.write().unwrap() = StableDiGraph::new();
        self.title.write().unwrap().clear();
    }

    /// the current mutation revision
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// bump and return the mutation revision
    pub(crate) fn bump_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn find_node(
    graph: &StableDiGraph<Node, Edge>,
    id: &NodeId,
) -> Option<NodeIndex> {
    graph.node_indices().find(|idx| graph[*idx].id.eq(id))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{ContentData, NodeData, NodeKind, Position};

    fn content_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: NodeKind::Content,
            position: Position::default(),
            data: NodeData::Content(ContentData {
                label: id.to_string(),
                content_guid: format!("guid-{}", id),
                content_type: "quarto".to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let model = GraphModel::new();
        model.add_node(content_node("a")).unwrap();
        model.add_node(content_node("b")).unwrap();
        model.add_edge(Edge::between(&"a".to_string(), &"b".to_string())).unwrap();

        assert_eq!(model.node_count(), 2);
        assert_eq!(model.edge_count(), 1);
        assert!(model.get_node(&"a".to_string()).is_some());
        assert!(model.get_edge(&"a->b".to_string()).is_some());
        assert_eq!(model.incomers(&"b".to_string()), vec!["a".to_string()]);
        assert_eq!(model.outgoers(&"a".to_string()), vec!["b".to_string()]);
    }

    #[test]
    fn test_duplicate_node_id_rejected() {
        let model = GraphModel::new();
        model.add_node(content_node("a")).unwrap();
        assert!(model.add_node(content_node("a")).is_err());
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let model = GraphModel::new();
        model.add_node(content_node("a")).unwrap();
        assert!(model.add_edge(Edge::between(&"a".to_string(), &"ghost".to_string())).is_err());
    }

    #[test]
    fn test_remove_node_drops_touching_edges() {
        let model = GraphModel::new();
        for id in ["a", "b", "c"] {
            model.add_node(content_node(id)).unwrap();
        }
        model.add_edge(Edge::between(&"a".to_string(), &"b".to_string())).unwrap();
        model.add_edge(Edge::between(&"b".to_string(), &"c".to_string())).unwrap();

        assert!(model.remove_node(&"b".to_string()).is_some());
        assert_eq!(model.node_count(), 2);
        assert_eq!(model.edge_count(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let model = GraphModel::new();
        model.add_node(content_node("a")).unwrap();
        model.add_node(content_node("b")).unwrap();
        model.add_edge(Edge::between(&"a".to_string(), &"b".to_string())).unwrap();
        model.set_title("release pipeline");

        let snapshot = model.to_snapshot();
        let restored = GraphModel::new();
        restored.load_snapshot(&snapshot).unwrap();

        assert_eq!(restored.to_snapshot(), snapshot);
        assert_eq!(restored.title(), "release pipeline");
    }

    #[test]
    fn test_load_snapshot_rejects_dangling_edge() {
        let mut snapshot = GraphSnapshot::default();
        snapshot.nodes.push(content_node("a"));
        snapshot.edges.push(Edge::between(&"a".to_string(), &"missing".to_string()));

        let model = GraphModel::new();
        assert!(model.load_snapshot(&snapshot).is_err());
    }
}
