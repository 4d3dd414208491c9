//! Graph wrapper using petgraph::StableDiGraph keyed by NodeId

use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// The lineage graph: a directed graph with at most one edge per ordered
/// node pair and exactly one node per identity.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node. Returns false when a node with the same id already exists;
    /// the existing node is kept.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Add an edge. Returns false, leaving the graph untouched, when either
    /// endpoint is missing or the pair is already connected.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        let (Some(&source), Some(&target)) =
            (self.index.get(&edge.source), self.index.get(&edge.target))
        else {
            return false;
        };
        if self.inner.find_edge(source, target).is_some() {
            return false;
        }
        self.inner.add_edge(source, target, edge);
        true
    }

    /// Add an edge, replacing the kind and label of an existing edge for the
    /// same ordered pair. The replaced edge keeps its position in edge order.
    /// Returns false when either endpoint is missing.
    pub fn set_edge(&mut self, edge: GraphEdge) -> bool {
        let (Some(&source), Some(&target)) =
            (self.index.get(&edge.source), self.index.get(&edge.target))
        else {
            return false;
        };
        match self.inner.find_edge(source, target) {
            Some(idx) => self.inner[idx] = edge,
            None => {
                self.inner.add_edge(source, target, edge);
            }
        }
        true
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Get a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    /// The edge from `source` to `target`, if any.
    pub fn edge(&self, source: &NodeId, target: &NodeId) -> Option<&GraphEdge> {
        let source = *self.index.get(source)?;
        let target = *self.index.get(target)?;
        let idx = self.inner.find_edge(source, target)?;
        self.inner.edge_weight(idx)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: &NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges_directed(source, Direction::Outgoing)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: &NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges_directed(target, Direction::Incoming)
    }

    fn edges_directed(&self, id: &NodeId, dir: Direction) -> impl Iterator<Item = &GraphEdge> {
        self.index
            .get(id)
            .into_iter()
            .flat_map(move |&idx| self.inner.edges_directed(idx, dir))
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Check if an edge of a specific kind exists between two nodes.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edge(source, target).is_some_and(|e| e.kind == kind)
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.all_nodes().filter(move |n| n.kind() == kind)
    }

    /// Get all edges of a specific kind.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.all_edges().filter(move |e| e.kind == kind)
    }

    pub(crate) fn inner(&self) -> &StableDiGraph<GraphNode, GraphEdge> {
        &self.inner
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
