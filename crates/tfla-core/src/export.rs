//! Serializable snapshot of an assembled graph for renderers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{GraphEdge, GraphNode, NodeId};

/// Node/edge totals broken down by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
}

/// Everything a renderer consumes: nodes and edges in assembly order plus
/// the cycle report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub cycles: Vec<Vec<NodeId>>,
    pub stats: GraphStats,
}

impl GraphDocument {
    pub fn from_graph(graph: &Graph, cycles: Vec<Vec<NodeId>>) -> Self {
        let nodes: Vec<GraphNode> = graph.all_nodes().cloned().collect();
        let edges: Vec<GraphEdge> = graph.all_edges().cloned().collect();

        let mut stats = GraphStats {
            node_count: nodes.len(),
            edge_count: edges.len(),
            ..Default::default()
        };
        for node in &nodes {
            *stats
                .nodes_by_kind
                .entry(node.kind().as_str().to_string())
                .or_insert(0) += 1;
        }
        for edge in &edges {
            *stats
                .edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        GraphDocument {
            nodes,
            edges,
            cycles,
            stats,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
