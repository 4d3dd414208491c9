//! Elementary cycle enumeration (Johnson's algorithm)
//!
//! Cycles are reported for diagnostics only; the graph is never modified.
//! Each cycle starts at its earliest-inserted node and lists the nodes in
//! edge order without repeating the first one.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use crate::graph::Graph;
use crate::model::NodeId;

/// Every elementary cycle of `graph`. Empty when the graph is acyclic.
pub fn find_cycles(graph: &Graph) -> Vec<Vec<NodeId>> {
    let inner = graph.inner();
    let order: Vec<_> = inner.node_indices().collect();
    let dense: HashMap<_, usize> = order.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); order.len()];
    for edge in inner.edge_indices() {
        if let Some((a, b)) = inner.edge_endpoints(edge) {
            adjacency[dense[&a]].push(dense[&b]);
        }
    }
    for targets in &mut adjacency {
        targets.sort_unstable();
        targets.dedup();
    }

    let cycles = simple_cycles(&adjacency);
    tracing::debug!("Found {} elementary cycles", cycles.len());

    cycles
        .into_iter()
        .map(|cycle| {
            cycle
                .into_iter()
                .filter_map(|i| inner.node_weight(order[i]).map(|n| n.id.clone()))
                .collect()
        })
        .collect()
}

/// Johnson's algorithm over a dense adjacency list.
///
/// Strongly connected components are computed once; nodes outside a cyclic
/// component are never searched. Within a component the smallest node is the
/// start, and after its circuits are listed it is removed and the remainder
/// is split into components again. Each cycle starts at its smallest node and
/// the result is sorted.
pub fn simple_cycles(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut cycles = Vec::new();
    let mut search = CircuitSearch {
        adjacency,
        start: 0,
        component: vec![false; n],
        blocked: vec![false; n],
        blocked_by: vec![Vec::new(); n],
        stack: Vec::new(),
        cycles: &mut cycles,
    };

    let all: Vec<usize> = (0..n).collect();
    let mut pending = cyclic_components(adjacency, &all);
    while let Some(component) = pending.pop() {
        let Some(&start) = component.iter().min() else {
            continue;
        };
        search.enter(&component, start);
        search.circuit(start);
        search.leave(&component);

        let rest: Vec<usize> = component.into_iter().filter(|&v| v != start).collect();
        pending.extend(cyclic_components(adjacency, &rest));
    }

    cycles.sort();
    cycles
}

/// Strongly connected components of the subgraph induced by `nodes` that
/// hold at least one cycle.
fn cyclic_components(adjacency: &[Vec<usize>], nodes: &[usize]) -> Vec<Vec<usize>> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let local: HashMap<usize, u32> = nodes
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i as u32))
        .collect();

    let mut sub = DiGraph::<(), ()>::with_capacity(nodes.len(), 0);
    for _ in nodes {
        sub.add_node(());
    }
    let local = &local;
    sub.extend_with_edges(nodes.iter().flat_map(move |&a| {
        let from = local[&a];
        adjacency[a]
            .iter()
            .filter_map(move |b| local.get(b))
            .map(move |&to| (from, to))
    }));

    tarjan_scc(&sub)
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [only] => {
                let v = nodes[only.index()];
                adjacency[v].contains(&v)
            }
            _ => true,
        })
        .map(|scc| scc.into_iter().map(|idx| nodes[idx.index()]).collect())
        .collect()
}

struct CircuitSearch<'a> {
    adjacency: &'a [Vec<usize>],
    start: usize,
    component: Vec<bool>,
    blocked: Vec<bool>,
    blocked_by: Vec<Vec<usize>>,
    stack: Vec<usize>,
    cycles: &'a mut Vec<Vec<usize>>,
}

impl CircuitSearch<'_> {
    fn enter(&mut self, component: &[usize], start: usize) {
        self.start = start;
        for &v in component {
            self.component[v] = true;
        }
    }

    /// Reset per-component state so the buffers can be reused.
    fn leave(&mut self, component: &[usize]) {
        for &v in component {
            self.component[v] = false;
            self.blocked[v] = false;
            self.blocked_by[v].clear();
        }
    }

    fn circuit(&mut self, v: usize) -> bool {
        let mut found = false;
        self.stack.push(v);
        self.blocked[v] = true;

        let adjacency = self.adjacency;
        for &w in &adjacency[v] {
            if !self.component[w] {
                continue;
            }
            if w == self.start {
                self.cycles.push(self.stack.clone());
                found = true;
            } else if !self.blocked[w] && self.circuit(w) {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in &adjacency[v] {
                if self.component[w] && !self.blocked_by[w].contains(&v) {
                    self.blocked_by[w].push(v);
                }
            }
        }
        self.stack.pop();
        found
    }

    fn unblock(&mut self, v: usize) {
        let mut pending = vec![v];
        while let Some(u) = pending.pop() {
            if !self.blocked[u] {
                continue;
            }
            self.blocked[u] = false;
            pending.extend(self.blocked_by[u].drain(..));
        }
    }
}
