//! The dependency graph: forward/reverse adjacency keyed by fully-qualified
//! cell key, cycle detection, and deterministic topological ordering via
//! Kahn's algorithm (spec §4.3, §4.7).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

/// Forward edges point from a cell to the cells it reads; reverse edges
/// point from a cell to the cells that read it. Both are keyed by FQK.
#[derive(Default)]
pub struct DependencyGraph {
    forward: FxHashMap<String, Vec<String>>,
    reverse: FxHashMap<String, Vec<String>>,
    /// Insertion order, used to break topological-sort ties deterministically.
    order_index: FxHashMap<String, usize>,
    nodes: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, key: &str) {
        if !self.order_index.contains_key(key) {
            self.order_index.insert(key.to_string(), self.nodes.len());
            self.nodes.push(key.to_string());
            self.forward.entry(key.to_string()).or_default();
            self.reverse.entry(key.to_string()).or_default();
        }
    }

    /// Record that `dependent` reads `dependency`.
    pub fn add_edge(&mut self, dependent: &str, dependency: &str) {
        self.add_node(dependent);
        self.add_node(dependency);
        self.forward.get_mut(dependent).unwrap().push(dependency.to_string());
        self.reverse.get_mut(dependency).unwrap().push(dependent.to_string());
    }

    pub fn dependents_of(&self, key: &str) -> &[String] {
        self.reverse.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn dependencies_of(&self, key: &str) -> &[String] {
        self.forward.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Topologically order every node reachable in the graph. Nodes that
    /// participate in a cycle, or transitively depend on one, cannot be
    /// ordered and are returned separately so the caller can poison them
    /// (spec §4.7 step 5: `#CYCLE!`).
    ///
    /// Ties among simultaneously-ready nodes are broken by insertion order,
    /// so repeated runs over the same input produce the same order.
    pub fn topological_order(&self) -> TopoResult {
        let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
        for node in &self.nodes {
            in_degree.insert(node.as_str(), self.forward.get(node).map(Vec::len).unwrap_or(0));
        }

        let mut heap: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
        for node in &self.nodes {
            if in_degree[node.as_str()] == 0 {
                heap.push(Reverse((self.order_index[node], node.as_str())));
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse((_, node))) = heap.pop() {
            order.push(node.to_string());
            for dependent in self.dependents_of(node) {
                let deg = in_degree.get_mut(dependent.as_str()).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    heap.push(Reverse((self.order_index[dependent], dependent.as_str())));
                }
            }
        }

        if order.len() == self.nodes.len() {
            return TopoResult::Acyclic(order);
        }

        let ordered: std::collections::HashSet<&str> = order.iter().map(String::as_str).collect();
        let poisoned: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !ordered.contains(n.as_str()))
            .cloned()
            .collect();
        TopoResult::Cyclic { order, poisoned }
    }
}

pub enum TopoResult {
    Acyclic(Vec<String>),
    Cyclic { order: Vec<String>, poisoned: Vec<String> },
}
