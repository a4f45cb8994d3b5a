//! Undirected adjacency-list graph

use crate::core::types::AgentId;

/// Undirected simple graph with nodes `0..node_count`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGraph {
    adjacency: Vec<Vec<AgentId>>,
    edge_count: usize,
}

impl ContactGraph {
    /// Graph with `node_count` isolated nodes
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edge_count: 0,
        }
    }

    /// Add the edge `a - b`; callers guarantee it is new and not a self loop
    pub(crate) fn add_edge(&mut self, a: AgentId, b: AgentId) {
        debug_assert_ne!(a, b);
        debug_assert!(!self.adjacency[a].contains(&b));
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.edge_count += 1;
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn neighbors(&self, node: AgentId) -> &[AgentId] {
        &self.adjacency[node]
    }

    pub fn degree(&self, node: AgentId) -> usize {
        self.adjacency[node].len()
    }

    #[cfg(test)]
    pub fn has_edge(&self, a: AgentId, b: AgentId) -> bool {
        self.adjacency[a].contains(&b)
    }

    pub fn mean_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        (2 * self.edge_count) as f64 / self.node_count() as f64
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Node ids sorted by degree descending, ties broken by id ascending
    pub fn nodes_by_degree(&self) -> Vec<AgentId> {
        let mut nodes: Vec<AgentId> = (0..self.node_count()).collect();
        nodes.sort_by(|&a, &b| self.degree(b).cmp(&self.degree(a)).then(a.cmp(&b)));
        nodes
    }

    /// Breadth-first check that every node is reachable from node 0
    pub fn is_connected(&self) -> bool {
        if self.adjacency.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.node_count()];
        let mut stack = vec![0];
        seen[0] = true;
        let mut reached = 1;
        while let Some(node) = stack.pop() {
            for &next in &self.adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    reached += 1;
                    stack.push(next);
                }
            }
        }
        reached == self.node_count()
    }
}
