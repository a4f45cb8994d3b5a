//! Preferential-attachment network generation

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::AgentId;
use crate::network::graph::ContactGraph;

/// Generate a Barabási-Albert graph on `n` nodes
///
/// Growth starts from a star on `m + 1` nodes (node 0 joined to `1..=m`).
/// Every later node attaches to `m` distinct existing nodes drawn uniformly
/// from a list in which each node appears once per incident edge, so the
/// chance of being picked is proportional to degree. The result is connected
/// and has exactly `m * (n - m)` edges.
pub fn generate_barabasi_albert(n: usize, m: usize, rng: &mut ChaCha8Rng) -> Result<ContactGraph> {
    if m == 0 || m >= n {
        return Err(SimError::InvalidNetwork {
            population: n,
            edges_per_node: m,
        });
    }

    let mut graph = ContactGraph::with_nodes(n);

    // Degree-weighted urn: node i appears degree(i) times
    let mut repeated: Vec<AgentId> = Vec::with_capacity(2 * m * (n - m));
    for leaf in 1..=m {
        graph.add_edge(0, leaf);
        repeated.push(0);
        repeated.push(leaf);
    }

    let mut targets: Vec<AgentId> = Vec::with_capacity(m);
    for source in (m + 1)..n {
        targets.clear();
        while targets.len() < m {
            let candidate = repeated[rng.gen_range(0..repeated.len())];
            if !targets.contains(&candidate) {
                targets.push(candidate);
            }
        }

        for &target in &targets {
            graph.add_edge(source, target);
        }
        repeated.extend_from_slice(&targets);
        repeated.extend(std::iter::repeat(source).take(m));
    }

    tracing::debug!(
        nodes = n,
        edges = graph.edge_count(),
        max_degree = graph.max_degree(),
        "Generated preferential-attachment network"
    );

    Ok(graph)
}
