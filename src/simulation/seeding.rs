//! Initial infection seeding

use std::fmt;
use std::str::FromStr;

use rand::seq::{index, SliceRandom};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::AgentId;
use crate::entity::agent::Agent;
use crate::entity::archetype::ARCHETYPES;
use crate::network::ContactGraph;

/// Policy for choosing who starts in I
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingStrategy {
    /// Uniform sample over the whole population
    Random,
    /// Highest-degree nodes first, ties by ascending id
    HubTargeted,
    /// Split across archetypes by each archetype's default share
    ArchetypeProportional,
}

impl SeedingStrategy {
    pub const ALL: [SeedingStrategy; 3] = [
        SeedingStrategy::Random,
        SeedingStrategy::HubTargeted,
        SeedingStrategy::ArchetypeProportional,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::HubTargeted => "hub_targeted",
            Self::ArchetypeProportional => "archetype_proportional",
        }
    }
}

impl fmt::Display for SeedingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeedingStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| SimError::UnknownSeedingStrategy(s.to_string()))
    }
}

/// n_seed = max(1, round(population × p₀)), never more than the population
pub fn seed_count(population: usize, initial_seeding: f64) -> usize {
    let raw = (population as f64 * initial_seeding).round() as usize;
    raw.max(1).min(population)
}

/// Pick the initial infected agents
///
/// `random` and `archetype_proportional` draw from `rng`; `hub_targeted` does
/// not touch it. `archetype_proportional` sizes each archetype's quota from
/// the archetype table's default share, not from the run's distribution, and
/// floors it, so it can return fewer than `n_seed` ids.
pub fn select_seeds(
    strategy: SeedingStrategy,
    agents: &[Agent],
    graph: &ContactGraph,
    n_seed: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<AgentId> {
    let n_seed = n_seed.min(agents.len());

    match strategy {
        SeedingStrategy::Random => index::sample(rng, agents.len(), n_seed)
            .into_iter()
            .map(|i| agents[i].id)
            .collect(),

        SeedingStrategy::HubTargeted => graph.nodes_by_degree().into_iter().take(n_seed).collect(),

        SeedingStrategy::ArchetypeProportional => {
            let mut seeds = Vec::new();
            for archetype in &ARCHETYPES {
                let pool: Vec<AgentId> = agents
                    .iter()
                    .filter(|a| a.archetype == archetype.kind)
                    .map(|a| a.id)
                    .collect();
                let quota = (n_seed as f64 * archetype.default_share).floor() as usize;
                if quota > 0 && !pool.is_empty() {
                    seeds.extend(pool.choose_multiple(rng, quota.min(pool.len())).copied());
                }
            }
            seeds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::archetype::ArchetypeKind;
    use crate::network::generate_barabasi_albert;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn population(kinds: &[(ArchetypeKind, usize)]) -> Vec<Agent> {
        let mut agents = Vec::new();
        for &(kind, count) in kinds {
            for _ in 0..count {
                agents.push(Agent::new(agents.len(), kind));
            }
        }
        agents
    }

    #[test]
    fn test_parse_known_strategies() {
        for strategy in SeedingStrategy::ALL {
            assert_eq!(strategy.name().parse::<SeedingStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_unknown_strategy_is_config_error() {
        let err = "bogus".parse::<SeedingStrategy>().unwrap_err();
        assert!(err.is_config());
        assert!(matches!(err, SimError::UnknownSeedingStrategy(ref s) if s == "bogus"));
    }

    #[test]
    fn test_seed_count_rounds_and_floors_at_one() {
        assert_eq!(seed_count(100, 0.06), 6);
        assert_eq!(seed_count(100, 0.066), 7);
        assert_eq!(seed_count(100, 0.0), 1);
        assert_eq!(seed_count(10, 0.01), 1);
        assert_eq!(seed_count(10, 1.0), 10);
    }

    #[test]
    fn test_random_seeds_are_distinct() {
        let agents = population(&[(ArchetypeKind::Moderate, 50)]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let graph = generate_barabasi_albert(50, 2, &mut rng).unwrap();
        let seeds = select_seeds(SeedingStrategy::Random, &agents, &graph, 20, &mut rng);
        let unique: BTreeSet<_> = seeds.iter().collect();
        assert_eq!(seeds.len(), 20);
        assert_eq!(unique.len(), 20);
        assert!(seeds.iter().all(|&id| id < 50));
    }

    #[test]
    fn test_hub_targeted_picks_highest_degree() {
        let agents = population(&[(ArchetypeKind::Moderate, 5)]);
        let mut graph = ContactGraph::with_nodes(5);
        // node 3 is the hub, nodes 1 and 4 tie at degree 2
        graph.add_edge(3, 0);
        graph.add_edge(3, 1);
        graph.add_edge(3, 2);
        graph.add_edge(3, 4);
        graph.add_edge(1, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let seeds = select_seeds(SeedingStrategy::HubTargeted, &agents, &graph, 3, &mut rng);
        assert_eq!(seeds, vec![3, 1, 4]);
    }

    #[test]
    fn test_archetype_proportional_uses_default_shares() {
        let agents = population(&[
            (ArchetypeKind::Immune, 20),
            (ArchetypeKind::Superspreader, 15),
            (ArchetypeKind::Moderate, 50),
            (ArchetypeKind::CriticalThinker, 10),
            (ArchetypeKind::CynicalContrarian, 5),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let graph = generate_barabasi_albert(100, 3, &mut rng).unwrap();
        let seeds = select_seeds(
            SeedingStrategy::ArchetypeProportional,
            &agents,
            &graph,
            20,
            &mut rng,
        );
        // floor(20 × share): 4 + 3 + 10 + 2 + 1
        assert_eq!(seeds.len(), 20);
        let spreaders = seeds
            .iter()
            .filter(|&&id| agents[id].archetype == ArchetypeKind::Superspreader)
            .count();
        assert_eq!(spreaders, 3);
    }

    #[test]
    fn test_archetype_proportional_caps_at_pool() {
        // Moderate quota is floor(10 × 0.5) = 5 but only 2 exist; immune gets 2
        let agents = population(&[(ArchetypeKind::Immune, 18), (ArchetypeKind::Moderate, 2)]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let graph = generate_barabasi_albert(20, 2, &mut rng).unwrap();
        let seeds = select_seeds(
            SeedingStrategy::ArchetypeProportional,
            &agents,
            &graph,
            10,
            &mut rng,
        );
        assert_eq!(seeds.len(), 4);
        assert!(seeds.contains(&18));
        assert!(seeds.contains(&19));
    }

    #[test]
    fn test_archetype_proportional_can_seed_nobody() {
        let agents = population(&[(ArchetypeKind::Moderate, 10)]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let graph = generate_barabasi_albert(10, 2, &mut rng).unwrap();
        let seeds = select_seeds(
            SeedingStrategy::ArchetypeProportional,
            &agents,
            &graph,
            1,
            &mut rng,
        );
        assert!(seeds.is_empty());
    }
}
