//! Simulation engine
//!
//! Owns the contact graph, the agents, the narrative and the clock. Each step
//! is a compute pass over a frozen snapshot followed by a commit pass, so the
//! order agents are visited in never changes the outcome.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::config::{BaseRates, ResolvedConfig, SimulationConfig};
use crate::core::error::Result;
use crate::core::types::{SeirsState, Step};
use crate::entity::agent::Agent;
use crate::entity::archetype::{ArchetypeDistribution, ArchetypeKind};
use crate::entity::transition::{PendingTransition, TransitionContext};
use crate::narrative::Narrative;
use crate::network::{generate_barabasi_albert, ContactGraph};
use crate::simulation::metrics::{
    self, InfectionRate, PeakMetrics, ProfileMetrics, R0Estimate, StepRecord,
};
use crate::simulation::seeding::{seed_count, select_seeds, SeedingStrategy};

/// How a call to `run` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps_run: Step,
    /// True when E and I both reached zero before `max_steps`
    pub terminated_early: bool,
}

pub struct SimulationEngine {
    narrative: Narrative,
    rates: BaseRates,
    distribution: ArchetypeDistribution,
    seeding_strategy: SeedingStrategy,
    graph: ContactGraph,
    agents: Vec<Agent>,
    rng: ChaCha8Rng,
    current_step: Step,
    cumulative_infected: usize,
    history: Vec<StepRecord>,
    parallel_threshold: usize,
}

impl SimulationEngine {
    /// Validate `config` and build a seeded population
    ///
    /// Every check runs before the random stream exists. The stream is then
    /// consumed in a fixed order: graph, seed selection, per-step draws.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        Self::from_resolved(resolved)
    }

    pub(crate) fn from_resolved(config: ResolvedConfig) -> Result<Self> {
        config.rates.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let graph = generate_barabasi_albert(config.population, config.edges_per_node, &mut rng)?;

        let mut agents = Vec::with_capacity(config.population);
        for (kind, count) in config.distribution.allocate_counts(config.population) {
            for _ in 0..count {
                agents.push(Agent::new(agents.len(), kind));
            }
        }

        let n_seed = seed_count(config.population, config.narrative.initial_seeding());
        let seeds = select_seeds(config.seeding_strategy, &agents, &graph, n_seed, &mut rng);
        for &id in &seeds {
            agents[id].seed_infection();
        }

        tracing::debug!(
            "Seeded {} of {} requested agents with {} strategy",
            seeds.len(),
            n_seed,
            config.seeding_strategy
        );

        let cumulative_infected = seeds.len();
        let history = vec![StepRecord::capture(0, &agents, cumulative_infected)];

        tracing::info!(
            "Built engine: {} agents, {} edges, seed {:?}",
            agents.len(),
            graph.edge_count(),
            config.seed
        );

        Ok(Self {
            narrative: config.narrative,
            rates: config.rates,
            distribution: config.distribution,
            seeding_strategy: config.seeding_strategy,
            graph,
            agents,
            rng,
            current_step: 0,
            cumulative_infected,
            history,
            parallel_threshold: config.parallel_threshold,
        })
    }

    /// Advance one step and return the row it recorded
    pub fn step(&mut self) -> &StepRecord {
        // Compute phase. Every agent reads the same snapshot.
        let states: Vec<SeirsState> = self.agents.iter().map(|a| a.state).collect();
        let ctx = TransitionContext {
            narrative: &self.narrative,
            rates: &self.rates,
            graph: &self.graph,
            states: &states,
        };

        let pending: Vec<Option<PendingTransition>> =
            if self.agents.len() >= self.parallel_threshold {
                self.agents
                    .par_iter()
                    .map(|agent| agent.pending_transition(&ctx))
                    .collect()
            } else {
                self.agents
                    .iter()
                    .map(|agent| agent.pending_transition(&ctx))
                    .collect()
            };

        // Draws happen in id order on the one stream
        for (agent, pending) in self.agents.iter_mut().zip(pending) {
            agent.stage(pending, &mut self.rng);
        }

        // Commit phase
        for agent in &mut self.agents {
            if let Some(change) = agent.commit() {
                if change.to == SeirsState::Infected {
                    self.cumulative_infected += 1;
                }
            }
        }

        self.current_step += 1;
        let record = StepRecord::capture(self.current_step, &self.agents, self.cumulative_infected);
        tracing::trace!(
            "Step {}: S={} E={} I={} R={}",
            record.step,
            record.susceptible,
            record.exposed,
            record.infected,
            record.recovered
        );
        self.history.push(record);

        &self.history[self.history.len() - 1]
    }

    /// Step up to `max_steps` times, stopping once E and I are both empty
    pub fn run(&mut self, max_steps: Step) -> RunSummary {
        let mut steps_run = 0;
        let mut terminated_early = false;

        while steps_run < max_steps {
            let extinct = self.step().is_extinct();
            steps_run += 1;
            if extinct {
                terminated_early = steps_run < max_steps;
                tracing::debug!("No exposed or infected agents left at step {}", self.current_step);
                break;
            }
        }

        tracing::info!(
            "Ran {} steps, cumulative infected {}",
            steps_run,
            self.cumulative_infected
        );

        RunSummary {
            steps_run,
            terminated_early,
        }
    }

    /// Mean-field R₀ from the current population, without stepping
    pub fn calculate_r0(&self) -> R0Estimate {
        R0Estimate::estimate(&self.agents, &self.narrative, &self.rates, &self.graph)
    }

    pub fn peak_metrics(&self) -> PeakMetrics {
        PeakMetrics::from_series(&self.history, self.agents.len())
    }

    pub fn profile_stratified_metrics(&self) -> BTreeMap<ArchetypeKind, ProfileMetrics> {
        metrics::profile_metrics(&self.agents)
    }

    pub fn current_infection_rates(&self) -> BTreeMap<ArchetypeKind, InfectionRate> {
        metrics::current_infection_rates(&self.agents)
    }

    pub fn relapse_rate(&self) -> f64 {
        metrics::relapse_rate(&self.agents, self.cumulative_infected)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    pub fn narrative(&self) -> &Narrative {
        &self.narrative
    }

    pub fn rates(&self) -> &BaseRates {
        &self.rates
    }

    pub fn distribution(&self) -> &ArchetypeDistribution {
        &self.distribution
    }

    pub fn seeding_strategy(&self) -> SeedingStrategy {
        self.seeding_strategy
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn cumulative_infected(&self) -> usize {
        self.cumulative_infected
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    /// Initial row followed by one row per executed step
    pub fn time_series(&self) -> &[StepRecord] {
        &self.history
    }
}
