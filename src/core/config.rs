//! Simulation configuration
//!
//! `SimulationConfig` holds raw inputs exactly as a caller or a TOML file
//! supplies them. Nothing in it is trusted until `resolve` has turned it into a
//! `ResolvedConfig`, which is the only form the engine accepts.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::entity::archetype::{ArchetypeDistribution, ARCHETYPES};
use crate::narrative::{Narrative, NarrativeParams};
use crate::simulation::seeding::SeedingStrategy;

/// Base per-step transition rates before trait modulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseRates {
    /// Adoption rate σ₀ (E -> I)
    pub sigma: f64,
    /// Correction rate γ₀ (I -> R)
    pub gamma: f64,
    /// Relapse rate ω₀ (R -> S), typically small
    pub omega: f64,
}

impl Default for BaseRates {
    fn default() -> Self {
        Self {
            sigma: 0.30,
            gamma: 0.05,
            omega: 0.02,
        }
    }
}

impl BaseRates {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("sigma", self.sigma),
            ("gamma", self.gamma),
            ("omega", self.omega),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidBaseRate { field, value });
            }
        }
        Ok(())
    }
}

/// Configuration for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Narrative parameters (β₀, Emo, Idw, p₀)
    pub narrative: NarrativeParams,

    /// Archetype name -> population share; must sum to 1.0 ± 0.001
    pub archetype_distribution: BTreeMap<String, f64>,

    /// Number of agents (and graph nodes)
    pub population: usize,

    /// Edges each new node brings during preferential attachment
    pub edges_per_node: usize,

    /// One of `random`, `hub_targeted`, `archetype_proportional`
    pub seeding_strategy: String,

    pub rates: BaseRates,

    /// Fixes the whole trajectory when set
    pub seed: Option<u64>,

    /// Population at which the probability pass runs in parallel
    ///
    /// Below this, thread overhead exceeds the benefit.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            narrative: NarrativeParams::default(),
            archetype_distribution: ARCHETYPES
                .iter()
                .map(|a| (a.kind.name().to_string(), a.default_share))
                .collect(),
            population: 1000,
            edges_per_node: 3,
            seeding_strategy: SeedingStrategy::Random.name().to_string(),
            rates: BaseRates::default(),
            seed: None,
            parallel_threshold: 1000,
        }
    }
}

/// Fully validated configuration
///
/// Only `SimulationConfig::resolve` can build one.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub(crate) narrative: Narrative,
    pub(crate) distribution: ArchetypeDistribution,
    pub(crate) population: usize,
    pub(crate) edges_per_node: usize,
    pub(crate) seeding_strategy: SeedingStrategy,
    pub(crate) rates: BaseRates,
    pub(crate) seed: Option<u64>,
    pub(crate) parallel_threshold: usize,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Run every construction check and produce typed values
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let narrative = Narrative::new(self.narrative)?;
        let distribution = ArchetypeDistribution::from_names(&self.archetype_distribution)?;
        let seeding_strategy: SeedingStrategy = self.seeding_strategy.parse()?;
        self.rates.validate()?;

        if self.population == 0 {
            return Err(SimError::InvalidPopulation(self.population));
        }
        if self.edges_per_node == 0 || self.edges_per_node >= self.population {
            return Err(SimError::InvalidNetwork {
                population: self.population,
                edges_per_node: self.edges_per_node,
            });
        }

        Ok(ResolvedConfig {
            narrative,
            distribution,
            population: self.population,
            edges_per_node: self.edges_per_node,
            seeding_strategy,
            rates: self.rates,
            seed: self.seed,
            parallel_threshold: self.parallel_threshold,
        })
    }

    /// Validate configuration without keeping the resolved form
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }
}
