//! Time series rows and derived statistics
//!
//! Everything here is computed from agent state and the recorded time series,
//! never from a separate tally, so the numbers always agree with each other.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::config::BaseRates;
use crate::core::types::{SeirsState, Step};
use crate::entity::agent::Agent;
use crate::entity::archetype::ArchetypeKind;
use crate::narrative::Narrative;
use crate::network::ContactGraph;

/// Aggregate counts recorded once per step (plus once after seeding)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub susceptible: usize,
    pub exposed: usize,
    pub infected: usize,
    pub recovered: usize,
    pub cumulative_infected: usize,
    /// Agents currently in I, per archetype (every archetype present, zero or not)
    pub infected_by_archetype: BTreeMap<ArchetypeKind, usize>,
}

impl StepRecord {
    pub fn capture(step: Step, agents: &[Agent], cumulative_infected: usize) -> Self {
        let mut counts = [0usize; 4];
        let mut infected_by_archetype: BTreeMap<ArchetypeKind, usize> =
            ArchetypeKind::ALL.iter().map(|&k| (k, 0)).collect();

        for agent in agents {
            counts[agent.state as usize] += 1;
            if agent.is_infected() {
                *infected_by_archetype.entry(agent.archetype).or_insert(0) += 1;
            }
        }

        Self {
            step,
            susceptible: counts[SeirsState::Susceptible as usize],
            exposed: counts[SeirsState::Exposed as usize],
            infected: counts[SeirsState::Infected as usize],
            recovered: counts[SeirsState::Recovered as usize],
            cumulative_infected,
            infected_by_archetype,
        }
    }

    pub fn count(&self, state: SeirsState) -> usize {
        match state {
            SeirsState::Susceptible => self.susceptible,
            SeirsState::Exposed => self.exposed,
            SeirsState::Infected => self.infected,
            SeirsState::Recovered => self.recovered,
        }
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infected + self.recovered
    }

    /// No one is exposed or infected, so nothing can spread any more
    pub fn is_extinct(&self) -> bool {
        self.exposed == 0 && self.infected == 0
    }
}

/// Peak prevalence summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakMetrics {
    pub max_infected: usize,
    pub max_infected_pct: f64,
    /// Row index of the first peak
    pub time_to_peak: Step,
    /// Final cumulative_infected / population, within [0, 1]
    pub attack_rate: f64,
}

impl PeakMetrics {
    /// Summarise a time series for a closed population of `population` agents
    ///
    /// The attack rate is the final cumulative count over the population,
    /// saturating at 1 if reinfections push the count past the population.
    pub fn from_series(series: &[StepRecord], population: usize) -> Self {
        let denominator = population.max(1) as f64;

        let mut max_infected = 0;
        let mut time_to_peak = 0;
        for record in series {
            if record.infected > max_infected {
                max_infected = record.infected;
                time_to_peak = record.step;
            }
        }

        let cumulative = series.last().map_or(0, |r| r.cumulative_infected);

        Self {
            max_infected,
            max_infected_pct: max_infected as f64 / denominator,
            time_to_peak,
            attack_rate: cumulative.min(population) as f64 / denominator,
        }
    }
}

/// Outcomes for one archetype
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileMetrics {
    pub total_agents: usize,
    pub ever_infected: usize,
    pub attack_rate: f64,
    pub mean_time_in_infected: f64,
    pub total_infections: u64,
    pub total_recoveries: u64,
    /// Recoveries per infection, 0 when there were none
    pub correction_rate: f64,
    pub mean_relapses: f64,
}

/// Per-archetype outcomes, one entry for every archetype in the table
pub fn profile_metrics(agents: &[Agent]) -> BTreeMap<ArchetypeKind, ProfileMetrics> {
    ArchetypeKind::ALL
        .iter()
        .map(|&kind| {
            let members: Vec<&Agent> = agents.iter().filter(|a| a.archetype == kind).collect();
            let total = members.len();
            let ever_infected = members.iter().filter(|a| a.ever_infected()).count();
            let total_time: u64 = members.iter().map(|a| u64::from(a.time_in_infected)).sum();
            let total_infections: u64 = members.iter().map(|a| u64::from(a.infection_count)).sum();
            let total_recoveries: u64 = members.iter().map(|a| u64::from(a.recovery_count)).sum();
            let total_relapses: u64 = members.iter().map(|a| u64::from(a.relapse_count)).sum();

            let per_agent = |value: u64| {
                if total > 0 {
                    value as f64 / total as f64
                } else {
                    0.0
                }
            };

            let metrics = ProfileMetrics {
                total_agents: total,
                ever_infected,
                attack_rate: per_agent(ever_infected as u64),
                mean_time_in_infected: per_agent(total_time),
                total_infections,
                total_recoveries,
                correction_rate: if total_infections > 0 {
                    total_recoveries as f64 / total_infections as f64
                } else {
                    0.0
                },
                mean_relapses: per_agent(total_relapses),
            };
            (kind, metrics)
        })
        .collect()
}

/// Agents currently in I for one archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfectionRate {
    pub infected: usize,
    pub total: usize,
    pub percentage: f64,
}

pub fn current_infection_rates(agents: &[Agent]) -> BTreeMap<ArchetypeKind, InfectionRate> {
    ArchetypeKind::ALL
        .iter()
        .map(|&kind| {
            let total = agents.iter().filter(|a| a.archetype == kind).count();
            let infected = agents
                .iter()
                .filter(|a| a.archetype == kind && a.is_infected())
                .count();
            let percentage = if total > 0 {
                infected as f64 / total as f64
            } else {
                0.0
            };
            (
                kind,
                InfectionRate {
                    infected,
                    total,
                    percentage,
                },
            )
        })
        .collect()
}

/// Read back an unbounded quantity
///
/// JSON has no infinity, so serde_json writes `f64::INFINITY` as `null`.
pub(crate) fn unbounded_from_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

/// Inputs to the mean-field R₀
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct R0Components {
    pub mean_alpha: f64,
    pub mean_sigma: f64,
    pub mean_gamma: f64,
    pub mean_degree: f64,
    /// 1 / mean γ; infinite when mean γ is 0
    #[serde(deserialize_with = "unbounded_from_null")]
    pub infectious_period: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct R0Estimate {
    /// `f64::INFINITY` when the infectious period is unbounded
    #[serde(deserialize_with = "unbounded_from_null")]
    pub r0: f64,
    pub components: R0Components,
}

impl R0Estimate {
    /// Mean-field R₀ = ⟨α⟩ × ⟨σ⟩ × ⟨k⟩ / ⟨γ⟩
    ///
    /// Uses trait-level rates only, so it can be taken before any step. It
    /// ignores clustering, trait-degree correlations and the compounding of
    /// exposure over several infected contacts.
    pub fn estimate(
        agents: &[Agent],
        narrative: &Narrative,
        rates: &BaseRates,
        graph: &ContactGraph,
    ) -> Self {
        let n = agents.len().max(1) as f64;
        let (alpha, sigma, gamma) = agents.iter().fold((0.0, 0.0, 0.0), |(a, s, g), agent| {
            (
                a + agent.traits.exposure_probability(narrative),
                s + agent.traits.adoption_probability(narrative, rates.sigma),
                g + agent.traits.correction_probability(narrative, rates.gamma),
            )
        });

        let mean_alpha = alpha / n;
        let mean_sigma = sigma / n;
        let mean_gamma = gamma / n;
        let mean_degree = graph.mean_degree();

        let (infectious_period, r0) = if mean_gamma > 0.0 {
            let period = 1.0 / mean_gamma;
            (period, mean_alpha * mean_sigma * mean_degree * period)
        } else {
            (f64::INFINITY, f64::INFINITY)
        };

        Self {
            r0,
            components: R0Components {
                mean_alpha,
                mean_sigma,
                mean_gamma,
                mean_degree,
                infectious_period,
            },
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.r0.is_finite()
    }
}

/// Total relapses per entry into I, 0 when nobody was infected
pub fn relapse_rate(agents: &[Agent], cumulative_infected: usize) -> f64 {
    if cumulative_infected == 0 {
        return 0.0;
    }
    let relapses: u64 = agents.iter().map(|a| u64::from(a.relapse_count)).sum();
    relapses as f64 / cumulative_infected as f64
}
