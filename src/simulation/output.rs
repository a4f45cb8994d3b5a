//! Simulation output and serialization

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Step;
use crate::entity::archetype::ArchetypeKind;
use crate::simulation::engine::{RunSummary, SimulationEngine};
use crate::simulation::metrics::{PeakMetrics, ProfileMetrics, R0Estimate, StepRecord};

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub time_series: Vec<StepRecord>,
    pub peak: PeakMetrics,
    pub profiles: BTreeMap<ArchetypeKind, ProfileMetrics>,
    /// Mean-field estimate; its inputs are fixed for the whole run
    pub r0: R0Estimate,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub steps_run: Step,
    pub terminated_early: bool,
    pub population: usize,
    pub edge_count: usize,
    pub cumulative_infected: usize,
    pub relapse_rate: f64,
    pub simulation_time_ms: u64,
}

impl SimulationOutput {
    pub fn new(engine: &SimulationEngine, run: RunSummary, elapsed: Duration) -> Self {
        Self {
            time_series: engine.time_series().to_vec(),
            peak: engine.peak_metrics(),
            profiles: engine.profile_stratified_metrics(),
            r0: engine.calculate_r0(),
            statistics: SimulationStats {
                steps_run: run.steps_run,
                terminated_early: run.terminated_early,
                population: engine.population(),
                edge_count: engine.graph().edge_count(),
                cumulative_infected: engine.cumulative_infected(),
                relapse_rate: engine.relapse_rate(),
                simulation_time_ms: elapsed.as_millis() as u64,
            },
        }
    }

    /// Pretty JSON
    ///
    /// An unbounded R₀ has no JSON number and is written as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Simulated {} steps over {} agents in {}ms{}",
                self.statistics.steps_run,
                self.statistics.population,
                self.statistics.simulation_time_ms,
                if self.statistics.terminated_early {
                    " (narrative died out)"
                } else {
                    ""
                }
            ),
            format!("R0: {}", format_r0(&self.r0)),
            format!(
                "Peak: {} infected ({:.1}%) at step {}",
                self.peak.max_infected,
                self.peak.max_infected_pct * 100.0,
                self.peak.time_to_peak
            ),
            format!(
                "Attack rate: {:.1}%, cumulative infected {}, relapse rate {:.3}",
                self.peak.attack_rate * 100.0,
                self.statistics.cumulative_infected,
                self.statistics.relapse_rate
            ),
        ];

        for (kind, profile) in &self.profiles {
            if profile.total_agents == 0 {
                continue;
            }
            lines.push(format!(
                "  {:<20} n={:<6} attack {:>5.1}%  correction {:.2}  relapses {:.2}",
                kind.name(),
                profile.total_agents,
                profile.attack_rate * 100.0,
                profile.correction_rate,
                profile.mean_relapses
            ));
        }

        lines.join("\n")
    }
}

fn format_r0(estimate: &R0Estimate) -> String {
    if estimate.is_bounded() {
        format!("{:.3}", estimate.r0)
    } else {
        "unbounded (mean correction rate is 0)".to_string()
    }
}

/// Build an engine, run it, and collect the results
pub fn simulate(config: &SimulationConfig, max_steps: Step) -> Result<SimulationOutput> {
    let start = Instant::now();

    let mut engine = SimulationEngine::new(config)?;
    let run = engine.run(max_steps);

    Ok(SimulationOutput::new(&engine, run, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        SimulationConfig {
            population: 120,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_simulate_collects_everything() {
        let output = simulate(&small(), 25).unwrap();
        assert_eq!(
            output.time_series.len() as u64,
            output.statistics.steps_run + 1
        );
        assert_eq!(output.profiles.len(), 5);
        assert_eq!(output.statistics.population, 120);
        assert!(output.r0.is_bounded());
    }

    #[test]
    fn test_json_has_top_level_sections() {
        let output = simulate(&small(), 10).unwrap();
        let json = output.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["time_series", "peak", "profiles", "r0", "statistics"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value.as_object().map(|o| o.len()), Some(5));
        assert!(value["profiles"].get("superspreader").is_some());
    }

    #[test]
    fn test_summary_mentions_peak() {
        let output = simulate(&small(), 10).unwrap();
        let summary = output.summary();
        assert!(summary.contains("Peak:"));
        assert!(summary.contains("moderate"));
    }

    #[test]
    fn test_unbounded_r0_formats() {
        let mut cfg = small();
        cfg.rates.gamma = 0.0;
        let output = simulate(&cfg, 3).unwrap();
        assert!(!output.r0.is_bounded());
        assert!(output.summary().contains("unbounded"));
        assert!(output.to_json().is_ok());
    }

    #[test]
    fn test_unbounded_r0_json_round_trip() {
        let mut cfg = small();
        cfg.rates.gamma = 0.0;
        let output = simulate(&cfg, 3).unwrap();
        let json = output.to_json().unwrap();
        let back: SimulationOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.r0.r0, f64::INFINITY);
        assert_eq!(back.r0.components.infectious_period, f64::INFINITY);
        assert_eq!(back.time_series, output.time_series);
        assert_eq!(back.peak.max_infected, output.peak.max_infected);
    }

    #[test]
    fn test_r0_matches_engine_estimate() {
        let output = simulate(&small(), 15).unwrap();
        let engine = SimulationEngine::new(&small()).unwrap();
        assert_eq!(output.r0, engine.calculate_r0());
    }
}
