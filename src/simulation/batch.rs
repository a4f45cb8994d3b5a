//! Multi-seed batches
//!
//! Each seed gets its own engine and its own stream, so runs are independent
//! and can go in parallel without changing any result.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Step;
use crate::simulation::engine::SimulationEngine;

/// One row of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRun {
    pub seed: u64,
    /// `f64::INFINITY` when the infectious period is unbounded
    #[serde(deserialize_with = "crate::simulation::metrics::unbounded_from_null")]
    pub r0: f64,
    pub peak_infected: usize,
    pub peak_pct: f64,
    pub time_to_peak: Step,
    pub attack_rate: f64,
    pub steps_run: Step,
}

/// Count, mean, sample standard deviation and range of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// 0 when there are fewer than two values
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// `None` for an empty column
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// One row per seed, in the order the seeds were given
    pub runs: Vec<SeedRun>,
    pub r0: Option<SummaryStats>,
    pub peak_infected: Option<SummaryStats>,
    pub peak_pct: Option<SummaryStats>,
    pub time_to_peak: Option<SummaryStats>,
    pub attack_rate: Option<SummaryStats>,
}

impl BatchReport {
    pub fn from_runs(runs: Vec<SeedRun>) -> Self {
        let column = |f: fn(&SeedRun) -> f64| {
            let values: Vec<f64> = runs.iter().map(f).collect();
            SummaryStats::from_values(&values)
        };

        // Unbounded R₀ values would swamp the mean
        let finite_r0: Vec<f64> = runs.iter().map(|r| r.r0).filter(|r| r.is_finite()).collect();

        Self {
            r0: SummaryStats::from_values(&finite_r0),
            peak_infected: column(|r| r.peak_infected as f64),
            peak_pct: column(|r| r.peak_pct),
            time_to_peak: column(|r| r.time_to_peak as f64),
            attack_rate: column(|r| r.attack_rate),
            runs,
        }
    }
}

/// `count` seeds starting at `first`, wrapping past `u64::MAX`
pub fn consecutive_seeds(first: u64, count: u64) -> Vec<u64> {
    (0..count).map(|i| first.wrapping_add(i)).collect()
}

/// Run `config` once per seed, overriding its own seed
///
/// The configuration is validated once up front; a bad config fails before any
/// run starts.
pub fn run_seeds(config: &SimulationConfig, seeds: &[u64], max_steps: Step) -> Result<BatchReport> {
    let resolved = config.resolve()?;

    tracing::info!("Running batch of {} seeds", seeds.len());

    let runs = seeds
        .par_iter()
        .map(|&seed| -> Result<SeedRun> {
            let mut cfg = resolved.clone();
            cfg.seed = Some(seed);
            let mut engine = SimulationEngine::from_resolved(cfg)?;
            let r0 = engine.calculate_r0().r0;
            let summary = engine.run(max_steps);
            let peak = engine.peak_metrics();
            Ok(SeedRun {
                seed,
                r0,
                peak_infected: peak.max_infected,
                peak_pct: peak.max_infected_pct,
                time_to_peak: peak.time_to_peak,
                attack_rate: peak.attack_rate,
                steps_run: summary.steps_run,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchReport::from_runs(runs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_stats() {
        let stats = SummaryStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        // sample variance 32 / 7
        assert!((stats.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let stats = SummaryStats::from_values(&[3.5]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert!(SummaryStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_consecutive_seeds_wrap() {
        assert_eq!(consecutive_seeds(5, 3), vec![5, 6, 7]);
        assert_eq!(consecutive_seeds(u64::MAX - 1, 3), vec![u64::MAX - 1, u64::MAX, 0]);
        assert!(consecutive_seeds(9, 0).is_empty());
    }

    #[test]
    fn test_batch_matches_individual_runs() {
        let config = SimulationConfig {
            population: 150,
            ..Default::default()
        };
        let report = run_seeds(&config, &[1, 2, 3], 20).unwrap();
        assert_eq!(report.runs.len(), 3);
        assert_eq!(report.attack_rate.map(|s| s.count), Some(3));

        let mut single = config.clone();
        single.seed = Some(2);
        let mut engine = SimulationEngine::new(&single).unwrap();
        engine.run(20);
        assert_eq!(report.runs[1].seed, 2);
        assert_eq!(report.runs[1].peak_infected, engine.peak_metrics().max_infected);
        assert_eq!(report.runs[1].attack_rate, engine.peak_metrics().attack_rate);
    }

    #[test]
    fn test_unbounded_r0_row_survives_json() {
        let config = SimulationConfig {
            population: 60,
            rates: crate::core::config::BaseRates {
                gamma: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let report = run_seeds(&config, &[8], 3).unwrap();
        assert!(report.r0.is_none());
        let json = serde_json::to_string(&report).unwrap();
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.runs[0].seed, 8);
        assert_eq!(back.runs[0].peak_infected, report.runs[0].peak_infected);
        assert_eq!(back.runs[0].r0, f64::INFINITY);
    }

    #[test]
    fn test_bad_config_fails_before_running() {
        let config = SimulationConfig {
            seeding_strategy: "bogus".to_string(),
            ..Default::default()
        };
        assert!(run_seeds(&config, &[1], 10).unwrap_err().is_config());
    }
}
