//! Simulation loop: seeding, stepping, metrics and batch runs

pub mod batch;
pub mod engine;
pub mod metrics;
pub mod output;
pub mod seeding;

pub use batch::{consecutive_seeds, run_seeds, BatchReport, SeedRun, SummaryStats};
pub use engine::{RunSummary, SimulationEngine};
pub use metrics::{InfectionRate, PeakMetrics, ProfileMetrics, R0Components, R0Estimate, StepRecord};
pub use output::{simulate, SimulationOutput, SimulationStats};
pub use seeding::SeedingStrategy;
