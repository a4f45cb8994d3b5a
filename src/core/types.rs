//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an agent; doubles as its node id in the contact graph
pub type AgentId = usize;

/// Simulation step counter
pub type Step = u64;

/// Compartment an agent occupies in the SEIRS cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeirsState {
    /// Has not engaged with the narrative
    Susceptible,
    /// Has seen the narrative and is considering it
    Exposed,
    /// Believes and actively broadcasts the narrative
    Infected,
    /// Has been corrected
    Recovered,
}

impl SeirsState {
    pub const ALL: [SeirsState; 4] = [
        SeirsState::Susceptible,
        SeirsState::Exposed,
        SeirsState::Infected,
        SeirsState::Recovered,
    ];

    pub fn letter(&self) -> char {
        match self {
            Self::Susceptible => 'S',
            Self::Exposed => 'E',
            Self::Infected => 'I',
            Self::Recovered => 'R',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Susceptible => "Susceptible",
            Self::Exposed => "Exposed",
            Self::Infected => "Infected",
            Self::Recovered => "Recovered",
        }
    }

    /// The only state this one can move to
    pub fn successor(&self) -> SeirsState {
        match self {
            Self::Susceptible => Self::Exposed,
            Self::Exposed => Self::Infected,
            Self::Infected => Self::Recovered,
            Self::Recovered => Self::Susceptible,
        }
    }
}

impl Default for SeirsState {
    fn default() -> Self {
        Self::Susceptible
    }
}

impl fmt::Display for SeirsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Clamp helper shared by every probability formula
#[inline]
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}
