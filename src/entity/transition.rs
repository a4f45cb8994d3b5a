//! Transition probabilities for the SEIRS cycle
//!
//! Each function is pure in (traits, narrative, base rate). The engine reuses
//! them for the R₀ estimate without stepping the dynamics.

use crate::core::config::BaseRates;
use crate::core::types::{clip, AgentId, SeirsState};
use crate::entity::archetype::Traits;
use crate::narrative::Narrative;
use crate::network::ContactGraph;

/// Hard cap on the relapse probability per step
pub const MAX_RELAPSE_PROBABILITY: f64 = 0.2;

/// Read-only view of the world an agent needs to compute its next state
///
/// `states` is the frozen start-of-step snapshot, indexed by agent id.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub narrative: &'a Narrative,
    pub rates: &'a BaseRates,
    pub graph: &'a ContactGraph,
    pub states: &'a [SeirsState],
}

impl<'a> TransitionContext<'a> {
    /// Neighbors of `id` currently in I
    pub fn infected_neighbors(&self, id: AgentId) -> usize {
        self.graph
            .neighbors(id)
            .iter()
            .filter(|&&n| self.states[n] == SeirsState::Infected)
            .count()
    }
}

/// Outcome of the pure half of the compute phase
///
/// The agent moves to `target` if a uniform draw falls below `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    pub target: SeirsState,
    pub probability: f64,
}

impl Traits {
    /// α: exposure probability per infected contact (S -> E)
    ///
    /// High NFC filters, high CB seeks congruent content, identity alignment
    /// pulls in proportion to the narrative's identity weight. Trust plays no
    /// part in exposure.
    pub fn exposure_probability(&self, narrative: &Narrative) -> f64 {
        let effect = -0.6 * (self.nfc - 0.5)
            + 0.4 * (self.cb - 0.5)
            + 0.3 * (self.ia - 0.5) * narrative.identity_weight();
        let susceptibility = clip(1.0 + effect, 0.1, 2.0);
        clip(narrative.effective_transmission() * susceptibility, 0.0, 1.0)
    }

    /// σ: adoption probability per step (E -> I)
    pub fn adoption_probability(&self, narrative: &Narrative, sigma_base: f64) -> f64 {
        let effect = -0.7 * (self.nfc - 0.5) - 0.5 * (self.trust - 0.5)
            + 0.6 * (self.cb - 0.5)
            + 1.0 * (self.ia - 0.5) * narrative.identity_weight();
        let multiplier = clip(1.0 + effect, 0.1, 3.0);
        clip(sigma_base * multiplier, 0.0, 1.0)
    }

    /// γ: correction probability per step (I -> R)
    pub fn correction_probability(&self, narrative: &Narrative, gamma_base: f64) -> f64 {
        let boost = 1.0 + 0.8 * self.nfc + 0.6 * self.trust;
        let penalty = 1.0 + 0.5 * self.cb + 0.8 * self.ia * narrative.identity_weight();
        clip(gamma_base * boost / penalty, 0.0, 1.0)
    }

    /// ω: relapse probability per step (R -> S), never above 0.2
    pub fn relapse_probability(&self, narrative: &Narrative, omega_base: f64) -> f64 {
        let amplification =
            1.0 + 0.6 * (1.0 - self.trust) + 1.0 * self.ia * narrative.identity_weight();
        let protection = 1.0 + 0.4 * self.nfc;
        clip(
            omega_base * amplification / protection,
            0.0,
            MAX_RELAPSE_PROBABILITY,
        )
    }
}

/// Exposure compounded over `k` independent infected contacts: 1 - (1 - α)^k
pub fn compound_exposure(alpha: f64, infected_contacts: usize) -> f64 {
    let k = i32::try_from(infected_contacts).unwrap_or(i32::MAX);
    1.0 - (1.0 - alpha).powi(k)
}
