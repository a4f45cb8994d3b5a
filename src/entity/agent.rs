//! Per-individual SEIRS state machine
//!
//! An agent's update is split in two. `pending_transition` + `stage` compute a
//! candidate next state from the frozen start-of-step snapshot; `commit`
//! applies it once every agent has staged. Agents never touch each other.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SeirsState};
use crate::entity::archetype::{ArchetypeKind, Traits};
use crate::entity::transition::{compound_exposure, PendingTransition, TransitionContext};

/// A state change applied during commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: SeirsState,
    pub to: SeirsState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub archetype: ArchetypeKind,
    pub traits: Traits,
    pub state: SeirsState,
    /// Set between compute and commit of a single step, `None` otherwise
    #[serde(skip)]
    next_state: Option<SeirsState>,

    /// Times this agent has entered I
    pub infection_count: u32,
    /// Times this agent moved I -> R
    pub recovery_count: u32,
    /// Times this agent moved R -> S
    pub relapse_count: u32,
    /// Steps spent in I over the whole run
    pub time_in_infected: u32,
    /// Length of the current I spell
    pub current_infected_duration: u32,
}

impl Agent {
    /// New susceptible agent carrying its archetype's traits
    pub fn new(id: AgentId, archetype: ArchetypeKind) -> Self {
        Self {
            id,
            archetype,
            traits: archetype.archetype().traits,
            state: SeirsState::Susceptible,
            next_state: None,
            infection_count: 0,
            recovery_count: 0,
            relapse_count: 0,
            time_in_infected: 0,
            current_infected_duration: 0,
        }
    }

    pub fn next_state(&self) -> Option<SeirsState> {
        self.next_state
    }

    pub fn is_infected(&self) -> bool {
        self.state == SeirsState::Infected
    }

    pub fn ever_infected(&self) -> bool {
        self.infection_count > 0
    }

    /// Put the agent into I before the first step
    pub fn seed_infection(&mut self) {
        self.state = SeirsState::Infected;
        self.infection_count += 1;
        self.current_infected_duration = 0;
    }

    /// The transition this agent may take this step, and its probability
    ///
    /// `None` means no draw is needed: a susceptible agent with no infected
    /// neighbors stays susceptible.
    pub fn pending_transition(&self, ctx: &TransitionContext<'_>) -> Option<PendingTransition> {
        let narrative = ctx.narrative;
        let probability = match self.state {
            SeirsState::Susceptible => {
                let k = ctx.infected_neighbors(self.id);
                if k == 0 {
                    return None;
                }
                compound_exposure(self.traits.exposure_probability(narrative), k)
            }
            SeirsState::Exposed => self
                .traits
                .adoption_probability(narrative, ctx.rates.sigma),
            SeirsState::Infected => self
                .traits
                .correction_probability(narrative, ctx.rates.gamma),
            SeirsState::Recovered => self.traits.relapse_probability(narrative, ctx.rates.omega),
        };

        Some(PendingTransition {
            target: self.state.successor(),
            probability,
        })
    }

    /// Resolve a pending transition with one draw and stage the result
    pub fn stage(&mut self, pending: Option<PendingTransition>, rng: &mut ChaCha8Rng) {
        let next = match pending {
            Some(p) if rng.gen::<f64>() < p.probability => p.target,
            _ => self.state,
        };
        self.next_state = Some(next);
    }

    /// Commit phase: apply the staged state and update history counters
    ///
    /// Returns the change when the state actually moved.
    pub fn commit(&mut self) -> Option<StateChange> {
        let next = self.next_state.take()?;
        let from = self.state;
        self.state = next;

        if from != SeirsState::Infected && next == SeirsState::Infected {
            self.infection_count += 1;
            self.current_infected_duration = 0;
        }
        if from == SeirsState::Infected && next == SeirsState::Recovered {
            self.recovery_count += 1;
        }
        if from == SeirsState::Recovered && next == SeirsState::Susceptible {
            self.relapse_count += 1;
        }
        if next == SeirsState::Infected {
            self.time_in_infected += 1;
            self.current_infected_duration += 1;
        }

        (from != next).then_some(StateChange { from, to: next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BaseRates;
    use crate::narrative::{Narrative, NarrativeParams};
    use crate::network::ContactGraph;
    use rand::SeedableRng;

    fn star(leaves: usize) -> ContactGraph {
        let mut g = ContactGraph::with_nodes(leaves + 1);
        for leaf in 1..=leaves {
            g.add_edge(0, leaf);
        }
        g
    }

    fn advance(agent: &mut Agent, ctx: &TransitionContext<'_>, rng: &mut ChaCha8Rng) {
        let pending = agent.pending_transition(ctx);
        agent.stage(pending, rng);
    }

    fn certain_rates() -> BaseRates {
        BaseRates {
            sigma: 1.0,
            gamma: 1.0,
            omega: 1.0,
        }
    }

    #[test]
    fn test_new_agent_takes_archetype_traits() {
        let agent = Agent::new(7, ArchetypeKind::CriticalThinker);
        assert_eq!(agent.id, 7);
        assert_eq!(agent.traits.nfc, 0.90);
        assert_eq!(agent.state, SeirsState::Susceptible);
        assert!(agent.next_state().is_none());
    }

    #[test]
    fn test_no_infected_neighbors_no_draw() {
        let graph = star(2);
        let states = [SeirsState::Susceptible; 3];
        let narrative = Narrative::new(NarrativeParams::default()).unwrap();
        let rates = BaseRates::default();
        let ctx = TransitionContext {
            narrative: &narrative,
            rates: &rates,
            graph: &graph,
            states: &states,
        };
        let agent = Agent::new(0, ArchetypeKind::Superspreader);
        assert!(agent.pending_transition(&ctx).is_none());
    }

    #[test]
    fn test_stage_without_pending_keeps_state_and_skips_rng() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut reference = ChaCha8Rng::seed_from_u64(1);
        let mut agent = Agent::new(0, ArchetypeKind::Moderate);
        agent.stage(None, &mut rng);
        assert_eq!(agent.next_state(), Some(SeirsState::Susceptible));
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_full_cycle_bookkeeping() {
        let graph = star(1);
        let narrative = Narrative::new(NarrativeParams {
            baseline_transmission: 1.0,
            emotional_intensity: 1.0,
            identity_weight: 1.0,
            initial_seeding: 0.1,
        })
        .unwrap();
        let rates = certain_rates();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut agent = Agent::new(0, ArchetypeKind::Superspreader);

        // Neighbor 1 is infected: exposure is certain
        let states = [SeirsState::Susceptible, SeirsState::Infected];
        let ctx = TransitionContext {
            narrative: &narrative,
            rates: &rates,
            graph: &graph,
            states: &states,
        };
        advance(&mut agent, &ctx, &mut rng);
        assert_eq!(
            agent.commit(),
            Some(StateChange {
                from: SeirsState::Susceptible,
                to: SeirsState::Exposed
            })
        );
        assert!(agent.next_state().is_none());

        // E -> I with sigma clipped to 1
        advance(&mut agent, &ctx, &mut rng);
        agent.commit();
        assert_eq!(agent.state, SeirsState::Infected);
        assert_eq!(agent.infection_count, 1);
        assert_eq!(agent.time_in_infected, 1);
        assert_eq!(agent.current_infected_duration, 1);

        // I -> R: gamma stays below 1 for a superspreader, so force it
        agent.stage(
            Some(PendingTransition {
                target: SeirsState::Recovered,
                probability: 1.0,
            }),
            &mut rng,
        );
        agent.commit();
        assert_eq!(agent.state, SeirsState::Recovered);
        assert_eq!(agent.recovery_count, 1);
        assert_eq!(agent.time_in_infected, 1);

        // R -> S with omega capped at 0.2; force the draw
        agent.stage(
            Some(PendingTransition {
                target: SeirsState::Susceptible,
                probability: 1.0,
            }),
            &mut rng,
        );
        agent.commit();
        assert_eq!(agent.state, SeirsState::Susceptible);
        assert_eq!(agent.relapse_count, 1);
    }

    #[test]
    fn test_staying_infected_accumulates_time() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut agent = Agent::new(0, ArchetypeKind::Moderate);
        agent.seed_infection();
        for _ in 0..3 {
            agent.stage(
                Some(PendingTransition {
                    target: SeirsState::Recovered,
                    probability: 0.0,
                }),
                &mut rng,
            );
            assert!(agent.commit().is_none());
        }
        assert_eq!(agent.time_in_infected, 3);
        assert_eq!(agent.current_infected_duration, 3);
        assert_eq!(agent.infection_count, 1);
    }

    #[test]
    fn test_commit_without_stage_is_noop() {
        let mut agent = Agent::new(0, ArchetypeKind::Immune);
        assert!(agent.commit().is_none());
        assert_eq!(agent.state, SeirsState::Susceptible);
    }

    #[test]
    fn test_reinfection_resets_spell() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut agent = Agent::new(0, ArchetypeKind::Moderate);
        agent.seed_infection();
        agent.current_infected_duration = 4;
        agent.state = SeirsState::Exposed;
        agent.stage(
            Some(PendingTransition {
                target: SeirsState::Infected,
                probability: 1.0,
            }),
            &mut rng,
        );
        agent.commit();
        assert_eq!(agent.infection_count, 2);
        assert_eq!(agent.current_infected_duration, 1);
    }
}
