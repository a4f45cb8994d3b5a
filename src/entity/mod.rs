pub mod agent;
pub mod archetype;
pub mod transition;

pub use agent::{Agent, StateChange};
pub use archetype::{Archetype, ArchetypeDistribution, ArchetypeKind, Traits, ARCHETYPES};
pub use transition::{PendingTransition, TransitionContext};
