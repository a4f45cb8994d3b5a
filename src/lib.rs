//! Narrative Contagion - agent-based SEIRS model of disinformation spread
//! over a scale-free contact network

pub mod core;
pub mod entity;
pub mod narrative;
pub mod network;
pub mod simulation;
