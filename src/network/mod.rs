//! Contact network
//!
//! An undirected scale-free graph over agent ids, generated once per run and
//! read-only afterwards.

pub mod generation;
pub mod graph;

pub use generation::generate_barabasi_albert;
pub use graph::ContactGraph;
