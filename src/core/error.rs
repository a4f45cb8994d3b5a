use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Narrative parameter {field} must be in [0, 1], got {value}")]
    InvalidNarrativeParameter { field: &'static str, value: f64 },

    #[error("Archetype distribution must sum to 1.0 (got {total:.4})")]
    InvalidDistribution { total: f64 },

    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    #[error("Share for archetype {archetype} must be in [0, 1], got {value}")]
    InvalidShare { archetype: String, value: f64 },

    #[error("Unknown seeding strategy: {0}")]
    UnknownSeedingStrategy(String),

    #[error("Population must be positive, got {0}")]
    InvalidPopulation(usize),

    #[error("Edges per node must satisfy 1 <= m < n (n = {population}, m = {edges_per_node})")]
    InvalidNetwork {
        population: usize,
        edges_per_node: usize,
    },

    #[error("Base rate {field} must be in [0, 1], got {value}")]
    InvalidBaseRate { field: &'static str, value: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl SimError {
    /// True for every failure raised while validating construction inputs
    pub fn is_config(&self) -> bool {
        !matches!(
            self,
            Self::IoError(_) | Self::TomlError(_) | Self::SerdeError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
