pub mod config;
pub mod error;
pub mod types;

pub use config::{BaseRates, SimulationConfig};
pub use error::{Result, SimError};
