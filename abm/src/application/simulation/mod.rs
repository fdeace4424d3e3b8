//! Simulation configuration and the round-loop driver.

mod config;
mod model;

pub use config::{ConfigError, SimulationConfig};
pub use model::{Model, ModelError, RoundReport, SimulationReport};
