//! Application layer: the market, the bank agents, and the simulation driver.

pub mod agents;
pub mod market;
pub mod simulation;
