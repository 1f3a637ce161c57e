//! capsim: agent-based mechanics of rod-shaped bacteria.
//!
//! The engine lives in `capsim_core`; this crate holds the population
//! ticker ([`model::world::World`]) and the headless runner.

pub mod model;
