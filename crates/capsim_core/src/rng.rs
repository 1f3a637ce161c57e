//! Random streams and per-agent parameter sampling.
//!
//! Growth rates and division thresholds are drawn from normal distributions
//! at birth. Where the draws come from is selected by [`SeedingStrategy`].

use crate::config::GrowthConfig;
use capsim_data::BacteriumId;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Large odd constant mixing agent ids into derived seeds.
const DERIVATION_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

/// Source of the random draws an agent makes for its own parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedingStrategy {
    /// Every draw comes from the world stream.
    #[default]
    Shared,
    /// Every agent re-seeds its own stream with the same constant, so all
    /// agents constructed this way draw identical parameter sequences.
    FixedPerAgent { seed: u64 },
    /// Each agent gets an independent stream derived from the world seed and its id.
    DerivedPerAgent,
}

impl SeedingStrategy {
    /// Private stream for a newly created agent, or `None` when it uses the world stream.
    #[must_use]
    pub fn agent_rng(&self, world_seed: u64, id: BacteriumId) -> Option<ChaCha8Rng> {
        match *self {
            Self::Shared => None,
            Self::FixedPerAgent { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
            Self::DerivedPerAgent => Some(derive_agent_rng(world_seed, id)),
        }
    }
}

#[must_use]
pub fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream for one agent.
#[must_use]
pub fn derive_agent_rng(base_seed: u64, id: BacteriumId) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(id.0.wrapping_mul(DERIVATION_PRIME)))
}

/// Picks the agent's private stream when it has one, the world stream otherwise.
pub fn stream<'a>(
    own: &'a mut Option<ChaCha8Rng>,
    shared: &'a mut ChaCha8Rng,
) -> &'a mut ChaCha8Rng {
    match own {
        Some(rng) => rng,
        None => shared,
    }
}

/// Draws from `N(mean, stdv)`; a zero deviation returns the mean exactly.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, stdv: f64) -> f64 {
    match Normal::new(mean, stdv) {
        Ok(dist) if stdv > 0.0 => dist.sample(rng),
        _ => mean,
    }
}

/// Elongation rate for a newborn, never negative.
pub fn sample_growth_rate<R: Rng + ?Sized>(rng: &mut R, growth: &GrowthConfig) -> f64 {
    sample_normal(rng, growth.growth_mean, growth.growth_stdv).max(0.0)
}

/// Division threshold for a newborn, floored so that division always leaves viable daughters.
pub fn sample_division_threshold<R: Rng + ?Sized>(
    rng: &mut R,
    growth: &GrowthConfig,
    floor: f64,
) -> f64 {
    sample_normal(rng, growth.length_mean, growth.length_stdv).max(floor)
}
