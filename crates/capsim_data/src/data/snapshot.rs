use super::identity::{BacteriumId, SpeciesId};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only view of one bacterium handed to export collaborators.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BacteriumSnapshot {
    pub id: BacteriumId,
    pub species: SpeciesId,
    pub origin_id: BacteriumId,
    pub parent_id: Option<BacteriumId>,
    pub x1: DVec3,
    pub x2: DVec3,
    pub position: DVec3,
    /// Unit vector from `x1` to `x2`.
    pub direction: DVec3,
    pub length: f64,
    pub k_growth: f64,
    /// Instantaneous elongation rate, `k_growth * L * (1 - L / L_max)`.
    pub elongation_rate: f64,
    pub lifetime: u64,
}

/// Aggregate population numbers updated once per tick.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PopulationStats {
    pub population: usize,
    pub species_counts: HashMap<u16, usize>,
    pub mean_length: f64,
    pub max_generation: u32,
    pub divisions_total: u64,
    pub removals_total: u64,
    pub last_relaxation_iterations: usize,
    pub last_residual_force: f64,
}
