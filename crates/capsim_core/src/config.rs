//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every physical constant of the capsule model is an
//! explicit field here; nothing is hidden in module-level constants.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls, matching the reference model)
//! 2. `config.toml` file (overrides defaults)
//! 3. Command-line overrides applied by the binary
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! bound = [75.0, 50.0, 1.0]
//! dt = 0.05
//! ticks = 2000
//! initial_population = 2
//! seed = 50
//!
//! [growth]
//! growth_mean = 0.5
//! length_mean = 7.0
//!
//! [mechanics]
//! k_cell = 50.0
//! max_iterations = 100
//! ```

use crate::behavior::{Behavior, ContactRule};
use crate::error::ConfigError;
use crate::field::{FieldConfig, DIFFUSION_STABILITY_LIMIT};
use crate::rng::SeedingStrategy;
use capsim_data::{BoundaryMode, Face, SpeciesId};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// World-level simulation configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    /// Size of the axis-aligned domain (microns), anchored at the origin.
    pub bound: DVec3,
    /// Simulated time per tick.
    pub dt: f64,
    /// Horizon of a run, in ticks.
    pub ticks: u64,
    pub initial_population: usize,
    pub seed: Option<u64>,
    /// Re-seed the world RNG from `seed + tick` at the start of every tick.
    pub deterministic: bool,
    /// Disables growth and division; mechanics and removal still run.
    pub with_growth: bool,
    /// Ticks between per-phase timing/debug summaries.
    pub log_interval: u64,
    /// Ticks between population snapshots handed to the history logger.
    pub export_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bound: DVec3::new(75.0, 50.0, 1.0),
            dt: 0.05,
            ticks: 2000,
            initial_population: 2,
            seed: None,
            deterministic: false,
            with_growth: true,
            log_interval: 100,
            export_interval: 20,
        }
    }
}

/// Per-face boundary behavior, ordered (+x, +y, +z, -x, -y, -z).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BoundaryConfig {
    pub faces: [BoundaryMode; 6],
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        let leaky = BoundaryMode::Leaky { rate: 5.0 };
        Self {
            faces: [
                leaky,
                leaky,
                BoundaryMode::Wall,
                leaky,
                leaky,
                BoundaryMode::Wall,
            ],
        }
    }
}

impl BoundaryConfig {
    #[must_use]
    pub fn mode(&self, face: Face) -> BoundaryMode {
        self.faces[face.index()]
    }

    /// All six faces repel capsules.
    #[must_use]
    pub fn closed_box() -> Self {
        Self {
            faces: [BoundaryMode::Wall; 6],
        }
    }

    /// No face repels; agents leaving the box are removed by the ticker.
    #[must_use]
    pub fn open_box() -> Self {
        Self {
            faces: [BoundaryMode::Open; 6],
        }
    }
}

/// Capsule geometry shared by every species unless overridden.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CellConfig {
    pub radius: f64,
    /// Asymptotic length of logistic growth.
    pub l_max: f64,
    /// Rods shorter than this are removed at the end of the tick.
    pub min_viable_length: f64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            l_max: 8.0,
            min_viable_length: 1.0,
        }
    }
}

/// Growth, elongation and division parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GrowthConfig {
    /// Normal distribution of the elongation rate drawn at birth (1/time).
    pub growth_mean: f64,
    pub growth_stdv: f64,
    /// Normal distribution of the division threshold drawn at birth (microns).
    pub length_mean: f64,
    pub length_stdv: f64,
    /// Initial asymmetry coefficient; 1.0 is symmetric elongation.
    pub asymmetry: f64,
    /// Length beyond which the asymmetry relaxes toward 1.0.
    pub asymmetry_length: f64,
    /// Asymmetry gained per unit simulated time once past `asymmetry_length`.
    pub sym_growth: f64,
    /// Scale of the random split perturbation, relative to the rod length.
    pub division_noise: f64,
    /// Fraction of the rod axis applied as an impulse to the split ends.
    pub push: f64,
    /// Magnitude of the random twist added to the split ends.
    pub twist: f64,
    /// Also redraw the mother's growth rate and threshold after division.
    pub resample_mother_on_division: bool,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            growth_mean: 0.5,
            growth_stdv: 0.02,
            length_mean: 7.0,
            length_stdv: 0.1,
            asymmetry: 0.1,
            asymmetry_length: 3.75,
            sym_growth: 0.05,
            division_noise: 0.1,
            push: 0.05,
            twist: 0.01,
            resample_mother_on_division: false,
        }
    }
}

/// Binary collision measure computed on two clipped bounding rectangles.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMeasure {
    #[default]
    Perimeter,
    Area,
}

/// Relaxation mover and force-law parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MechanicsConfig {
    /// Internal spring constant holding the endpoints at the tracked length.
    pub k_int: f64,
    /// Cell-cell collision stiffness.
    pub k_cell: f64,
    /// Cell-wall collision stiffness.
    pub k_wall: f64,
    /// Side-to-side sticking stiffness.
    pub k_stick: f64,
    /// Gap below which sticking acts.
    pub range_stick: f64,
    /// Cap on the sticking force magnitude.
    pub max_stick_force: f64,
    /// Inflation of the bounding rectangles in the broad-phase test.
    pub collision_range: f64,
    pub overlap_measure: OverlapMeasure,
    pub overlap_threshold: f64,
    /// Displacement per unit force in one sub-iteration.
    pub relaxation_step: f64,
    pub max_iterations: usize,
    /// Sub-iterations stop once no endpoint moves further than this (microns).
    pub displacement_tolerance: f64,
    /// Sub-iterations continue while any pair penetrates deeper than this (microns).
    pub overlap_tolerance: f64,
    /// Per-endpoint displacement bound for one sub-iteration; larger moves are clamped.
    pub max_displacement: f64,
    /// Neighbor grid bucket size; derived from the interaction reach when absent.
    pub grid_cell_size: Option<f64>,
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self {
            k_int: 50.0,
            k_cell: 50.0,
            k_wall: 50.0,
            k_stick: 2.0,
            range_stick: 0.1,
            max_stick_force: 0.1,
            collision_range: 0.0,
            overlap_measure: OverlapMeasure::Perimeter,
            overlap_threshold: 0.0,
            relaxation_step: 0.01,
            max_iterations: 100,
            displacement_tolerance: 1e-3,
            overlap_tolerance: 1e-4,
            max_displacement: 0.5,
            grid_cell_size: None,
        }
    }
}

/// Initial placement and parameter-sampling policy.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SeedingConfig {
    pub strategy: SeedingStrategy,
    /// Uniform range of initial rod lengths for randomly placed cells.
    pub seed_length_range: [f64; 2],
    /// Optional CSV of `x1,y1,x2,y2` rows (pixels) replacing random placement.
    pub endpoints_file: Option<String>,
    /// Pixels per micron for `endpoints_file`.
    pub pixel_scale: f64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            strategy: SeedingStrategy::Shared,
            seed_length_range: [2.0, 4.0],
            endpoints_file: None,
            pixel_scale: 13.89,
        }
    }
}

/// One sub-population sharing a behavior.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpeciesConfig {
    pub name: String,
    #[serde(default)]
    pub behavior: Behavior,
    /// Overrides `cell.radius` for this species.
    #[serde(default)]
    pub radius: Option<f64>,
    /// Share of the initial population seeded as this species.
    #[serde(default = "default_fraction")]
    pub initial_fraction: f64,
}

fn default_fraction() -> f64 {
    1.0
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            name: "wild_type".to_string(),
            behavior: Behavior::Passive,
            radius: None,
            initial_fraction: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub boundary: BoundaryConfig,
    pub cell: CellConfig,
    pub growth: GrowthConfig,
    pub mechanics: MechanicsConfig,
    pub seeding: SeedingConfig,
    pub species: Vec<SpeciesConfig>,
    pub contact_rules: Vec<ContactRule>,
    pub fields: Vec<FieldConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            boundary: BoundaryConfig::default(),
            cell: CellConfig::default(),
            growth: GrowthConfig::default(),
            mechanics: MechanicsConfig::default(),
            seeding: SeedingConfig::default(),
            species: vec![SpeciesConfig::default()],
            contact_rules: Vec::new(),
            fields: Vec::new(),
        }
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

/// Largest `stiffness x step` for which the explicit relaxation update still contracts.
const RELAXATION_STABILITY_LIMIT: f64 = 2.0;

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first violation found. Everything rejected here would
    /// otherwise surface mid-run as NaN or negative-length geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // World validation
        ensure_positive("world.bound.x", self.world.bound.x)?;
        ensure_positive("world.bound.y", self.world.bound.y)?;
        ensure_positive("world.bound.z", self.world.bound.z)?;
        ensure_positive("world.dt", self.world.dt)?;
        ensure_positive("world.export_interval", self.world.export_interval as f64)?;
        ensure_positive("world.log_interval", self.world.log_interval as f64)?;

        for (i, mode) in self.boundary.faces.iter().enumerate() {
            if let BoundaryMode::Leaky { rate } = mode {
                ensure_non_negative(
                    ["leak.+x", "leak.+y", "leak.+z", "leak.-x", "leak.-y", "leak.-z"][i],
                    *rate,
                )?;
            }
        }

        // Cell geometry
        ensure_positive("cell.radius", self.cell.radius)?;
        ensure_positive("cell.l_max", self.cell.l_max)?;
        ensure_non_negative("cell.min_viable_length", self.cell.min_viable_length)?;
        for s in &self.species {
            if let Some(r) = s.radius {
                ensure_positive("species.radius", r)?;
            }
            ensure_non_negative("species.initial_fraction", s.initial_fraction)?;
            if let Some(uptake) = s.behavior.uptake() {
                ensure_non_negative("species.behavior.mu_max", uptake.mu_max)?;
                ensure_non_negative("species.behavior.k_s", uptake.k_s)?;
                ensure_positive("species.behavior.yield_coeff", uptake.yield_coeff)?;
                ensure_non_negative("species.behavior.density", uptake.density)?;
            }
        }

        // Seeding
        let [min_len, max_len] = self.seeding.seed_length_range;
        ensure_positive("seeding.seed_length_range.min", min_len)?;
        ensure_positive("seeding.seed_length_range.max", max_len)?;
        if max_len < min_len {
            return Err(ConfigError::InvertedRange {
                name: "seeding.seed_length_range",
                min: min_len,
                max: max_len,
            });
        }
        ensure_positive("seeding.pixel_scale", self.seeding.pixel_scale)?;

        // Growth and division
        ensure_non_negative("growth.growth_stdv", self.growth.growth_stdv)?;
        ensure_non_negative("growth.length_stdv", self.growth.length_stdv)?;
        ensure_non_negative("growth.sym_growth", self.growth.sym_growth)?;
        ensure_non_negative("growth.push", self.growth.push)?;
        ensure_non_negative("growth.twist", self.growth.twist)?;
        ensure_non_negative("growth.division_noise", self.growth.division_noise)?;
        if !(0.0..=2.0).contains(&self.growth.asymmetry) {
            return Err(ConfigError::AsymmetryOutOfRange(self.growth.asymmetry));
        }
        let r_max = self.max_radius();
        if self.growth.length_mean <= 2.0 * r_max {
            return Err(ConfigError::DivisionThresholdTooSmall {
                threshold: self.growth.length_mean,
                radius: r_max,
            });
        }
        let floor = self.division_threshold_floor();
        let daughter = self.worst_case_daughter_length(floor);
        if daughter <= 0.0 {
            return Err(ConfigError::NonViableDivision {
                length: floor,
                daughter,
            });
        }

        // Mechanics
        let m = &self.mechanics;
        ensure_non_negative("mechanics.k_int", m.k_int)?;
        ensure_non_negative("mechanics.k_cell", m.k_cell)?;
        ensure_non_negative("mechanics.k_wall", m.k_wall)?;
        ensure_non_negative("mechanics.k_stick", m.k_stick)?;
        ensure_non_negative("mechanics.range_stick", m.range_stick)?;
        ensure_non_negative("mechanics.max_stick_force", m.max_stick_force)?;
        ensure_non_negative("mechanics.collision_range", m.collision_range)?;
        ensure_non_negative("mechanics.overlap_threshold", m.overlap_threshold)?;
        ensure_positive("mechanics.relaxation_step", m.relaxation_step)?;
        ensure_non_negative("mechanics.displacement_tolerance", m.displacement_tolerance)?;
        ensure_non_negative("mechanics.overlap_tolerance", m.overlap_tolerance)?;
        ensure_positive("mechanics.max_displacement", m.max_displacement)?;
        if m.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if let Some(cell_size) = m.grid_cell_size {
            ensure_positive("mechanics.grid_cell_size", cell_size)?;
        }
        for (name, k) in [("k_cell", m.k_cell), ("k_wall", m.k_wall)] {
            let product = k * m.relaxation_step;
            if product >= RELAXATION_STABILITY_LIMIT {
                return Err(ConfigError::UnstableRelaxation {
                    name,
                    product,
                    limit: RELAXATION_STABILITY_LIMIT,
                });
            }
        }

        for field in &self.fields {
            let number = field.diffusion_number(self.world.bound, self.world.dt);
            if number >= DIFFUSION_STABILITY_LIMIT {
                return Err(ConfigError::UnstableDiffusion {
                    field: field.name.clone(),
                    number,
                    limit: DIFFUSION_STABILITY_LIMIT,
                });
            }
        }

        // Cross references
        ensure_positive("species.len", self.species.len() as f64)?;
        for s in &self.species {
            for field in s.behavior.field_names() {
                if !self.fields.iter().any(|f| f.name == field) {
                    return Err(ConfigError::UnknownField(field.to_string()));
                }
            }
        }
        for rule in &self.contact_rules {
            for id in [rule.victim, rule.attacker] {
                if usize::from(id.0) >= self.species.len() {
                    return Err(ConfigError::UnknownSpecies(id));
                }
            }
            ensure_non_negative("contact_rules.range", rule.range)?;
        }

        if self.growth.length_mean >= self.cell.l_max {
            tracing::warn!(
                length_mean = self.growth.length_mean,
                l_max = self.cell.l_max,
                "Division threshold at or above L_max; logistic growth will never divide"
            );
        }

        Ok(())
    }

    /// Loads and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of the physics-relevant sections, stamped on exported logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world.bound).as_bytes());
        hasher.update(format!("{:?}", self.boundary).as_bytes());
        hasher.update(format!("{:?}", self.cell).as_bytes());
        hasher.update(format!("{:?}", self.growth).as_bytes());
        hasher.update(format!("{:?}", self.mechanics).as_bytes());
        hasher.update(format!("{:?}", self.species).as_bytes());
        hasher.update(format!("{:?}", self.contact_rules).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Radius of a species, falling back to the shared cell radius.
    #[must_use]
    pub fn radius_of(&self, species: SpeciesId) -> f64 {
        self.species
            .get(usize::from(species.0))
            .and_then(|s| s.radius)
            .unwrap_or(self.cell.radius)
    }

    #[must_use]
    pub fn behavior_of(&self, species: SpeciesId) -> Option<&Behavior> {
        self.species.get(usize::from(species.0)).map(|s| &s.behavior)
    }

    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.species
            .iter()
            .filter_map(|s| s.radius)
            .fold(self.cell.radius, f64::max)
    }

    /// Sampled division thresholds are never drawn below this length.
    #[must_use]
    pub fn division_threshold_floor(&self) -> f64 {
        2.0 * self.max_radius() + self.cell.min_viable_length
    }

    /// Shortest daughter any rod between `floor` and `l_max` can produce under the split noise.
    #[must_use]
    pub fn worst_case_daughter_length(&self, floor: f64) -> f64 {
        // The daughter length is concave in L, so the minimum sits on an end of the range.
        let daughter = |length: f64| {
            let max_pert = 0.5 * self.growth.division_noise * length;
            length * 0.5 * (1.0 - max_pert) - self.max_radius()
        };
        daughter(floor).min(daughter(self.cell.l_max.max(floor)))
    }

    /// Largest distance at which two capsules can still exert a force on each other,
    /// excluding their rod lengths.
    #[must_use]
    pub fn interaction_margin(&self) -> f64 {
        let contact = self
            .contact_rules
            .iter()
            .map(|r| r.range)
            .fold(0.0, f64::max);
        2.0 * self.max_radius()
            + self
                .mechanics
                .range_stick
                .max(self.mechanics.collision_range)
                .max(contact)
    }

    /// Neighbor grid bucket size.
    #[must_use]
    pub fn grid_cell_size(&self) -> f64 {
        self.mechanics
            .grid_cell_size
            .unwrap_or_else(|| self.cell.l_max + self.interaction_margin())
    }
}
