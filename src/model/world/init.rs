use crate::model::history::{HistoryLogger, RunManifest};
use crate::model::seeding::{load_endpoints, Endpoints};
use crate::model::world::World;
use capsim_core::bacterium::{Bacterium, BacteriumParams};
use capsim_core::config::AppConfig;
use capsim_core::lineage_registry::LineageRegistry;
use capsim_core::metrics::Metrics;
use capsim_core::mover::{RelaxationMover, RelaxationReport};
use capsim_core::rng::create_rng;
use capsim_core::systems::growth::resample_parameters;
use capsim_data::{BacteriumId, Lineage, PopulationStats, SpeciesId};
use chrono::Utc;
use glam::DVec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::path::Path;

impl World {
    /// Creates a world that writes its history under `log_dir`.
    pub fn new_at<P: AsRef<Path>>(config: AppConfig, log_dir: P) -> anyhow::Result<Self> {
        let logger = HistoryLogger::new_at(&log_dir)?;
        let mut world = Self::build(config, logger)?;
        world.log_dir = Some(log_dir.as_ref().to_path_buf());
        world.logger.write_manifest(&RunManifest {
            config_fingerprint: world.config.fingerprint(),
            seed: world.seed,
            started_at: Utc::now().to_rfc3339(),
        })?;
        Ok(world)
    }

    /// Creates a world without file output.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Self::build(config, HistoryLogger::new_dummy())
    }

    fn build(config: AppConfig, logger: HistoryLogger) -> anyhow::Result<Self> {
        config.validate()?;
        let seed = config
            .world
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        let mut world = Self {
            tick: 0,
            bacteria: Vec::new(),
            mover: RelaxationMover::new(&config),
            pop_stats: PopulationStats::default(),
            last_report: RelaxationReport::default(),
            lineage_registry: LineageRegistry::new(),
            metrics: Metrics::new(),
            logger,
            log_dir: None,
            seed,
            next_id: 1,
            rng: create_rng(seed),
            config,
        };

        let rods = match world.config.seeding.endpoints_file.clone() {
            Some(path) => load_endpoints(
                path,
                world.config.seeding.pixel_scale,
                0.5 * world.config.world.bound.z,
            )?,
            None => world.random_endpoints(),
        };
        for (x1, x2) in rods {
            let species = world.pick_species();
            world.spawn_bacterium(x1, x2, species);
        }

        tracing::info!(
            seed = seed,
            population = world.bacteria.len(),
            fingerprint = %world.config.fingerprint(),
            "World initialized"
        );
        Ok(world)
    }

    /// Random rods lying in the mid-plane, fully inside the box where it is large enough.
    fn random_endpoints(&mut self) -> Vec<Endpoints> {
        let bound = self.config.world.bound;
        let [min_len, max_len] = self.config.seeding.seed_length_range;
        let radius = self.config.max_radius();
        let z = 0.5 * bound.z;

        (0..self.config.world.initial_population)
            .map(|_| {
                let length = if max_len > min_len {
                    self.rng.gen_range(min_len..max_len)
                } else {
                    min_len
                };
                let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
                let half = DVec3::new(angle.cos(), angle.sin(), 0.0) * (0.5 * length);
                let margin_x = (half.x.abs() + radius).min(0.5 * bound.x);
                let margin_y = (half.y.abs() + radius).min(0.5 * bound.y);
                let center = DVec3::new(
                    margin_x + self.rng.gen::<f64>() * (bound.x - 2.0 * margin_x),
                    margin_y + self.rng.gen::<f64>() * (bound.y - 2.0 * margin_y),
                    z,
                );
                (center - half, center + half)
            })
            .collect()
    }

    /// Draws a species for a founder according to the configured initial fractions.
    fn pick_species(&mut self) -> SpeciesId {
        let weights: Vec<f64> = self
            .config
            .species
            .iter()
            .map(|s| s.initial_fraction.max(0.0))
            .collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) if weights.len() > 1 => {
                SpeciesId(u16::try_from(dist.sample(&mut self.rng)).unwrap_or(0))
            }
            _ => SpeciesId(0),
        }
    }

    /// Adds a founder between `x1` and `x2` and records its birth.
    pub fn spawn_bacterium(&mut self, x1: DVec3, x2: DVec3, species: SpeciesId) -> BacteriumId {
        let id = BacteriumId(self.next_id);
        self.next_id += 1;

        let mut bacterium = Bacterium::new(
            Lineage::founder(id),
            species,
            x1,
            x2,
            BacteriumParams {
                radius: self.config.radius_of(species),
                l_max: self.config.cell.l_max,
                asymmetry: self.config.growth.asymmetry,
                k_growth: 0.0,
                division_threshold: self.config.growth.length_mean,
            },
        );
        bacterium.rng = self.config.seeding.strategy.agent_rng(self.seed, id);
        resample_parameters(
            &mut bacterium,
            &self.config.growth,
            self.config.division_threshold_floor(),
            &mut self.rng,
        );

        self.lineage_registry
            .record_birth(&bacterium.lineage, species, self.tick);
        self.bacteria.push(bacterium);
        id
    }
}
