pub mod macros;

use capsim_data::{BacteriumId, Lineage, SpeciesId};
use capsim_lib::model::bacterium::{Bacterium, BacteriumParams};
use capsim_lib::model::config::AppConfig;
use capsim_lib::model::environment::Environment;
use capsim_lib::model::world::World;
use glam::DVec3;

/// A rod to place in a test world or to build on its own.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct BacteriumBuilder {
    id: u64,
    species: u16,
    x1: DVec3,
    x2: DVec3,
    radius: f64,
    l_max: f64,
    asymmetry: f64,
    length: Option<f64>,
    k_growth: Option<f64>,
    threshold: Option<f64>,
}

#[allow(dead_code)]
impl BacteriumBuilder {
    pub fn new(x1: DVec3, x2: DVec3) -> Self {
        Self {
            id: 1,
            species: 0,
            x1,
            x2,
            radius: 0.5,
            l_max: 8.0,
            asymmetry: 1.0,
            length: None,
            k_growth: None,
            threshold: None,
        }
    }

    /// Rod along x starting at `(x, y, 0.5)`.
    pub fn horizontal(x: f64, y: f64, length: f64) -> Self {
        Self::new(DVec3::new(x, y, 0.5), DVec3::new(x + length, y, 0.5))
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_species(mut self, species: u16) -> Self {
        self.species = species;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_growth_rate(mut self, k_growth: f64) -> Self {
        self.k_growth = Some(k_growth);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_asymmetry(mut self, asymmetry: f64) -> Self {
        self.asymmetry = asymmetry;
        self
    }

    /// Standalone bacterium, outside any world.
    pub fn build(&self) -> Bacterium {
        let mut b = Bacterium::new(
            Lineage::founder(BacteriumId(self.id)),
            SpeciesId(self.species),
            self.x1,
            self.x2,
            BacteriumParams {
                radius: self.radius,
                l_max: self.l_max,
                asymmetry: self.asymmetry,
                k_growth: self.k_growth.unwrap_or(0.5),
                division_threshold: self.threshold.unwrap_or(7.0),
            },
        );
        self.apply_overrides(&mut b);
        b
    }

    fn apply_overrides(&self, b: &mut Bacterium) {
        if let Some(length) = self.length {
            b.length = length;
        }
        if let Some(k) = self.k_growth {
            b.k_growth = k;
        }
        if let Some(threshold) = self.threshold {
            b.division_threshold = threshold;
        }
    }
}

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    rods: Vec<BacteriumBuilder>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.initial_population = 0;
        config.world.seed = Some(42);
        Self {
            config,
            rods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_rod(mut self, rod: BacteriumBuilder) -> Self {
        self.rods.push(rod);
        self
    }

    /// Growth off, so only mechanics move the rods.
    pub fn without_growth(mut self) -> Self {
        self.config.world.with_growth = false;
        self
    }

    /// Spawns the rods through the world, then applies their explicit overrides.
    pub fn build(self) -> (World, Environment) {
        let env = Environment::from_config(&self.config);
        let mut world = World::new(self.config).expect("Failed to create world");
        for rod in &self.rods {
            world.spawn_bacterium(rod.x1, rod.x2, SpeciesId(rod.species));
            if let Some(b) = world.bacteria.last_mut() {
                rod.apply_overrides(b);
            }
        }
        (world, env)
    }
}

/// Distance between the midpoints of two rods.
#[allow(dead_code)]
pub fn midpoint_distance(a: &Bacterium, b: &Bacterium) -> f64 {
    a.position().distance(b.position())
}
