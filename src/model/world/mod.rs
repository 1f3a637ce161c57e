use crate::model::history::HistoryLogger;
use capsim_core::bacterium::Bacterium;
use capsim_core::config::AppConfig;
use capsim_core::lineage_registry::LineageRegistry;
use capsim_core::lineage_tree::DivisionTree;
use capsim_core::metrics::Metrics;
use capsim_core::mover::{RelaxationMover, RelaxationReport};
use capsim_data::{BacteriumId, BacteriumSnapshot, PopulationStats, SpeciesId};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

pub mod finalize;
pub mod init;
pub mod update;

/// The population ticker.
///
/// Owns the active population, the neighbor grid and every random stream.
/// The environment is passed to [`World::update`] by the caller, which keeps
/// field state outside the agent list.
#[derive(Debug)]
pub struct World {
    pub tick: u64,
    pub bacteria: Vec<Bacterium>,
    pub mover: RelaxationMover,
    pub pop_stats: PopulationStats,
    pub last_report: RelaxationReport,
    pub lineage_registry: LineageRegistry,
    pub metrics: Metrics,
    pub logger: HistoryLogger,
    pub config: AppConfig,
    pub log_dir: Option<PathBuf>,
    /// Seed of the world stream, also the base of derived agent streams.
    pub seed: u64,
    pub next_id: u64,
    pub rng: ChaCha8Rng,
}

impl World {
    /// Read-only view of every active bacterium.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BacteriumSnapshot> {
        self.bacteria.iter().map(Bacterium::snapshot).collect()
    }

    /// Active bacteria of one species.
    pub fn population_of(&self, species: SpeciesId) -> impl Iterator<Item = &Bacterium> + '_ {
        self.bacteria.iter().filter(move |b| b.species == species)
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.bacteria.len()
    }

    #[must_use]
    pub fn get(&self, id: BacteriumId) -> Option<&Bacterium> {
        self.bacteria.iter().find(|b| b.id() == id)
    }

    /// Simulated time elapsed.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.config.world.dt
    }

    #[must_use]
    pub fn division_tree(&self) -> DivisionTree {
        DivisionTree::build(&self.lineage_registry)
    }
}
