use super::identity::{BacteriumId, SpeciesId};
use super::snapshot::PopulationStats;
use serde::{Deserialize, Serialize};

/// Why the ticker dropped a bacterium from the active population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    OutOfBounds,
    NonViable,
}

/// Events emitted by the world during a tick.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event")]
pub enum LiveEvent {
    Division {
        mother: BacteriumId,
        child: BacteriumId,
        species: SpeciesId,
        mother_length: f64,
        child_length: f64,
        /// Angle between the mother and daughter axes right after the split.
        angle: f64,
        tick: u64,
        timestamp: String,
    },
    Removal {
        id: BacteriumId,
        cause: RemovalCause,
        lifetime: u64,
        tick: u64,
        timestamp: String,
    },
    Contact {
        victim: BacteriumId,
        attacker: BacteriumId,
        tick: u64,
        timestamp: String,
    },
    ConvergenceFailure {
        iterations: usize,
        residual_force: f64,
        tick: u64,
        timestamp: String,
    },
    Snapshot {
        tick: u64,
        stats: PopulationStats,
        timestamp: String,
    },
}

impl LiveEvent {
    #[must_use]
    pub fn tick(&self) -> u64 {
        match self {
            LiveEvent::Division { tick, .. }
            | LiveEvent::Removal { tick, .. }
            | LiveEvent::Contact { tick, .. }
            | LiveEvent::ConvergenceFailure { tick, .. }
            | LiveEvent::Snapshot { tick, .. } => *tick,
        }
    }
}
