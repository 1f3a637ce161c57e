//! Error types for capsim_core.
//!
//! Configuration problems are rejected before a run starts. The runtime
//! variants describe logic defects that stop the run instead of letting
//! degenerate geometry propagate.

use capsim_data::{BacteriumId, SpeciesId};
use thiserror::Error;

/// Setup-time rejection of a parameter set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("division threshold mean {threshold} must exceed twice the radius {radius}")]
    DivisionThresholdTooSmall { threshold: f64, radius: f64 },

    #[error("worst-case division of a {length} um rod leaves a daughter of {daughter} um")]
    NonViableDivision { length: f64, daughter: f64 },

    #[error("{name} x relaxation step = {product} is unstable (must stay below {limit})")]
    UnstableRelaxation {
        name: &'static str,
        product: f64,
        limit: f64,
    },

    #[error("field '{field}' has diffusion number {number}, above the stable limit {limit}")]
    UnstableDiffusion {
        field: String,
        number: f64,
        limit: f64,
    },

    #[error("{name} is inverted: min {min} exceeds max {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },

    #[error("relaxation iteration cap must be at least 1")]
    ZeroIterations,

    #[error("asymmetry coefficient {0} must lie in [0.0, 2.0]")]
    AsymmetryOutOfRange(f64),

    #[error("species {0:?} is referenced but not configured")]
    UnknownSpecies(SpeciesId),

    #[error("chemical field '{0}' is referenced but not registered")]
    UnknownField(String),
}

/// Runtime defects detected by the mechanics core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("bacterium {id} asked to divide at length {length} below its threshold {threshold}")]
    BelowDivisionThreshold {
        id: BacteriumId,
        length: f64,
        threshold: f64,
    },

    #[error("division of bacterium {id} produced non-positive daughter lengths ({l1}, {l2})")]
    NonPositiveDaughter { id: BacteriumId, l1: f64, l2: f64 },

    #[error("bacterium {id} has a non-finite endpoint after relaxation")]
    NonFinitePosition { id: BacteriumId },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for capsim_core operations.
pub type Result<T> = std::result::Result<T, SimError>;
