//! # Capsim Data
//!
//! Plain, serializable records shared between the simulation core, the world
//! ticker and the export collaborators. Nothing in here owns behavior.

pub mod data;

pub use data::boundary::{BoundaryMode, Face};
pub use data::event::{LiveEvent, RemovalCause};
pub use data::identity::{BacteriumId, Lineage, SpeciesId};
pub use data::snapshot::{BacteriumSnapshot, PopulationStats};
