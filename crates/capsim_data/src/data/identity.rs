use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, monotonically assigned identifier of a bacterium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BacteriumId(pub u64);

impl fmt::Display for BacteriumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index into the configured species table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SpeciesId(pub u16);

/// Identity and lineage bookkeeping of a single bacterium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub id: BacteriumId,
    /// Founder of the clone this bacterium descends from.
    pub origin_id: BacteriumId,
    pub parent_id: Option<BacteriumId>,
    pub generation: u32,
}

impl Lineage {
    /// Lineage of a seeded founder cell.
    pub fn founder(id: BacteriumId) -> Self {
        Self {
            id,
            origin_id: id,
            parent_id: None,
            generation: 0,
        }
    }

    /// Lineage of a daughter split off `parent`.
    pub fn child_of(parent: &Lineage, id: BacteriumId) -> Self {
        Self {
            id,
            origin_id: parent.origin_id,
            parent_id: Some(parent.id),
            generation: parent.generation + 1,
        }
    }
}
