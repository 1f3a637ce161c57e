use serde::{Deserialize, Serialize};

/// One face of the axis-aligned simulation box.
///
/// The ordering (+x, +y, +z, -x, -y, -z) matches the per-face arrays used in
/// configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    PosY,
    PosZ,
    NegX,
    NegY,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::PosY,
        Face::PosZ,
        Face::NegX,
        Face::NegY,
        Face::NegZ,
    ];

    /// Axis index (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn axis(self) -> usize {
        match self {
            Face::PosX | Face::NegX => 0,
            Face::PosY | Face::NegY => 1,
            Face::PosZ | Face::NegZ => 2,
        }
    }

    /// `true` for the face lying at `bound[axis]`, `false` for the one at zero.
    #[must_use]
    pub fn is_upper(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Face::PosX => 0,
            Face::PosY => 1,
            Face::PosZ => 2,
            Face::NegX => 3,
            Face::NegY => 4,
            Face::NegZ => 5,
        }
    }
}

/// How a face of the domain treats agents and chemicals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Solid face that pushes capsules back into the domain.
    Wall,
    /// Agents pass through; chemicals drain at `rate` per unit time.
    Leaky { rate: f64 },
    /// Agents pass through, chemicals are retained.
    #[default]
    Open,
}

impl BoundaryMode {
    #[must_use]
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryMode::Wall)
    }

    #[must_use]
    pub fn leak_rate(&self) -> f64 {
        match self {
            BoundaryMode::Leaky { rate } => *rate,
            _ => 0.0,
        }
    }
}
