use crate::config::{AppConfig, BoundaryConfig};
use crate::field::FieldRegistry;
use capsim_data::{BoundaryMode, Face};
use glam::DVec3;

/// The simulation box, its face modes, and the chemical fields inside it.
#[derive(Debug)]
pub struct Environment {
    pub bound: DVec3,
    pub boundary: BoundaryConfig,
    pub fields: FieldRegistry,
}

impl Environment {
    #[must_use]
    pub fn new(bound: DVec3, boundary: BoundaryConfig) -> Self {
        Self {
            bound,
            boundary,
            fields: FieldRegistry::default(),
        }
    }

    /// Builds the box and every configured field.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let mut env = Self::new(config.world.bound, config.boundary.clone());
        for field in &config.fields {
            env.fields
                .insert(field.name.clone(), field.build(env.bound, &env.boundary));
        }
        env
    }

    #[must_use]
    pub fn mode(&self, face: Face) -> BoundaryMode {
        self.boundary.mode(face)
    }

    /// Whether `p` lies in the closed box `[0, bound]`.
    #[must_use]
    pub fn contains(&self, p: DVec3) -> bool {
        p.is_finite() && p.cmpge(DVec3::ZERO).all() && p.cmple(self.bound).all()
    }

    /// Coordinate of `face` along its axis.
    #[must_use]
    pub fn face_coordinate(&self, face: Face) -> f64 {
        if face.is_upper() {
            self.bound[face.axis()]
        } else {
            0.0
        }
    }

    pub fn update_fields(&mut self, dt: f64) {
        self.fields.update_all(dt);
    }
}
