//! Chemical fields that behaviors read and write.

use crate::config::BoundaryConfig;
use capsim_data::Face;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Largest explicit-diffusion number `D dt / h^2` that stays stable on a 3-D lattice.
pub const DIFFUSION_STABILITY_LIMIT: f64 = 1.0 / 6.0;

/// A scalar concentration defined over the simulation box.
pub trait ChemicalField: Send + Sync + std::fmt::Debug {
    fn concentration_at(&self, p: DVec3) -> f64;
    /// Adds (or, when negative, removes) an absolute quantity near `p`.
    fn add_quantity(&mut self, p: DVec3, amount: f64);
    /// Advances diffusion, decay and boundary exchange by `dt`.
    fn update(&mut self, dt: f64);
    fn total_quantity(&self) -> f64;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Spatially constant concentration.
    Uniform { concentration: f64 },
    /// Box-discretized field with explicit diffusion.
    Grid {
        boxes: [usize; 3],
        diffusivity: f64,
        #[serde(default)]
        decay: f64,
        #[serde(default)]
        initial_concentration: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldConfig {
    /// Diffusion number of a grid field under `dt`; zero for uniform fields.
    #[must_use]
    pub fn diffusion_number(&self, bound: DVec3, dt: f64) -> f64 {
        match &self.kind {
            FieldKind::Uniform { .. } => 0.0,
            FieldKind::Grid {
                boxes, diffusivity, ..
            } => {
                let h = (bound / DVec3::new(boxes[0] as f64, boxes[1] as f64, boxes[2] as f64))
                    .min_element();
                diffusivity * dt / (h * h)
            }
        }
    }

    #[must_use]
    pub fn build(&self, bound: DVec3, boundary: &BoundaryConfig) -> Box<dyn ChemicalField> {
        match &self.kind {
            FieldKind::Uniform { concentration } => Box::new(UniformField::new(*concentration, bound)),
            FieldKind::Grid {
                boxes,
                diffusivity,
                decay,
                initial_concentration,
            } => Box::new(GridField::new(
                bound,
                *boxes,
                *diffusivity,
                *decay,
                *initial_concentration,
                boundary.clone(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UniformField {
    pub concentration: f64,
    volume: f64,
}

impl UniformField {
    #[must_use]
    pub fn new(concentration: f64, bound: DVec3) -> Self {
        Self {
            concentration,
            volume: bound.x * bound.y * bound.z,
        }
    }
}

impl ChemicalField for UniformField {
    fn concentration_at(&self, _p: DVec3) -> f64 {
        self.concentration
    }

    fn add_quantity(&mut self, _p: DVec3, amount: f64) {
        self.concentration = (self.concentration + amount / self.volume).max(0.0);
    }

    fn update(&mut self, _dt: f64) {}

    fn total_quantity(&self) -> f64 {
        self.concentration * self.volume
    }
}

/// Quantities stored per box; concentration is quantity over box volume.
#[derive(Debug, Clone)]
pub struct GridField {
    pub boxes: [usize; 3],
    pub box_size: DVec3,
    pub diffusivity: f64,
    pub decay: f64,
    pub quantity: Vec<f64>,
    back_buffer: Vec<f64>,
    boundary: BoundaryConfig,
}

impl GridField {
    #[must_use]
    pub fn new(
        bound: DVec3,
        boxes: [usize; 3],
        diffusivity: f64,
        decay: f64,
        initial_concentration: f64,
        boundary: BoundaryConfig,
    ) -> Self {
        let boxes = boxes.map(|b| b.max(1));
        let box_size = bound / DVec3::new(boxes[0] as f64, boxes[1] as f64, boxes[2] as f64);
        let n = boxes[0] * boxes[1] * boxes[2];
        let per_box = initial_concentration * box_size.x * box_size.y * box_size.z;
        Self {
            boxes,
            box_size,
            diffusivity,
            decay,
            quantity: vec![per_box; n],
            back_buffer: vec![0.0; n],
            boundary,
        }
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.boxes[1] + y) * self.boxes[0] + x
    }

    fn box_of(&self, p: DVec3) -> usize {
        let coord = |v: f64, size: f64, n: usize| {
            if v.is_finite() && v > 0.0 {
                ((v / size) as usize).min(n - 1)
            } else {
                0
            }
        };
        self.index(
            coord(p.x, self.box_size.x, self.boxes[0]),
            coord(p.y, self.box_size.y, self.boxes[1]),
            coord(p.z, self.box_size.z, self.boxes[2]),
        )
    }

    fn box_volume(&self) -> f64 {
        self.box_size.x * self.box_size.y * self.box_size.z
    }

    fn leak_fraction(&self, face: Face, dt: f64) -> f64 {
        (self.boundary.mode(face).leak_rate() * dt).min(1.0)
    }
}

impl ChemicalField for GridField {
    fn concentration_at(&self, p: DVec3) -> f64 {
        self.quantity[self.box_of(p)] / self.box_volume()
    }

    fn add_quantity(&mut self, p: DVec3, amount: f64) {
        let idx = self.box_of(p);
        self.quantity[idx] = (self.quantity[idx] + amount).max(0.0);
    }

    fn update(&mut self, dt: f64) {
        let [nx, ny, nz] = self.boxes;
        let h2 = DVec3::new(
            self.box_size.x * self.box_size.x,
            self.box_size.y * self.box_size.y,
            self.box_size.z * self.box_size.z,
        );
        let coeff = DVec3::splat(self.diffusivity * dt) / h2;
        let keep = (1.0 - self.decay * dt).max(0.0);

        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let idx = self.index(x, y, z);
                    let q = self.quantity[idx];
                    let neighbor = |axis: usize, upper: bool| -> f64 {
                        let (pos, n) = match axis {
                            0 => (x, nx),
                            1 => (y, ny),
                            _ => (z, nz),
                        };
                        let at_face = if upper { pos + 1 == n } else { pos == 0 };
                        if at_face {
                            // No diffusive flux through faces; leaky faces drain below.
                            return q;
                        }
                        let (mut ix, mut iy, mut iz) = (x, y, z);
                        let step = |v: &mut usize| {
                            if upper {
                                *v += 1;
                            } else {
                                *v -= 1;
                            }
                        };
                        match axis {
                            0 => step(&mut ix),
                            1 => step(&mut iy),
                            _ => step(&mut iz),
                        }
                        self.quantity[self.index(ix, iy, iz)]
                    };

                    let laplacian = coeff.x * (neighbor(0, true) + neighbor(0, false) - 2.0 * q)
                        + coeff.y * (neighbor(1, true) + neighbor(1, false) - 2.0 * q)
                        + coeff.z * (neighbor(2, true) + neighbor(2, false) - 2.0 * q);
                    self.back_buffer[idx] = ((q + laplacian) * keep).max(0.0);
                }
            }
        }

        // Leaky faces drain their boundary boxes at the configured rate.
        for face in Face::ALL {
            let fraction = self.leak_fraction(face, dt);
            if fraction <= 0.0 {
                continue;
            }
            let axis = face.axis();
            let layer = if face.is_upper() { self.boxes[axis] - 1 } else { 0 };
            for z in 0..nz {
                for y in 0..ny {
                    for x in 0..nx {
                        if [x, y, z][axis] == layer {
                            let idx = self.index(x, y, z);
                            self.back_buffer[idx] *= 1.0 - fraction;
                        }
                    }
                }
            }
        }

        std::mem::swap(&mut self.quantity, &mut self.back_buffer);
    }

    fn total_quantity(&self) -> f64 {
        self.quantity.iter().sum()
    }
}

/// Named fields owned by the environment.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    names: Vec<String>,
    fields: Vec<Box<dyn ChemicalField>>,
}

impl FieldRegistry {
    pub fn insert(&mut self, name: impl Into<String>, field: Box<dyn ChemicalField>) {
        let name = name.into();
        if let Some(i) = self.names.iter().position(|n| *n == name) {
            self.fields[i] = field;
        } else {
            self.names.push(name);
            self.fields.push(field);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ChemicalField> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(self.fields[i].as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn ChemicalField + 'static)> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(self.fields[i].as_mut())
    }

    pub fn update_all(&mut self, dt: f64) {
        for field in &mut self.fields {
            field.update(dt);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_grid(diffusivity: f64) -> GridField {
        GridField::new(
            DVec3::new(10.0, 10.0, 1.0),
            [10, 10, 1],
            diffusivity,
            0.0,
            0.0,
            BoundaryConfig::closed_box(),
        )
    }

    #[test]
    fn test_diffusion_conserves_mass_in_closed_box() {
        let mut field = closed_grid(0.1);
        field.add_quantity(DVec3::new(5.5, 5.5, 0.5), 100.0);
        for _ in 0..50 {
            field.update(0.5);
        }
        assert!((field.total_quantity() - 100.0).abs() < 1e-9);
        assert!(field.concentration_at(DVec3::new(6.5, 5.5, 0.5)) > 0.0);
    }

    #[test]
    fn test_leaky_face_drains_quantity() {
        let mut field = GridField::new(
            DVec3::new(10.0, 10.0, 1.0),
            [10, 10, 1],
            0.0,
            0.0,
            1.0,
            BoundaryConfig::default(),
        );
        let before = field.total_quantity();
        field.update(0.05);
        assert!(field.total_quantity() < before);
        // Interior boxes are untouched without diffusion.
        assert!((field.concentration_at(DVec3::new(5.5, 5.5, 0.5)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_removal_never_goes_negative() {
        let mut field = UniformField::new(1.0, DVec3::new(2.0, 2.0, 1.0));
        field.add_quantity(DVec3::ZERO, -10.0);
        assert_eq!(field.concentration_at(DVec3::ZERO), 0.0);
    }

    #[test]
    fn test_registry_lookup_by_name() {
        let mut registry = FieldRegistry::default();
        registry.insert("lysine", Box::new(UniformField::new(2.0, DVec3::ONE)));
        assert_eq!(
            registry.get("lysine").map(|f| f.concentration_at(DVec3::ZERO)),
            Some(2.0)
        );
        assert!(registry.get("leucine").is_none());
    }

    #[test]
    fn test_diffusion_number_uses_smallest_box_edge() {
        let cfg = FieldConfig {
            name: "a".into(),
            kind: FieldKind::Grid {
                boxes: [10, 10, 1],
                diffusivity: 0.5,
                decay: 0.0,
                initial_concentration: 0.0,
            },
        };
        assert!((cfg.diffusion_number(DVec3::new(10.0, 10.0, 1.0), 0.1) - 0.05).abs() < 1e-12);
    }
}
