//! Per-species behaviors run in the action phase, and contact rules between species.

use crate::bacterium::Bacterium;
use crate::field::FieldRegistry;
use capsim_data::SpeciesId;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn default_mu_max() -> f64 {
    1.3
}
fn default_k_s() -> f64 {
    0.22
}
fn default_yield() -> f64 {
    1.0
}
fn default_density() -> f64 {
    1.0e-12
}

/// Monod uptake parameters for a consumed substrate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonodUptake {
    pub field: String,
    /// Maximum growth rate (1/time).
    #[serde(default = "default_mu_max")]
    pub mu_max: f64,
    /// Half-saturation concentration.
    #[serde(default = "default_k_s")]
    pub k_s: f64,
    /// Biomass produced per unit substrate consumed.
    #[serde(default = "default_yield")]
    pub yield_coeff: f64,
    /// Biomass per unit volume of cell.
    #[serde(default = "default_density")]
    pub density: f64,
}

impl MonodUptake {
    /// Sets the growth rate from the local substrate and withdraws what the
    /// resulting elongation consumes. Without substrate the cell stops growing.
    pub fn apply(&self, bacterium: &mut Bacterium, fields: &mut FieldRegistry, dt: f64) {
        let Some(field) = fields.get_mut(&self.field) else {
            return;
        };
        let position = bacterium.position();
        let s = field.concentration_at(position);
        if s <= 0.0 {
            bacterium.k_growth = 0.0;
            return;
        }
        bacterium.k_growth = self.mu_max * s / (self.k_s + s);

        let elongation =
            bacterium.length * bacterium.k_growth * (1.0 - bacterium.length / bacterium.l_max);
        let volume_rate = PI * bacterium.radius * bacterium.radius * elongation;
        let consumption = self.density * volume_rate / self.yield_coeff;
        field.add_quantity(position, -consumption * dt);
    }
}

/// Constant-rate secretion into a field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Secretion {
    pub field: String,
    /// Quantity released per unit time.
    pub rate: f64,
}

impl Secretion {
    pub fn apply(&self, bacterium: &Bacterium, fields: &mut FieldRegistry, dt: f64) {
        if let Some(field) = fields.get_mut(&self.field) {
            field.add_quantity(bacterium.position(), self.rate * dt);
        }
    }
}

/// What a species does in the action phase beyond mechanics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// Grows at its sampled rate and nothing else.
    #[default]
    Passive,
    /// Growth limited by one substrate.
    Monod(MonodUptake),
    /// Secretes into a field while growing at its sampled rate.
    Producer(Secretion),
    /// Consumes one field and secretes into another.
    CrossFeeder {
        uptake: MonodUptake,
        secretion: Secretion,
    },
}

impl Behavior {
    /// Fields this behavior reads or writes.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Behavior::Passive => Vec::new(),
            Behavior::Monod(uptake) => vec![uptake.field.as_str()],
            Behavior::Producer(secretion) => vec![secretion.field.as_str()],
            Behavior::CrossFeeder { uptake, secretion } => {
                vec![uptake.field.as_str(), secretion.field.as_str()]
            }
        }
    }

    /// Substrate uptake kinetics, if this behavior consumes a field.
    #[must_use]
    pub fn uptake(&self) -> Option<&MonodUptake> {
        match self {
            Behavior::Monod(uptake) | Behavior::CrossFeeder { uptake, .. } => Some(uptake),
            Behavior::Passive | Behavior::Producer(_) => None,
        }
    }

    pub fn act(&self, bacterium: &mut Bacterium, fields: &mut FieldRegistry, dt: f64) {
        match self {
            Behavior::Passive => {}
            Behavior::Monod(uptake) => uptake.apply(bacterium, fields, dt),
            Behavior::Producer(secretion) => secretion.apply(bacterium, fields, dt),
            Behavior::CrossFeeder { uptake, secretion } => {
                uptake.apply(bacterium, fields, dt);
                secretion.apply(bacterium, fields, dt);
            }
        }
    }
}

/// Consequence for the victim of a contact rule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContactEffect {
    /// Growth rate drops to zero for good.
    HaltGrowth,
    /// Growth rate is replaced by a draw from `N(mean, stdv)`, usually negative.
    Shrink { mean: f64, stdv: f64 },
}

/// A victim species is affected when touching an attacker species.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactRule {
    pub victim: SpeciesId,
    pub attacker: SpeciesId,
    /// Inflation of the bounding rectangles for the contact test.
    #[serde(default)]
    pub range: f64,
    pub effect: ContactEffect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bacterium::BacteriumParams;
    use crate::field::UniformField;
    use capsim_data::{BacteriumId, Lineage};
    use glam::DVec3;

    fn cell() -> Bacterium {
        Bacterium::new(
            Lineage::founder(BacteriumId(1)),
            SpeciesId(0),
            DVec3::new(1.0, 1.0, 0.5),
            DVec3::new(3.0, 1.0, 0.5),
            BacteriumParams {
                radius: 0.5,
                l_max: 8.0,
                asymmetry: 1.0,
                k_growth: 0.5,
                division_threshold: 7.0,
            },
        )
    }

    fn uptake() -> MonodUptake {
        MonodUptake {
            field: "substrate".into(),
            mu_max: 1.3,
            k_s: 0.22,
            yield_coeff: 1.0,
            density: 1.0,
        }
    }

    #[test]
    fn test_monod_rate_at_half_saturation() {
        let mut fields = FieldRegistry::default();
        fields.insert("substrate", Box::new(UniformField::new(0.22, DVec3::new(10.0, 10.0, 1.0))));
        let mut b = cell();
        Behavior::Monod(uptake()).act(&mut b, &mut fields, 0.05);
        assert!((b.k_growth - 0.65).abs() < 1e-12);
        let left = fields.get("substrate").map(|f| f.concentration_at(DVec3::ZERO));
        assert!(left.is_some_and(|c| c < 0.22));
    }

    #[test]
    fn test_monod_without_substrate_halts_growth() {
        let mut fields = FieldRegistry::default();
        fields.insert("substrate", Box::new(UniformField::new(0.0, DVec3::ONE)));
        let mut b = cell();
        Behavior::Monod(uptake()).act(&mut b, &mut fields, 0.05);
        assert_eq!(b.k_growth, 0.0);
    }

    #[test]
    fn test_cross_feeder_secretes() {
        let mut fields = FieldRegistry::default();
        fields.insert("substrate", Box::new(UniformField::new(1.0, DVec3::ONE)));
        fields.insert("product", Box::new(UniformField::new(0.0, DVec3::ONE)));
        let behavior = Behavior::CrossFeeder {
            uptake: uptake(),
            secretion: Secretion {
                field: "product".into(),
                rate: 10.0,
            },
        };
        let mut b = cell();
        behavior.act(&mut b, &mut fields, 0.1);
        assert_eq!(
            fields.get("product").map(|f| f.concentration_at(DVec3::ZERO)),
            Some(1.0)
        );
        assert_eq!(behavior.field_names(), vec!["substrate", "product"]);
    }

    #[test]
    fn test_behavior_deserializes_from_toml() {
        let text = r#"
            kind = "monod"
            field = "lysine"
            mu_max = 2.0
        "#;
        let behavior: Behavior = toml::from_str(text).expect("valid behavior");
        match behavior {
            Behavior::Monod(u) => {
                assert_eq!(u.field, "lysine");
                assert_eq!(u.mu_max, 2.0);
                assert_eq!(u.k_s, 0.22);
            }
            other => panic!("unexpected behavior {other:?}"),
        }
    }
}
