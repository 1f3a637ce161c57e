//! The capsule bacterium agent.
//!
//! A bacterium is a segment `x1 -> x2` swept by a sphere of `radius`. Its
//! tracked `length` is the rest length of an internal spring between the two
//! endpoints: growth raises the rest length and the mover lets the endpoints
//! follow.

use crate::config::GrowthConfig;
use crate::error::{Result, SimError};
use crate::geometry::rod_angle;
use capsim_data::{BacteriumId, BacteriumSnapshot, Lineage, SpeciesId};
use glam::DVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Endpoint distances below this are treated as a collapsed rod.
const MIN_SEGMENT: f64 = 1e-12;

/// Birth parameters of a bacterium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacteriumParams {
    pub radius: f64,
    pub l_max: f64,
    pub asymmetry: f64,
    pub k_growth: f64,
    pub division_threshold: f64,
}

#[derive(Debug, Clone)]
pub struct Bacterium {
    pub lineage: Lineage,
    /// Daughters split off this cell, oldest first.
    pub children: Vec<BacteriumId>,
    pub species: SpeciesId,
    pub x1: DVec3,
    pub x2: DVec3,
    pub x1_force: DVec3,
    pub x2_force: DVec3,
    pub radius: f64,
    /// Rest length of the internal spring.
    pub length: f64,
    pub l_max: f64,
    pub k_growth: f64,
    pub division_threshold: f64,
    /// Weight of the x2 end in the internal spring; the x1 end gets `2 - asymmetry`.
    pub asymmetry: f64,
    /// Length gained per unit time over the last growth step.
    pub elongation_rate: f64,
    /// Ticks since birth or last division.
    pub lifetime: u64,
    /// Growth rate imposed by a contact rule; replaces `k_growth` once set.
    pub growth_override: Option<f64>,
    /// Private parameter stream; `None` draws from the world stream.
    pub rng: Option<ChaCha8Rng>,
}

impl Bacterium {
    /// Creates a bacterium between two endpoints. The rest length starts at the
    /// endpoint distance, capped at `l_max`.
    #[must_use]
    pub fn new(
        lineage: Lineage,
        species: SpeciesId,
        x1: DVec3,
        x2: DVec3,
        params: BacteriumParams,
    ) -> Self {
        Self {
            lineage,
            children: Vec::new(),
            species,
            x1,
            x2,
            x1_force: DVec3::ZERO,
            x2_force: DVec3::ZERO,
            radius: params.radius,
            length: x1.distance(x2).min(params.l_max),
            l_max: params.l_max,
            k_growth: params.k_growth,
            division_threshold: params.division_threshold,
            asymmetry: params.asymmetry,
            elongation_rate: 0.0,
            lifetime: 0,
            growth_override: None,
            rng: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> BacteriumId {
        self.lineage.id
    }

    /// Midpoint of the rod.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        (self.x1 + self.x2) * 0.5
    }

    /// Unit vector from `x1` to `x2`; zero for a collapsed rod.
    #[must_use]
    pub fn direction(&self) -> DVec3 {
        (self.x2 - self.x1).normalize_or_zero()
    }

    /// Current endpoint distance, which lags the rest length while growing.
    #[must_use]
    pub fn segment_length(&self) -> f64 {
        self.x1.distance(self.x2)
    }

    #[must_use]
    pub fn angle(&self) -> f64 {
        rod_angle(self.x1, self.x2)
    }

    pub fn reset_forces(&mut self) {
        self.x1_force = DVec3::ZERO;
        self.x2_force = DVec3::ZERO;
    }

    /// Internal spring force on (`x1`, `x2`) pulling the endpoints toward the rest length.
    ///
    /// The potential is quadratic in the length mismatch and signed so that a
    /// short rod is stretched and a long one compressed. The x1 end carries
    /// `2 - asymmetry` of the response and the x2 end carries `asymmetry`.
    #[must_use]
    pub fn self_force(&self, k_int: f64) -> (DVec3, DVec3) {
        let seg = self.x2 - self.x1;
        let dist = seg.length();
        if dist < MIN_SEGMENT {
            return (DVec3::ZERO, DVec3::ZERO);
        }
        let diff = dist - self.length;
        let potential = if diff < 0.0 {
            0.5 * k_int * diff * diff
        } else {
            -0.5 * k_int * diff * diff
        };
        let hat = seg / dist;
        (
            -potential * (2.0 - self.asymmetry) * hat,
            potential * self.asymmetry * hat,
        )
    }

    /// Accumulates [`Self::self_force`] into the endpoint forces.
    pub fn compute_self_force(&mut self, k_int: f64) {
        let (f1, f2) = self.self_force(k_int);
        self.x1_force += f1;
        self.x2_force += f2;
    }

    /// Relaxes the asymmetry toward symmetric elongation once the rod is long enough.
    pub fn advance_asymmetry(&mut self, asymmetry_length: f64, sym_growth: f64, dt: f64) {
        if self.length >= asymmetry_length && self.asymmetry < 1.0 {
            self.asymmetry = (self.asymmetry + sym_growth * dt).min(1.0);
        }
    }

    /// Rate used by [`Self::grow`].
    #[must_use]
    pub fn effective_growth_rate(&self) -> f64 {
        self.growth_override.unwrap_or(self.k_growth)
    }

    /// Logistic elongation of the rest length.
    pub fn grow(&mut self, dt: f64) {
        let delta = self.effective_growth_rate() * self.length * (1.0 - self.length / self.l_max) * dt;
        self.length += delta;
        self.elongation_rate = if dt > 0.0 { delta / dt } else { 0.0 };
    }

    #[must_use]
    pub fn ready_to_divide(&self) -> bool {
        self.length >= self.division_threshold
    }

    /// Splits this rod in two along its axis.
    ///
    /// The mother keeps the `x1` half and the daughter takes the `x2` half,
    /// separated by one cell diameter. Both new poles at the split point
    /// become `x1`. Growth parameters are copied to the daughter; the caller
    /// re-samples them. The daughter starts from the configured asymmetry while
    /// the mother keeps her relaxed one.
    pub fn divide<R: Rng + ?Sized>(
        &mut self,
        child_id: BacteriumId,
        growth: &GrowthConfig,
        rng: &mut R,
    ) -> Result<Bacterium> {
        if !self.ready_to_divide() {
            return Err(SimError::BelowDivisionThreshold {
                id: self.id(),
                length: self.length,
                threshold: self.division_threshold,
            });
        }

        let axis = self.x2 - self.x1;
        let actual = axis.length();
        let perturbation = growth.division_noise * actual * (rng.gen::<f64>() - 0.5);
        let l1 = actual * 0.5 * (1.0 + perturbation) - self.radius;
        let l2 = actual * 0.5 * (1.0 - perturbation) - self.radius;
        if l1 <= 0.0 || l2 <= 0.0 || actual < MIN_SEGMENT {
            return Err(SimError::NonPositiveDaughter {
                id: self.id(),
                l1,
                l2,
            });
        }

        let push = (self.x1 - self.x2) * (growth.push * rng.gen::<f64>());
        let twist = DVec3::new(
            (rng.gen::<f64>() - 0.5) * 2.0 * growth.twist,
            (rng.gen::<f64>() - 0.5) * 2.0 * growth.twist,
            0.0,
        );
        let offset = push + twist;

        let mother_pole = self.x1 + axis * (l1 / actual) + offset;
        let child_pole = self.x2 - axis * (l2 / actual) - offset;

        let child = Bacterium {
            lineage: Lineage::child_of(&self.lineage, child_id),
            children: Vec::new(),
            species: self.species,
            x1: child_pole,
            x2: self.x2,
            x1_force: DVec3::ZERO,
            x2_force: DVec3::ZERO,
            radius: self.radius,
            length: l2,
            l_max: self.l_max,
            k_growth: self.k_growth,
            division_threshold: self.division_threshold,
            asymmetry: growth.asymmetry,
            elongation_rate: 0.0,
            lifetime: 0,
            growth_override: None,
            rng: None,
        };

        let old_x1 = self.x1;
        self.x1 = mother_pole;
        self.x2 = old_x1;
        self.length = l1;
        self.lifetime = 0;
        self.children.push(child_id);
        self.reset_forces();

        Ok(child)
    }

    #[must_use]
    pub fn snapshot(&self) -> BacteriumSnapshot {
        BacteriumSnapshot {
            id: self.id(),
            species: self.species,
            origin_id: self.lineage.origin_id,
            parent_id: self.lineage.parent_id,
            x1: self.x1,
            x2: self.x2,
            position: self.position(),
            direction: self.direction(),
            length: self.length,
            k_growth: self.effective_growth_rate(),
            elongation_rate: self.elongation_rate,
            lifetime: self.lifetime,
        }
    }
}
