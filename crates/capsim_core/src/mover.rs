//! Quasi-static relaxation of capsule positions.
//!
//! Every sub-iteration accumulates self, wall and pairwise forces on each
//! endpoint and moves the endpoint by `force * relaxation_step`. This does not
//! conserve momentum; it only walks the configuration toward one where
//! overlaps are resolved and forces balance.

use crate::bacterium::Bacterium;
use crate::config::{AppConfig, MechanicsConfig, OverlapMeasure};
use crate::environment::Environment;
use crate::error::{Result, SimError};
use crate::geometry::{closest_points, rects_collide, OrientedRect};
use crate::metrics::{self, Metrics};
use crate::spatial_hash::SpatialHash;
use capsim_data::{BoundaryMode, Face};
use glam::DVec3;
use rayon::prelude::*;

/// Separation below which two segments are treated as coincident.
const COINCIDENT_EPS: f64 = 1e-9;

/// Outcome of one call to [`RelaxationMover::relax`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelaxationReport {
    pub iterations: usize,
    pub converged: bool,
    /// Largest endpoint force in the last sub-iteration.
    pub residual_force: f64,
    /// Largest endpoint displacement applied in any sub-iteration.
    pub max_displacement: f64,
    /// Deepest pair penetration measured in the last sub-iteration.
    pub max_overlap: f64,
    /// Endpoint moves cut down to `max_displacement`.
    pub clamped: usize,
}

/// Vertical span of a capsule padded by its radius and `range`.
fn z_extent(b: &Bacterium, range: f64) -> (f64, f64) {
    let pad = b.radius + range;
    (b.x1.z.min(b.x2.z) - pad, b.x1.z.max(b.x2.z) + pad)
}

/// Binary contact test between two capsules on their bounding rectangles.
///
/// `range` inflates each rectangle on every side; with `range = 0` two capsules
/// collide only if their padded footprints overlap. The rectangles live in the
/// xy-plane, so pairs whose padded z-extents are disjoint never collide.
#[must_use]
pub fn is_colliding(
    a: &Bacterium,
    b: &Bacterium,
    range: f64,
    measure: OverlapMeasure,
    threshold: f64,
) -> bool {
    let (a_lo, a_hi) = z_extent(a, range);
    let (b_lo, b_hi) = z_extent(b, range);
    if a_hi < b_lo || b_hi < a_lo {
        return false;
    }
    let ra = OrientedRect::around_capsule(a.x1, a.x2, a.radius, range);
    let rb = OrientedRect::around_capsule(b.x1, b.x2, b.radius, range);
    rects_collide(&ra, &rb, measure, threshold)
}

/// Forces on the four endpoints of an interacting pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairForce {
    pub a1: DVec3,
    pub a2: DVec3,
    pub b1: DVec3,
    pub b2: DVec3,
    /// Penetration depth of the capsules; negative for a sticking gap.
    pub overlap: f64,
}

/// Unit normal used when two axes pass through each other.
///
/// Perpendicular to `a` within the xy-plane, so the pair separates sideways
/// with a deterministic sign.
fn degenerate_normal(a: &Bacterium) -> DVec3 {
    let u = a.direction();
    let side = DVec3::new(-u.y, u.x, 0.0);
    if side.length_squared() > COINCIDENT_EPS {
        side.normalize()
    } else {
        DVec3::X
    }
}

/// Repulsion and sticking between `a` and `b`; `None` when they do not interact.
#[must_use]
pub fn pair_force(a: &Bacterium, b: &Bacterium, mech: &MechanicsConfig) -> Option<PairForce> {
    let reach = mech.range_stick.max(mech.collision_range);
    if !is_colliding(
        a,
        b,
        0.5 * reach,
        mech.overlap_measure,
        mech.overlap_threshold,
    ) {
        return None;
    }

    let cp = closest_points(a.x1, a.x2, b.x1, b.x2);
    let distance = cp.distance();
    let normal = if distance > COINCIDENT_EPS {
        (cp.on_first - cp.on_second) / distance
    } else {
        degenerate_normal(a)
    };
    let overlap = a.radius + b.radius - distance;

    // Positive pushes a away from b.
    let magnitude = if overlap > 0.0 {
        mech.k_cell * overlap
    } else {
        let gap = -overlap;
        if gap >= mech.range_stick || mech.k_stick <= 0.0 {
            return None;
        }
        let alignment = a.direction().dot(b.direction()).abs();
        -(mech.k_stick * gap).min(mech.max_stick_force) * alignment
    };
    if magnitude == 0.0 {
        return None;
    }

    let on_a = normal * magnitude;
    Some(PairForce {
        a1: on_a * (1.0 - cp.s),
        a2: on_a * cp.s,
        b1: -on_a * (1.0 - cp.t),
        b2: -on_a * cp.t,
        overlap,
    })
}

/// Push of solid faces on the end spheres of a capsule.
#[must_use]
pub fn wall_force(b: &Bacterium, env: &Environment, k_wall: f64) -> (DVec3, DVec3) {
    let mut forces = (DVec3::ZERO, DVec3::ZERO);
    for face in Face::ALL {
        if env.mode(face) != BoundaryMode::Wall {
            continue;
        }
        let axis = face.axis();
        let plane = env.face_coordinate(face);
        for (end, force) in [(b.x1, &mut forces.0), (b.x2, &mut forces.1)] {
            let depth = if face.is_upper() {
                end[axis] - plane + b.radius
            } else {
                plane - end[axis] + b.radius
            };
            if depth > 0.0 {
                let sign = if face.is_upper() { -1.0 } else { 1.0 };
                force[axis] += sign * k_wall * depth;
            }
        }
    }
    forces
}

/// Center-to-center distance beyond which no two capsules of `bacteria` can interact.
#[must_use]
pub fn interaction_reach(bacteria: &[Bacterium], margin: f64) -> f64 {
    let longest = bacteria
        .iter()
        .map(Bacterium::segment_length)
        .fold(0.0, f64::max);
    longest + margin
}

/// Owns the neighbor grid reused across ticks.
#[derive(Debug, Clone)]
pub struct RelaxationMover {
    pub grid: SpatialHash,
    positions: Vec<DVec3>,
}

impl RelaxationMover {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            grid: SpatialHash::new(config.grid_cell_size(), config.world.bound),
            positions: Vec::new(),
        }
    }

    /// Rebuilds the neighbor grid from the current midpoints.
    pub fn rebuild_grid(&mut self, bacteria: &[Bacterium]) {
        self.positions.clear();
        self.positions.extend(bacteria.iter().map(Bacterium::position));
        self.grid.build_parallel(&self.positions);
    }

    /// Total force on each endpoint of each bacterium for the current
    /// configuration, with the deepest penetration that bacterium takes part in.
    fn accumulate_forces(
        &self,
        bacteria: &[Bacterium],
        env: &Environment,
        config: &AppConfig,
        reach: f64,
    ) -> Vec<(DVec3, DVec3, f64)> {
        let mech = &config.mechanics;
        bacteria
            .par_iter()
            .enumerate()
            .map(|(i, b)| {
                let (mut f1, mut f2) = b.self_force(mech.k_int);
                let (w1, w2) = wall_force(b, env, mech.k_wall);
                f1 += w1;
                f2 += w2;
                let mut deepest = 0.0f64;

                self.grid.query_callback(b.position(), reach, |j| {
                    if j == i {
                        return;
                    }
                    // Evaluate every pair in index order so both sides see the same numbers.
                    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                    if let Some(pf) = pair_force(&bacteria[lo], &bacteria[hi], mech) {
                        deepest = deepest.max(pf.overlap);
                        if i == lo {
                            f1 += pf.a1;
                            f2 += pf.a2;
                        } else {
                            f1 += pf.b1;
                            f2 += pf.b2;
                        }
                    }
                });
                (f1, f2, deepest)
            })
            .collect()
    }

    /// Relaxes `bacteria` in place.
    ///
    /// Runs sub-iterations until no pair penetrates deeper than the overlap
    /// tolerance and no endpoint moves further than the displacement
    /// tolerance, or until the iteration cap is hit. Hitting the cap is
    /// reported, not an error; a non-finite endpoint is.
    pub fn relax(
        &mut self,
        bacteria: &mut [Bacterium],
        env: &Environment,
        config: &AppConfig,
        metrics: &Metrics,
    ) -> Result<RelaxationReport> {
        let mech = &config.mechanics;
        let mut report = RelaxationReport::default();
        if bacteria.is_empty() {
            report.converged = true;
            return Ok(report);
        }

        let margin = config.interaction_margin();
        for iteration in 0..mech.max_iterations {
            self.rebuild_grid(bacteria);
            let reach = interaction_reach(bacteria, margin);
            let forces = self.accumulate_forces(bacteria, env, config, reach);

            let mut step_max = 0.0f64;
            let mut residual = 0.0f64;
            let mut overlap = 0.0f64;
            for (b, (f1, f2, deepest)) in bacteria.iter_mut().zip(forces) {
                overlap = overlap.max(deepest);
                b.x1_force = f1;
                b.x2_force = f2;
                residual = residual.max(f1.length()).max(f2.length());

                for (end, force) in [(&mut b.x1, f1), (&mut b.x2, f2)] {
                    let mut delta = force * mech.relaxation_step;
                    let moved = delta.length();
                    if moved > mech.max_displacement {
                        delta *= mech.max_displacement / moved;
                        report.clamped += 1;
                    }
                    *end += delta;
                    step_max = step_max.max(delta.length());
                }
                if !b.x1.is_finite() || !b.x2.is_finite() {
                    return Err(SimError::NonFinitePosition { id: b.id() });
                }
                b.reset_forces();
            }

            report.iterations = iteration + 1;
            report.residual_force = residual;
            report.max_displacement = report.max_displacement.max(step_max);
            report.max_overlap = overlap;
            if overlap <= mech.overlap_tolerance && step_max < mech.displacement_tolerance {
                report.converged = true;
                break;
            }
        }

        if report.clamped > 0 {
            metrics.add_to_counter(metrics::RELAXATION_DISPLACEMENT_CLAMPED, report.clamped as u64);
            tracing::warn!(
                clamped = report.clamped,
                bound = mech.max_displacement,
                "Relaxation displacement clamped; stiffness may be too high for the step"
            );
        }
        if !report.converged {
            metrics.increment_counter(metrics::RELAXATION_NON_CONVERGED);
            let failures = metrics.counter(metrics::RELAXATION_NON_CONVERGED);
            if failures == 1 || failures % 100 == 0 {
                tracing::warn!(
                    failures = failures,
                    iterations = report.iterations,
                    residual_force = report.residual_force,
                    max_overlap = report.max_overlap,
                    "Relaxation hit the iteration cap"
                );
            }
        }

        Ok(report)
    }
}
