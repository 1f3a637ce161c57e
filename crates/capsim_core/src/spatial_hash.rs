use glam::DVec3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

#[derive(Clone, Debug, Default)]
/// Uniform 3-D grid over the simulation box for neighbor discovery.
///
/// Agents are bucketed by rod midpoint into cells stored in "offset array"
/// form (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i+1]` indexes `agent_indices` for cell `i`.
///
/// Positions outside the box are clamped into the boundary cells, and query
/// ranges are clamped the same way, so an agent that drifted past a face is
/// still found by its neighbors. Queries therefore return a superset of every
/// agent whose midpoint lies within the query radius.
///
/// # Examples
/// ```
/// use capsim_core::spatial_hash::SpatialHash;
/// use glam::DVec3;
///
/// let bound = DVec3::new(20.0, 20.0, 1.0);
/// let mut grid = SpatialHash::new(5.0, bound);
/// let positions = vec![DVec3::new(1.0, 1.0, 0.5), DVec3::new(15.0, 15.0, 0.5)];
/// grid.build_parallel(&positions);
///
/// let mut nearby = Vec::new();
/// grid.query_into(DVec3::new(2.0, 2.0, 0.5), 3.0, &mut nearby);
/// assert_eq!(nearby, vec![0]);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub bound: DVec3,
    pub cols: usize,
    pub rows: usize,
    pub layers: usize,
    pub cell_offsets: Vec<usize>,
    pub agent_indices: Vec<usize>,
}

impl SpatialHash {
    /// Creates an empty grid covering `[0, bound]` with cubic cells of `cell_size`.
    pub fn new(cell_size: f64, bound: DVec3) -> Self {
        let dims = Self::dims(cell_size, bound);
        Self {
            cell_size,
            bound,
            cols: dims[0],
            rows: dims[1],
            layers: dims[2],
            cell_offsets: vec![0; dims[0] * dims[1] * dims[2] + 1],
            agent_indices: Vec::new(),
        }
    }

    fn dims(cell_size: f64, bound: DVec3) -> [usize; 3] {
        let n = |extent: f64| ((extent / cell_size).ceil() as usize).max(1);
        [n(bound.x), n(bound.y), n(bound.z)]
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows * self.layers
    }

    #[inline]
    fn axis_cell(&self, coord: f64, cells: usize) -> usize {
        if !coord.is_finite() {
            return 0;
        }
        let c = (coord / self.cell_size).floor();
        if c <= 0.0 {
            0
        } else {
            (c as usize).min(cells - 1)
        }
    }

    /// Clamped cell coordinates of a point.
    #[inline]
    pub fn cell_coords(&self, p: DVec3) -> [usize; 3] {
        [
            self.axis_cell(p.x, self.cols),
            self.axis_cell(p.y, self.rows),
            self.axis_cell(p.z, self.layers),
        ]
    }

    #[inline]
    pub fn get_cell_idx(&self, p: DVec3) -> usize {
        let [cx, cy, cz] = self.cell_coords(p);
        (cz * self.rows + cy) * self.cols + cx
    }

    /// Rebuilds the index from agent midpoints.
    pub fn build_parallel(&mut self, positions: &[DVec3]) {
        let cell_count = self.cell_count();

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|&p| {
            atomic_counts[self.get_cell_idx(p)].fetch_add(1, AtomicOrdering::Relaxed);
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.agent_indices.resize(positions.len(), 0);
        let mut cursor = self.cell_offsets[..cell_count].to_vec();
        for (agent_idx, &p) in positions.iter().enumerate() {
            let cell_idx = self.get_cell_idx(p);
            self.agent_indices[cursor[cell_idx]] = agent_idx;
            cursor[cell_idx] += 1;
        }
    }

    fn cell_range(&self, center: DVec3, radius: f64) -> ([usize; 3], [usize; 3]) {
        let lo = self.cell_coords(center - DVec3::splat(radius));
        let hi = self.cell_coords(center + DVec3::splat(radius));
        (lo, hi)
    }

    pub fn query_callback<F>(&self, center: DVec3, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        let (lo, hi) = self.cell_range(center, radius);
        for cz in lo[2]..=hi[2] {
            for cy in lo[1]..=hi[1] {
                for cx in lo[0]..=hi[0] {
                    let cell_idx = (cz * self.rows + cy) * self.cols + cx;
                    let start = self.cell_offsets[cell_idx];
                    let end = self.cell_offsets[cell_idx + 1];
                    for &agent_idx in &self.agent_indices[start..end] {
                        callback(agent_idx);
                    }
                }
            }
        }
    }

    #[inline]
    pub fn query_into(&self, center: DVec3, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(center, radius, |idx| result.push(idx));
    }

    pub fn count_nearby(&self, center: DVec3, radius: f64) -> usize {
        let (lo, hi) = self.cell_range(center, radius);
        let mut count = 0;
        for cz in lo[2]..=hi[2] {
            for cy in lo[1]..=hi[1] {
                for cx in lo[0]..=hi[0] {
                    let cell_idx = (cz * self.rows + cy) * self.cols + cx;
                    count += self.cell_offsets[cell_idx + 1] - self.cell_offsets[cell_idx];
                }
            }
        }
        count
    }
}
