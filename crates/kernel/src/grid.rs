//! Uniform-grid spatial index over the unit domain.
//!
//! Uses a counting sort (per-cell counts, prefix-sum offsets, handles sorted
//! by cell) rather than a `HashMap` of buckets, so a rebuild is O(N + cells)
//! and every bucket is a contiguous slice.

use crate::particle::{ParticleHandle, ParticleStore};

/// Map a domain-normalized position to its cell, clamped to grid bounds.
///
/// `clamp(floor(dimensions * p), 0, dimensions - 1)` per axis. Positions at
/// exactly 1.0, outside the unit cube, or NaN all land inside the grid.
///
/// The clamp runs on integers: `dim as f32` rounds up for large axes, so a
/// float clamp could yield `dim` itself. Axes must not exceed `i32::MAX`.
#[inline]
pub fn cell_coordinate(dimensions: [u32; 3], position: [f32; 3]) -> [i32; 3] {
    std::array::from_fn(|axis| {
        let dim = dimensions[axis] as i64;
        // NaN casts to 0, infinities saturate
        let cell = (dimensions[axis] as f32 * position[axis]).floor() as i64;
        cell.clamp(0, (dim - 1).max(0)) as i32
    })
}

/// Product of the three extents, or `None` if it overflows a `u32`.
///
/// Cell indices and bucket offsets are stored as `u32`, so this bounds the
/// resolution a [`SpatialGrid`] can hold.
pub fn checked_cell_count(extent: [u32; 3]) -> Option<u32> {
    extent.iter().try_fold(1u32, |acc, &d| acc.checked_mul(d))
}

/// Flat cell index from an in-bounds cell coordinate.
#[inline]
fn flat_index(dimensions: [u32; 3], cell: [i32; 3]) -> usize {
    let [nx, ny, _] = dimensions.map(|d| d as usize);
    cell[0] as usize + cell[1] as usize * nx + cell[2] as usize * nx * ny
}

/// Occupancy summary of a sorted grid, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOccupancy {
    /// Cells holding at least one particle.
    pub occupied_cells: usize,
    /// Largest bucket.
    pub max_per_cell: usize,
    /// Mean bucket size over occupied cells (0 when the grid is empty).
    pub mean_per_occupied_cell: f32,
}

/// Uniform-grid bucket index of particle handles.
///
/// One cell per unit grid step: cell size is `1 / dimensions` per axis.
/// [`sort`](Self::sort) rebuilds the whole index; there is no incremental
/// update. Queries take `&self` and may run concurrently; `sort` takes
/// `&mut self`, so it can never overlap them.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    dimensions: [u32; 3],
    /// Handle and flat cell for every live particle, in slot order.
    binned: Vec<(ParticleHandle, u32)>,
    /// Handles sorted by cell, slot order inside each cell.
    sorted: Vec<ParticleHandle>,
    /// Start offset in `sorted` for each cell.
    cell_offsets: Vec<u32>,
    /// Number of particles in each cell.
    cell_counts: Vec<u32>,
    /// Store revision of the last sort.
    revision: Option<u64>,
}

impl SpatialGrid {
    /// Create an empty grid with the given per-axis resolution.
    ///
    /// # Panics
    ///
    /// Panics if a component of `dimensions` is zero or above `i32::MAX`, or
    /// if the total cell count does not fit in a `u32`.
    /// [`SimulationConfig::validate`](crate::SimulationConfig::validate)
    /// rejects such resolutions up front.
    pub fn new(dimensions: [u32; 3]) -> Self {
        assert!(
            dimensions.iter().all(|&d| d > 0 && d <= i32::MAX as u32),
            "grid dimensions must be in 1..=i32::MAX, got {dimensions:?}"
        );
        let total_cells = checked_cell_count(dimensions)
            .unwrap_or_else(|| panic!("grid {dimensions:?} has more than u32::MAX cells"))
            as usize;
        Self {
            dimensions,
            binned: Vec::new(),
            sorted: Vec::new(),
            cell_offsets: vec![0; total_cells],
            cell_counts: vec![0; total_cells],
            revision: None,
        }
    }

    /// Per-axis resolution.
    pub fn dimensions(&self) -> [u32; 3] {
        self.dimensions
    }

    /// Cell edge length per axis in domain units.
    pub fn cell_size(&self) -> [f32; 3] {
        self.dimensions.map(|d| 1.0 / d as f32)
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.cell_counts.len()
    }

    /// Number of particles indexed by the last sort.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Return `true` if the last sort indexed no particles (or none happened).
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Store revision the grid was last sorted against.
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Return `true` if the grid reflects the current contents of `particles`.
    pub fn is_synced_with(&self, particles: &ParticleStore) -> bool {
        self.revision == Some(particles.revision())
    }

    /// Cell containing `position`, clamped to grid bounds.
    #[inline]
    pub fn cell_of(&self, position: [f32; 3]) -> [i32; 3] {
        cell_coordinate(self.dimensions, position)
    }

    fn in_bounds(&self, cell: [i32; 3]) -> bool {
        cell.iter()
            .zip(&self.dimensions)
            .all(|(&c, &d)| c >= 0 && (c as i64) < d as i64)
    }

    /// Rebuild the grid from the live particles in `particles`.
    pub fn sort(&mut self, particles: &ParticleStore) {
        let dimensions = self.dimensions;
        let total_cells = self.cell_count();

        // --- 1. Bin every live particle and count per cell ---
        self.binned.clear();
        self.cell_counts.clear();
        self.cell_counts.resize(total_cells, 0);
        for handle in particles.handles() {
            let cell = cell_coordinate(dimensions, particles.position[handle.index()]);
            let ci = flat_index(dimensions, cell);
            self.cell_counts[ci] += 1;
            self.binned.push((handle, ci as u32));
        }

        // --- 2. Prefix-sum to get cell offsets ---
        self.cell_offsets.clear();
        self.cell_offsets.resize(total_cells, 0);
        let mut running = 0u32;
        for c in 0..total_cells {
            self.cell_offsets[c] = running;
            running += self.cell_counts[c];
        }

        // --- 3. Scatter handles into sorted order ---
        let n = self.binned.len();
        self.sorted.clear();
        self.sorted.resize(n, ParticleHandle::new(u32::MAX, 0));
        let mut write_heads = self.cell_offsets.clone();
        for &(handle, ci) in &self.binned {
            let head = &mut write_heads[ci as usize];
            self.sorted[*head as usize] = handle;
            *head += 1;
        }

        self.revision = Some(particles.revision());
        tracing::debug!(particles = n, cells = total_cells, "spatial grid sorted");
    }

    /// Handles bucketed in a single cell. Empty for out-of-range cells.
    pub fn cell_particles(&self, cell: [i32; 3]) -> &[ParticleHandle] {
        if !self.in_bounds(cell) {
            return &[];
        }
        let ci = flat_index(self.dimensions, cell);
        let start = self.cell_offsets[ci] as usize;
        let count = self.cell_counts[ci] as usize;
        &self.sorted[start..start + count]
    }

    /// Visit every handle whose cell lies in `[cell - radius, cell + radius]`
    /// per axis, inclusive.
    ///
    /// The region is clipped to grid bounds; a region entirely outside the
    /// grid (or with a negative radius) visits nothing. Cells are visited
    /// z-major, then y, then x, and handles inside a cell in slot order.
    pub fn for_each_in_region<F>(&self, cell: [i32; 3], radius: [i32; 3], mut f: F)
    where
        F: FnMut(ParticleHandle),
    {
        let mut lo = [0i64; 3];
        let mut hi = [0i64; 3];
        for axis in 0..3 {
            let c = cell[axis] as i64;
            let r = radius[axis] as i64;
            lo[axis] = (c - r).max(0);
            hi[axis] = (c + r).min(self.dimensions[axis] as i64 - 1);
            if lo[axis] > hi[axis] {
                return;
            }
        }

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    let ci = flat_index(self.dimensions, [x as i32, y as i32, z as i32]);
                    let start = self.cell_offsets[ci] as usize;
                    let count = self.cell_counts[ci] as usize;
                    for &handle in &self.sorted[start..start + count] {
                        f(handle);
                    }
                }
            }
        }
    }

    /// Collect the handles of [`for_each_in_region`](Self::for_each_in_region).
    pub fn cell_neighbors(&self, cell: [i32; 3], radius: [i32; 3]) -> Vec<ParticleHandle> {
        let mut neighbors = Vec::new();
        self.for_each_in_region(cell, radius, |h| neighbors.push(h));
        neighbors
    }

    /// Bucket statistics of the last sort.
    pub fn occupancy(&self) -> GridOccupancy {
        let mut occupied_cells = 0;
        let mut max_per_cell = 0;
        for &count in &self.cell_counts {
            if count > 0 {
                occupied_cells += 1;
                max_per_cell = max_per_cell.max(count as usize);
            }
        }
        let mean_per_occupied_cell = if occupied_cells > 0 {
            self.sorted.len() as f32 / occupied_cells as f32
        } else {
            0.0
        };
        GridOccupancy { occupied_cells, max_per_cell, mean_per_occupied_cell }
    }
}
