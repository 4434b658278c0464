//! Surface pore detection on a voxelized image of the network.
//!
//! Pore positions on the active axes are rasterized onto a grid whose pitch
//! is the smallest coordinate gap of each axis (never finer than the grid
//! resolution allows), with one empty layer of padding on every active side.
//!
//! Without markers, a face-connected flood fill from the grid border marks
//! the exterior; occupied voxels touching the exterior are surface. With
//! markers, each marker looks at the network along the axis of its largest
//! normalized excursion and the first occupied voxel on every grid line is
//! surface.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::data::property::PropertyArray;
use crate::data::property_store::RESERVED_NAMES;
use crate::geometry::metrics::{EPS, active_axes, bounding_box};
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network};

/// Options for [`find_surface_pores`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceOptions {
    /// Label written on the surface pores (replacing any previous values).
    pub label: String,
    /// Maximum number of voxels along any axis.
    pub grid_resolution: usize,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            label: "surface".to_string(),
            grid_resolution: 128,
        }
    }
}

struct VoxelGrid {
    dims: [usize; 3],
    occupied: Vec<bool>,
    cell_of: Vec<usize>,
    axes: Vec<usize>,
}

impl VoxelGrid {
    fn build(coords: &[[f64; 3]], active: [bool; 3], resolution: usize) -> Self {
        let (lo, hi) = bounding_box(coords).unwrap_or(([0.0; 3], [0.0; 3]));
        let axes: Vec<usize> = (0..3).filter(|&a| active[a]).collect();
        let mut dims = [1usize; 3];
        let mut pitch = [1.0f64; 3];
        for &a in &axes {
            let span = hi[a] - lo[a];
            let mut values: Vec<f64> = coords.iter().map(|c| c[a]).collect();
            values.sort_by(|x, y| x.total_cmp(y));
            let floor = EPS * span.max(lo[a].abs()).max(hi[a].abs()).max(1.0);
            let gap = values
                .windows(2)
                .map(|w| w[1] - w[0])
                .filter(|&d| d > floor)
                .fold(span, f64::min);
            pitch[a] = gap.max(span / (resolution - 1) as f64);
            dims[a] = (span / pitch[a] + 0.5).floor() as usize + 1 + 2;
        }
        let mut occupied = vec![false; dims.iter().product()];
        let cell_of = coords
            .iter()
            .map(|c| {
                let mut idx = [0usize; 3];
                for &a in &axes {
                    let cell = ((c[a] - lo[a]) / pitch[a] + 0.5).floor() as usize + 1;
                    idx[a] = cell.min(dims[a] - 2);
                }
                let flat = (idx[0] * dims[1] + idx[1]) * dims[2] + idx[2];
                occupied[flat] = true;
                flat
            })
            .collect();
        Self {
            dims,
            occupied,
            cell_of,
            axes,
        }
    }

    fn unflatten(&self, flat: usize) -> [usize; 3] {
        let k = flat % self.dims[2];
        let j = (flat / self.dims[2]) % self.dims[1];
        let i = flat / (self.dims[1] * self.dims[2]);
        [i, j, k]
    }

    fn flatten(&self, idx: [usize; 3]) -> usize {
        (idx[0] * self.dims[1] + idx[1]) * self.dims[2] + idx[2]
    }

    fn face_neighbors(&self, flat: usize) -> impl Iterator<Item = usize> + '_ {
        let idx = self.unflatten(flat);
        self.axes.iter().flat_map(move |&a| {
            let mut out = [None, None];
            if idx[a] > 0 {
                let mut n = idx;
                n[a] -= 1;
                out[0] = Some(self.flatten(n));
            }
            if idx[a] + 1 < self.dims[a] {
                let mut n = idx;
                n[a] += 1;
                out[1] = Some(self.flatten(n));
            }
            out.into_iter().flatten()
        })
    }

    /// Occupied voxels reachable from the border through empty voxels.
    fn exterior_surface(&self) -> Vec<bool> {
        let n = self.occupied.len();
        let mut exterior = vec![false; n];
        let mut queue = VecDeque::new();
        for flat in 0..n {
            let idx = self.unflatten(flat);
            let on_border = self
                .axes
                .iter()
                .any(|&a| idx[a] == 0 || idx[a] + 1 == self.dims[a]);
            if on_border && !self.occupied[flat] {
                exterior[flat] = true;
                queue.push_back(flat);
            }
        }
        while let Some(cur) = queue.pop_front() {
            for nb in self.face_neighbors(cur) {
                if !exterior[nb] && !self.occupied[nb] {
                    exterior[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
        (0..n)
            .map(|flat| self.occupied[flat] && self.face_neighbors(flat).any(|nb| exterior[nb]))
            .collect()
    }

    /// First occupied voxel of every grid line along `axis`, walking from the
    /// min side (`from_min`) or the max side.
    fn first_hits(&self, axis: usize, from_min: bool, hits: &mut [bool]) {
        let len = self.dims[axis];
        for flat in 0..self.occupied.len() {
            let idx = self.unflatten(flat);
            if idx[axis] != 0 {
                continue;
            }
            for step in 0..len {
                let mut cur = idx;
                cur[axis] = if from_min { step } else { len - 1 - step };
                let cell = self.flatten(cur);
                if self.occupied[cell] {
                    hits[cell] = true;
                    break;
                }
            }
        }
    }
}

/// Label the pores on the outer surface of the network and return them.
///
/// `markers` are points outside the bounding box, given in the network's
/// active axes (1, 2 or 3 components). Networks with fewer than two active
/// axes are entirely surface.
///
/// Without markers, a pore is surface when its voxel shares a face with the
/// empty region reached from the grid border. Every voxel of an outer shell
/// counts, including those tucked into the concave steps of a digitized
/// sphere, so a radius-3 voxel ball reports 90 surface pores. Counting only
/// the pores on its convex hull would give fewer.
pub fn find_surface_pores(
    net: &mut Network,
    markers: Option<&[Vec<f64>]>,
    options: &SurfaceOptions,
) -> Result<Vec<usize>, NetworkError> {
    if RESERVED_NAMES.contains(&options.label.as_str()) {
        return Err(NetworkError::ReservedName(options.label.clone()));
    }
    if options.grid_resolution < 2 {
        return Err(NetworkError::invalid(format!(
            "grid resolution must be at least 2, got {}",
            options.grid_resolution
        )));
    }
    let active = active_axes(net.coords());
    let axes: Vec<usize> = (0..3).filter(|&a| active[a]).collect();
    if let Some(markers) = markers {
        if markers.is_empty() {
            return Err(NetworkError::EmptySelection("find_surface_pores"));
        }
        if let Some(bad) = markers.iter().find(|m| m.len() != axes.len()) {
            return Err(NetworkError::DimensionMismatch {
                expected: axes.len(),
                found: bad.len(),
            });
        }
    }

    let np = net.np();
    let surface: Vec<bool> = if axes.len() < 2 {
        vec![true; np]
    } else {
        let grid = VoxelGrid::build(net.coords(), active, options.grid_resolution);
        let hits = match markers {
            None => grid.exterior_surface(),
            Some(markers) => {
                let (lo, hi) = bounding_box(net.coords()).unwrap_or(([0.0; 3], [0.0; 3]));
                let mut hits = vec![false; grid.occupied.len()];
                for marker in markers {
                    let (axis, from_min) = marker_direction(marker, &axes, lo, hi)?;
                    grid.first_hits(axis, from_min, &mut hits);
                }
                hits
            }
        };
        grid.cell_of.iter().map(|&c| hits[c]).collect()
    };

    let pores: Vec<usize> = (0..np).filter(|&p| surface[p]).collect();
    net.set_property(Domain::Pore, &options.label, PropertyArray::Bool(surface))?;
    log::debug!("found {} surface pores out of {np}", pores.len());
    Ok(pores)
}

/// Axis of largest normalized excursion and whether the marker sits on its
/// min side.
fn marker_direction(
    marker: &[f64],
    axes: &[usize],
    lo: [f64; 3],
    hi: [f64; 3],
) -> Result<(usize, bool), NetworkError> {
    let mut best = (axes[0], true, f64::NEG_INFINITY);
    let mut outside = false;
    for (&a, &m) in axes.iter().zip(marker) {
        if m < lo[a] || m > hi[a] {
            outside = true;
        }
        let center = 0.5 * (lo[a] + hi[a]);
        let half = 0.5 * (hi[a] - lo[a]);
        let excursion = (m - center) / half;
        if excursion.abs() > best.2 {
            best = (a, excursion < 0.0, excursion.abs());
        }
    }
    if !outside {
        return Err(NetworkError::invalid(format!(
            "marker {marker:?} lies inside the network's bounding box"
        )));
    }
    Ok((best.0, best.1))
}
