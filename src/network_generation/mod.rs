//! Lattice network generators.
//!
//! - [`cubic`] builds a full cubic lattice with 6, 14, 18, 20 or 26
//!   neighbors per interior pore.
//! - [`CubicTemplate`] turns a [`VoxelMask`] into a lattice network holding
//!   only the true voxels.
//!
//! Pore `(i, j, k)` has flat index `(i * ny + j) * nz + k` and sits at
//! `(index + 0.5) * spacing`. Generated networks carry the `internal` label
//! in both domains and the bounding-box face labels.

pub mod templates;

use serde::{Deserialize, Serialize};

use crate::algs::faces::{FaceLabelOptions, label_faces};
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network};

pub use templates::{template_cylinder_annulus, template_sphere_shell};

/// Label applied to every generated pore and throat.
pub const INTERNAL_LABEL: &str = "internal";

fn invalid_lattice(message: impl Into<String>) -> NetworkError {
    NetworkError::InvalidArgument(message.into())
}

/// Neighbor stencil of a cubic lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Face neighbors.
    #[default]
    Six,
    /// Face neighbors and body diagonals.
    Fourteen,
    /// Face neighbors and face diagonals.
    Eighteen,
    /// Face diagonals and body diagonals.
    Twenty,
    /// Every neighbor in the surrounding 3x3x3 block.
    TwentySix,
}

impl Connectivity {
    /// Map a neighbor count to a stencil.
    pub fn from_count(n: usize) -> Result<Self, NetworkError> {
        match n {
            6 => Ok(Connectivity::Six),
            14 => Ok(Connectivity::Fourteen),
            18 => Ok(Connectivity::Eighteen),
            20 => Ok(Connectivity::Twenty),
            26 => Ok(Connectivity::TwentySix),
            other => Err(invalid_lattice(format!(
                "connectivity must be 6, 14, 18, 20 or 26, got {other}"
            ))),
        }
    }

    pub fn count(self) -> usize {
        match self {
            Connectivity::Six => 6,
            Connectivity::Fourteen => 14,
            Connectivity::Eighteen => 18,
            Connectivity::Twenty => 20,
            Connectivity::TwentySix => 26,
        }
    }

    fn includes(self, nonzero: usize) -> bool {
        match self {
            Connectivity::Six => nonzero == 1,
            Connectivity::Fourteen => nonzero == 1 || nonzero == 3,
            Connectivity::Eighteen => nonzero == 1 || nonzero == 2,
            Connectivity::Twenty => nonzero == 2 || nonzero == 3,
            Connectivity::TwentySix => (1..=3).contains(&nonzero),
        }
    }

    /// Offsets whose first non-zero component is positive, so each pair of
    /// neighbors appears once.
    pub fn forward_offsets(self) -> Vec<[isize; 3]> {
        let mut out = Vec::with_capacity(13);
        for di in -1isize..=1 {
            for dj in -1isize..=1 {
                for dk in -1isize..=1 {
                    let off = [di, dj, dk];
                    let nonzero = off.iter().filter(|&&d| d != 0).count();
                    let forward = off.iter().find(|&&d| d != 0).is_some_and(|&d| d > 0);
                    if forward && self.includes(nonzero) {
                        out.push(off);
                    }
                }
            }
        }
        out
    }
}

/// Boolean voxel grid in C order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelMask {
    pub shape: [usize; 3],
    pub data: Vec<bool>,
}

impl VoxelMask {
    pub fn new(shape: [usize; 3], data: Vec<bool>) -> Result<Self, NetworkError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(invalid_lattice(format!(
                "mask of shape {shape:?} needs {expected} voxels, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// All-true mask.
    pub fn filled(shape: [usize; 3]) -> Self {
        Self {
            shape,
            data: vec![true; shape.iter().product()],
        }
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> bool {
        self.data[self.index(i, j, k)]
    }

    /// Number of true voxels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }
}

/// Turns a voxel mask into a network.
pub trait TemplateBuilder {
    fn build_from_mask(&self, mask: &VoxelMask, spacing: [f64; 3]) -> Result<Network, NetworkError>;
}

/// Lattice builder keeping only the true voxels of a mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubicTemplate {
    pub connectivity: Connectivity,
}

impl TemplateBuilder for CubicTemplate {
    fn build_from_mask(&self, mask: &VoxelMask, spacing: [f64; 3]) -> Result<Network, NetworkError> {
        if spacing.iter().any(|&s| !(s > 0.0) || !s.is_finite()) {
            return Err(invalid_lattice(format!(
                "spacing must be positive and finite, got {spacing:?}"
            )));
        }
        if mask.data.len() != mask.shape.iter().product::<usize>() {
            return Err(invalid_lattice("mask data does not match its shape"));
        }
        let [nx, ny, nz] = mask.shape;
        let mut pore_of = vec![usize::MAX; mask.data.len()];
        let mut coords = Vec::with_capacity(mask.count());
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let idx = mask.index(i, j, k);
                    if mask.data[idx] {
                        pore_of[idx] = coords.len();
                        coords.push([
                            (i as f64 + 0.5) * spacing[0],
                            (j as f64 + 0.5) * spacing[1],
                            (k as f64 + 0.5) * spacing[2],
                        ]);
                    }
                }
            }
        }

        let offsets = self.connectivity.forward_offsets();
        let mut conns = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let a = pore_of[mask.index(i, j, k)];
                    if a == usize::MAX {
                        continue;
                    }
                    for off in &offsets {
                        let (Some(ii), Some(jj), Some(kk)) = (
                            i.checked_add_signed(off[0]),
                            j.checked_add_signed(off[1]),
                            k.checked_add_signed(off[2]),
                        ) else {
                            continue;
                        };
                        if ii >= nx || jj >= ny || kk >= nz {
                            continue;
                        }
                        let b = pore_of[mask.index(ii, jj, kk)];
                        if b != usize::MAX {
                            conns.push([a, b]);
                        }
                    }
                }
            }
        }

        let mut net = Network::new(coords, conns)?;
        let all_pores: Vec<usize> = (0..net.np()).collect();
        let all_throats: Vec<usize> = (0..net.nt()).collect();
        net.set_label(Domain::Pore, INTERNAL_LABEL, &all_pores)?;
        net.set_label(Domain::Throat, INTERNAL_LABEL, &all_throats)?;
        label_faces(&mut net, &FaceLabelOptions::default())?;
        net.set_spacing(Some(spacing));
        net.set_shape(Some(mask.shape));
        log::debug!(
            "built {}-connected lattice from {:?} mask: {} pores, {} throats",
            self.connectivity.count(),
            mask.shape,
            net.np(),
            net.nt()
        );
        Ok(net)
    }
}

/// Full cubic lattice of `shape` pores.
pub fn cubic(
    shape: [usize; 3],
    spacing: [f64; 3],
    connectivity: Connectivity,
) -> Result<Network, NetworkError> {
    if shape.contains(&0) {
        return Err(invalid_lattice(format!(
            "lattice shape must be non-zero on every axis, got {shape:?}"
        )));
    }
    CubicTemplate { connectivity }.build_from_mask(&VoxelMask::filled(shape), spacing)
}
