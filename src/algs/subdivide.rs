//! Replacing a lattice pore by a finer sub-lattice.

use hashbrown::HashSet;

use crate::data::property::PropertyArray;
use crate::geometry::metrics::distance;
use crate::network_error::NetworkError;
use crate::topology::edit::Edit;
use crate::topology::neighbors::other_end;
use crate::topology::network::{Domain, Network};

/// Pore vector property (width 3) holding, for every sub-pore, the position
/// of the lattice pore it replaced. Other rows are NaN.
pub const SUBDIVIDED_FROM: &str = "subdivided_from";

/// Lattice position that pore `p` stands in for: the recorded origin of a
/// sub-pore, or its own coordinate.
pub(crate) fn origin_of(net: &Network, p: usize) -> [f64; 3] {
    match net.property(Domain::Pore, SUBDIVIDED_FROM).and_then(|a| a.row(p)) {
        Some(&[x, y, z]) if x.is_finite() && y.is_finite() && z.is_finite() => [x, y, z],
        _ => net.coords()[p],
    }
}

/// Face bit of sub-pore index `idx` along `axis` (min face `2*axis`, max
/// face `2*axis + 1`). Axes that are not divided have no faces.
fn face_mask(idx: [usize; 3], shape: [usize; 3]) -> u8 {
    let mut mask = 0u8;
    for axis in 0..3 {
        if shape[axis] < 2 {
            continue;
        }
        if idx[axis] == 0 {
            mask |= 1 << (2 * axis);
        }
        if idx[axis] == shape[axis] - 1 {
            mask |= 1 << (2 * axis + 1);
        }
    }
    mask
}

/// Replace `pore` with a regular 6-connected sub-lattice of `shape` pores
/// filling its lattice cell.
///
/// Each former neighbor is connected to every sub-pore on the face of the
/// cell that faces it. The original pore and its throats are removed; new
/// pores and throats carry `label`, and the replaced position is recorded
/// under [`SUBDIVIDED_FROM`] so that [`merge_pores`](crate::algs::merge_pores)
/// places a merged group as if the pore had never been split. Returns the new
/// pore indices.
pub fn subdivide(
    net: &mut Network,
    pore: usize,
    shape: [usize; 3],
    label: &str,
) -> Result<Vec<usize>, NetworkError> {
    let spacing = net
        .spacing()
        .ok_or_else(|| NetworkError::invalid("subdivide requires a lattice spacing"))?;
    if shape.contains(&0) {
        return Err(NetworkError::invalid(format!(
            "sub-lattice shape must be non-zero on every axis, got {shape:?}"
        )));
    }
    net.check_pores(&[pore])?;

    let np = net.np();
    let center = net.coords()[pore];
    let origin = origin_of(net, pore);
    let [nx, ny, nz] = shape;
    let flat = |i: usize, j: usize, k: usize| (i * ny + j) * nz + k;

    let mut coords = Vec::with_capacity(nx * ny * nz);
    let mut masks = Vec::with_capacity(nx * ny * nz);
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let idx = [i, j, k];
                let mut c = [0.0; 3];
                for d in 0..3 {
                    let step = spacing[d] / shape[d] as f64;
                    c[d] = center[d] - spacing[d] / 2.0 + (idx[d] as f64 + 0.5) * step;
                }
                coords.push(c);
                masks.push(face_mask(idx, shape));
            }
        }
    }

    let mut conns = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let a = np + flat(i, j, k);
                if i + 1 < nx {
                    conns.push([a, np + flat(i + 1, j, k)]);
                }
                if j + 1 < ny {
                    conns.push([a, np + flat(i, j + 1, k)]);
                }
                if k + 1 < nz {
                    conns.push([a, np + flat(i, j, k + 1)]);
                }
            }
        }
    }

    let tol = 1e-9 * spacing.iter().fold(0.0, |m: f64, &s| m.max(s.abs()));
    let mut neighbors: Vec<usize> = Vec::new();
    let mut seen = HashSet::new();
    for &t in net.incidence().throats_of(pore) {
        let q = other_end(net.conns()[t], pore);
        if seen.insert(q) {
            neighbors.push(q);
        }
    }
    for q in neighbors {
        let qc = net.coords()[q];
        let dist: Vec<f64> = coords.iter().map(|&c| distance(c, qc)).collect();
        let closest = dist.iter().copied().fold(f64::INFINITY, f64::min);
        let nearest: Vec<usize> = (0..coords.len())
            .filter(|&s| dist[s] <= closest + tol)
            .collect();
        for s in facing_nodes(&masks, &nearest) {
            conns.push([q, np + s]);
        }
    }

    let out = net.apply(Edit {
        new_coords: coords,
        new_conns: conns,
        pore_labels: vec![label.to_string()],
        throat_labels: vec![label.to_string()],
        drop_pores: vec![pore],
        ..Edit::default()
    })?;
    let mut origins = match net.property(Domain::Pore, SUBDIVIDED_FROM) {
        Some(PropertyArray::Vector { width: 3, data }) => data.clone(),
        _ => vec![f64::NAN; 3 * net.np()],
    };
    for &p in &out.new_pores {
        origins[3 * p..3 * p + 3].copy_from_slice(&origin);
    }
    net.set_property(
        Domain::Pore,
        SUBDIVIDED_FROM,
        PropertyArray::Vector {
            width: 3,
            data: origins,
        },
    )?;
    log::debug!(
        "subdivided pore {pore} into {:?}: {} new pores, {} new throats",
        shape,
        out.new_pores.len(),
        out.new_throats.len()
    );
    Ok(out.new_pores)
}

/// Sub-pores on the face (or edge, or corner) shared by the nearest ones.
fn facing_nodes(masks: &[u8], nearest: &[usize]) -> Vec<usize> {
    let union = nearest.iter().fold(0u8, |m, &s| m | masks[s]);
    let common = nearest.iter().fold(u8::MAX, |m, &s| m & masks[s]);
    if union != 0 {
        let on_face: Vec<usize> = (0..masks.len())
            .filter(|&s| masks[s] & union == union)
            .collect();
        if !on_face.is_empty() {
            return on_face;
        }
    }
    if common != 0 && common != u8::MAX {
        let sharing: Vec<usize> = (0..masks.len()).filter(|&s| masks[s] & common != 0).collect();
        if !sharing.is_empty() {
            return sharing;
        }
    }
    nearest.to_vec()
}
