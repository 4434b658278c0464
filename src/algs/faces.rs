//! Bounding-box face labels.
//!
//! Pores within `tol` of the minimum or maximum of an axis get that face's
//! label; the union of all faces becomes the surface label.

use serde::{Deserialize, Serialize};

use crate::data::property::PropertyArray;
use crate::data::property_store::RESERVED_NAMES;
use crate::geometry::metrics::{active_axes, bounding_box};
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network};

/// Face label for the minimum-x side.
pub const FACE_FRONT: &str = "front";
/// Face label for the maximum-x side.
pub const FACE_BACK: &str = "back";
/// Face label for the minimum-y side.
pub const FACE_LEFT: &str = "left";
/// Face label for the maximum-y side.
pub const FACE_RIGHT: &str = "right";
/// Face label for the minimum-z side.
pub const FACE_BOTTOM: &str = "bottom";
/// Face label for the maximum-z side.
pub const FACE_TOP: &str = "top";

/// `[min, max]` face names per axis.
pub const FACE_LABELS: [[&str; 2]; 3] = [
    [FACE_FRONT, FACE_BACK],
    [FACE_LEFT, FACE_RIGHT],
    [FACE_BOTTOM, FACE_TOP],
];

/// Options for [`label_faces`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceLabelOptions {
    /// Absolute distance from the bounding box within which a pore is on a face.
    pub tol: f64,
    /// Name of the union label.
    pub surface_label: String,
}

impl Default for FaceLabelOptions {
    fn default() -> Self {
        Self {
            tol: 0.0,
            surface_label: "surface".to_string(),
        }
    }
}

/// Label the six bounding-box faces and their union; returns the surface pores.
///
/// Axes with zero extent, or where a face would contain every pore, get no
/// face labels and any existing ones are removed.
pub fn label_faces(net: &mut Network, options: &FaceLabelOptions) -> Result<Vec<usize>, NetworkError> {
    if !(options.tol >= 0.0) {
        return Err(NetworkError::invalid(format!(
            "face tolerance must be non-negative, got {}",
            options.tol
        )));
    }
    if RESERVED_NAMES.contains(&options.surface_label.as_str()) {
        return Err(NetworkError::ReservedName(options.surface_label.clone()));
    }
    let np = net.np();
    let active = active_axes(net.coords());
    let (lo, hi) = bounding_box(net.coords()).unwrap_or(([0.0; 3], [0.0; 3]));

    let mut faces: Vec<(&str, Option<Vec<bool>>)> = Vec::with_capacity(6);
    for axis in 0..3 {
        let bounds = [lo[axis], hi[axis]];
        for (side, &name) in FACE_LABELS[axis].iter().enumerate() {
            let mask: Vec<bool> = net
                .coords()
                .iter()
                .map(|c| (c[axis] - bounds[side]).abs() <= options.tol)
                .collect();
            let usable = active[axis] && !mask.iter().all(|&b| b);
            faces.push((name, usable.then_some(mask)));
        }
    }

    let mut surface = vec![false; np];
    for (name, mask) in faces {
        match mask {
            Some(mask) => {
                for (s, &m) in surface.iter_mut().zip(&mask) {
                    *s |= m;
                }
                net.set_property(Domain::Pore, name, PropertyArray::Bool(mask))?;
            }
            None => {
                if net.property(Domain::Pore, name).is_some() {
                    log::debug!("removing stale face label `{name}`");
                    net.remove_property(Domain::Pore, name)?;
                }
            }
        }
    }
    let pores: Vec<usize> = (0..np).filter(|&p| surface[p]).collect();
    net.set_property(Domain::Pore, &options.surface_label, PropertyArray::Bool(surface))?;
    log::debug!("labeled {} of {np} pores as `{}`", pores.len(), options.surface_label);
    Ok(pores)
}
