//! Vector helpers, bounding boxes and pairwise distances for pore coordinates.

use crate::network_error::NetworkError;
use crate::topology::network::Network;

/// Relative tolerance used when deciding whether an extent is zero.
pub(crate) const EPS: f64 = 1e-12;

#[inline]
pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub(crate) fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub(crate) fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Euclidean distance.
#[inline]
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(a, b))
}

/// Arithmetic mean of a point set, `None` when empty.
pub fn mean(points: &[[f64; 3]]) -> Option<[f64; 3]> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold([0.0; 3], |acc, &p| add(acc, p));
    Some(scale(sum, 1.0 / points.len() as f64))
}

/// Axis-aligned bounding box `(min, max)`, `None` when empty.
pub fn bounding_box(points: &[[f64; 3]]) -> Option<([f64; 3], [f64; 3])> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(mut lo, mut hi), p| {
        for d in 0..3 {
            lo[d] = lo[d].min(p[d]);
            hi[d] = hi[d].max(p[d]);
        }
        (lo, hi)
    }))
}

/// Axes along which the points have non-zero extent.
pub fn active_axes(points: &[[f64; 3]]) -> [bool; 3] {
    let Some((lo, hi)) = bounding_box(points) else {
        return [false; 3];
    };
    let magnitude = (0..3)
        .map(|d| lo[d].abs().max(hi[d].abs()))
        .fold(1.0, f64::max);
    let mut active = [false; 3];
    for d in 0..3 {
        active[d] = hi[d] - lo[d] > EPS * magnitude;
    }
    active
}

/// Which of x, y and z the network extends along.
pub fn dimensionality(net: &Network) -> [bool; 3] {
    active_axes(net.coords())
}

/// Dense `|pores1| x |pores2|` matrix of Euclidean pore-to-pore distances.
pub fn find_pore_to_pore_distance(
    net: &Network,
    pores1: &[usize],
    pores2: &[usize],
) -> Result<Vec<Vec<f64>>, NetworkError> {
    net.check_pores(pores1)?;
    net.check_pores(pores2)?;
    let coords = net.coords();
    Ok(pores1
        .iter()
        .map(|&a| pores2.iter().map(|&b| distance(coords[a], coords[b])).collect())
        .collect())
}
