//! Rank, coplanarity and convex-hull extreme points of point sets.
//!
//! The hull routines return the *extreme* vertices only: points lying inside
//! the hull, on a facet interior, or on an edge between two vertices are
//! never reported. Works in 0 to 3 dimensions, choosing the branch from the
//! rank of the centered point matrix.

use std::cmp::Ordering;

use hashbrown::HashSet;

use crate::geometry::metrics::{EPS, add, bounding_box, cross, dot, mean, norm, scale, sub};
use crate::network_error::NetworkError;

/// Tolerance scaled to the size of the point set.
fn tolerance(points: &[[f64; 3]]) -> f64 {
    match bounding_box(points) {
        Some((lo, hi)) => {
            let extent = (0..3).map(|d| hi[d] - lo[d]).fold(0.0, f64::max);
            let magnitude = (0..3)
                .map(|d| lo[d].abs().max(hi[d].abs()))
                .fold(extent, f64::max);
            1e-9 * magnitude.max(EPS)
        }
        None => EPS,
    }
}

/// Rank (0 to 3) of the matrix whose rows are `points - mean(points)`.
pub fn centered_rank(points: &[[f64; 3]]) -> usize {
    let Some(center) = mean(points) else {
        return 0;
    };
    let tol = tolerance(points);
    let mut rows: Vec<[f64; 3]> = points.iter().map(|&p| sub(p, center)).collect();
    let mut rank = 0;
    for col in 0..3 {
        let pivot = (rank..rows.len()).max_by(|&a, &b| {
            rows[a][col]
                .abs()
                .partial_cmp(&rows[b][col].abs())
                .unwrap_or(Ordering::Equal)
        });
        let Some(pivot) = pivot else { break };
        if rows[pivot][col].abs() <= tol {
            continue;
        }
        rows.swap(rank, pivot);
        let lead = rows[rank];
        for r in rank + 1..rows.len() {
            let f = rows[r][col] / lead[col];
            for c in col..3 {
                rows[r][c] -= f * lead[c];
            }
        }
        rank += 1;
    }
    rank
}

/// True when all points lie on one plane.
///
/// Repeated and collinear points are allowed; fewer than three points is an
/// error.
pub fn iscoplanar(points: &[[f64; 3]]) -> Result<bool, NetworkError> {
    if points.len() < 3 {
        return Err(NetworkError::invalid(format!(
            "coplanarity needs at least 3 points, got {}",
            points.len()
        )));
    }
    Ok(centered_rank(points) <= 2)
}

/// Indices of the extreme vertices of the convex hull, ascending.
pub fn hull_vertices(points: &[[f64; 3]]) -> Vec<usize> {
    let all: Vec<usize> = (0..points.len()).collect();
    let mut out = match centered_rank(points) {
        _ if points.is_empty() => Vec::new(),
        0 => vec![0],
        1 => line_extremes(points, &all),
        2 => planar_hull(points, &all),
        _ => solid_hull(points),
    };
    out.sort_unstable();
    out.dedup();
    out
}

/// Mean of the extreme hull vertices.
pub fn hull_centroid(points: &[[f64; 3]]) -> Option<[f64; 3]> {
    let verts: Vec<[f64; 3]> = hull_vertices(points).into_iter().map(|i| points[i]).collect();
    mean(&verts)
}

fn line_extremes(points: &[[f64; 3]], subset: &[usize]) -> Vec<usize> {
    let origin = points[subset[0]];
    let far = subset
        .iter()
        .copied()
        .max_by(|&a, &b| cmp_f64(norm(sub(points[a], origin)), norm(sub(points[b], origin))))
        .unwrap_or(subset[0]);
    let dir = sub(points[far], origin);
    let t = |i: usize| dot(sub(points[i], origin), dir);
    let lo = subset.iter().copied().min_by(|&a, &b| cmp_f64(t(a), t(b)));
    let hi = subset.iter().copied().max_by(|&a, &b| cmp_f64(t(a), t(b)));
    lo.into_iter().chain(hi).collect()
}

/// 2-D hull of coplanar points, by projection onto the plane.
fn planar_hull(points: &[[f64; 3]], subset: &[usize]) -> Vec<usize> {
    let sub_pts: Vec<[f64; 3]> = subset.iter().map(|&i| points[i]).collect();
    let Some(center) = mean(&sub_pts) else {
        return Vec::new();
    };
    let far = subset
        .iter()
        .copied()
        .max_by(|&a, &b| cmp_f64(norm(sub(points[a], center)), norm(sub(points[b], center))))
        .unwrap_or(subset[0]);
    let u = sub(points[far], center);
    let normal = subset
        .iter()
        .map(|&i| cross(u, sub(points[i], center)))
        .max_by(|a, b| cmp_f64(norm(*a), norm(*b)))
        .unwrap_or([0.0; 3]);
    if norm(normal) <= EPS * norm(u).max(EPS) {
        return line_extremes(points, subset);
    }
    let u = scale(u, 1.0 / norm(u));
    let n = scale(normal, 1.0 / norm(normal));
    let v = cross(n, u);
    let projected: Vec<(f64, f64, usize)> = subset
        .iter()
        .map(|&i| {
            let d = sub(points[i], center);
            (dot(d, u), dot(d, v), i)
        })
        .collect();
    monotone_chain(projected, tolerance(&sub_pts))
}

/// Andrew's monotone chain on projected points, dropping collinear ones.
fn monotone_chain(mut pts: Vec<(f64, f64, usize)>, tol: f64) -> Vec<usize> {
    pts.sort_by(|a, b| cmp_f64(a.0, b.0).then(cmp_f64(a.1, b.1)));
    pts.dedup_by(|a, b| (a.0 - b.0).abs() <= tol && (a.1 - b.1).abs() <= tol);
    if pts.len() < 3 {
        return pts.into_iter().map(|p| p.2).collect();
    }
    let turn = |o: (f64, f64, usize), a: (f64, f64, usize), b: (f64, f64, usize)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };
    let area_tol = tol * tol.max(1.0);
    let mut lower: Vec<(f64, f64, usize)> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && turn(lower[lower.len() - 2], lower[lower.len() - 1], p) <= area_tol {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(f64, f64, usize)> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && turn(upper[upper.len() - 2], upper[upper.len() - 1], p) <= area_tol {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.into_iter().chain(upper).map(|p| p.2).collect()
}

/// Oriented hull triangle; `normal` is a unit vector pointing away from the
/// interior.
struct Facet {
    v: [usize; 3],
    normal: [f64; 3],
    offset: f64,
}

impl Facet {
    fn new(points: &[[f64; 3]], v: [usize; 3], interior: [f64; 3]) -> Option<Self> {
        let [a, b, c] = v.map(|i| points[i]);
        let (ab, ac) = (sub(b, a), sub(c, a));
        let normal = cross(ab, ac);
        let len = norm(normal);
        if len <= EPS * norm(ab) * norm(ac) || len == 0.0 {
            return None;
        }
        let normal = scale(normal, 1.0 / len);
        let facet = Facet {
            v,
            normal,
            offset: dot(normal, a),
        };
        if facet.height(interior) > 0.0 {
            Some(Facet {
                v: [v[0], v[2], v[1]],
                normal: scale(normal, -1.0),
                offset: -facet.offset,
            })
        } else {
            Some(facet)
        }
    }

    fn height(&self, p: [f64; 3]) -> f64 {
        dot(self.normal, p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// Full-rank case: incremental hull with farthest-first insertion, so most
/// interior points are rejected against a hull of a few facets. Vertices left
/// on a facet or edge by the triangulation are removed afterwards by taking
/// the 2-D hull of every distinct facet plane.
fn solid_hull(points: &[[f64; 3]]) -> Vec<usize> {
    let all: Vec<usize> = (0..points.len()).collect();
    let Some(center) = mean(points) else {
        return Vec::new();
    };
    let tol = tolerance(points);
    let mut order = all.clone();
    order.sort_by(|&a, &b| {
        cmp_f64(norm(sub(points[b], center)), norm(sub(points[a], center))).then(a.cmp(&b))
    });

    let a = order[0];
    let farthest = |key: &dyn Fn(usize) -> f64| {
        order
            .iter()
            .copied()
            .max_by(|&x, &y| cmp_f64(key(x), key(y)).then(y.cmp(&x)))
            .unwrap_or(a)
    };
    let b = farthest(&|i| norm(sub(points[i], points[a])));
    let ab = sub(points[b], points[a]);
    let c = farthest(&|i| norm(cross(ab, sub(points[i], points[a]))));
    let n = cross(ab, sub(points[c], points[a]));
    let d = farthest(&|i| dot(n, sub(points[i], points[a])).abs());
    let seed = [a, b, c, d];
    let interior = scale(
        seed.iter().fold([0.0; 3], |acc, &i| add(acc, points[i])),
        0.25,
    );
    let mut facets: Vec<Facet> = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
        .into_iter()
        .filter_map(|v| Facet::new(points, v, interior))
        .collect();
    if facets.len() < 4 || facets.iter().any(|f| f.height(interior) > -tol) {
        return planar_hull(points, &all);
    }

    for &p in &order {
        if seed.contains(&p) {
            continue;
        }
        let (visible, kept): (Vec<Facet>, Vec<Facet>) =
            facets.into_iter().partition(|f| f.height(points[p]) > tol);
        facets = kept;
        if visible.is_empty() {
            continue;
        }
        let edges: HashSet<(usize, usize)> = visible.iter().flat_map(Facet::edges).collect();
        for &(u, w) in &edges {
            if edges.contains(&(w, u)) {
                continue;
            }
            if let Some(f) = Facet::new(points, [u, w, p], interior) {
                facets.push(f);
            }
        }
    }

    let mut verts: Vec<usize> = facets.iter().flat_map(|f| f.v).collect();
    verts.sort_unstable();
    verts.dedup();
    let mut is_vertex = vec![false; points.len()];
    let mut planes: HashSet<Vec<usize>> = HashSet::new();
    for f in &facets {
        let on_plane: Vec<usize> = verts
            .iter()
            .copied()
            .filter(|&v| f.height(points[v]).abs() <= tol)
            .collect();
        if !planes.insert(on_plane.clone()) {
            continue;
        }
        for v in planar_hull(points, &on_plane) {
            is_vertex[v] = true;
        }
    }
    (0..points.len()).filter(|&i| is_vertex[i]).collect()
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_grid(n: usize) -> Vec<[f64; 3]> {
        let mut pts = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    pts.push([i as f64, j as f64, k as f64]);
                }
            }
        }
        pts
    }

    #[test]
    fn coplanar_detection() {
        let square = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        assert!(iscoplanar(&square).unwrap());
        let tet = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(!iscoplanar(&tet).unwrap());
        let repeated = [[1.0, 1.0, 1.0]; 5];
        assert!(iscoplanar(&repeated).unwrap());
        let collinear = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0], [5.0, 5.0, 5.0]];
        assert!(iscoplanar(&collinear).unwrap());
        assert!(iscoplanar(&square[..2]).is_err());
    }

    #[test]
    fn tilted_plane_is_coplanar() {
        let pts = [
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [2.0, 1.0, 0.0],
            [3.0, 2.0, 1.0],
            [4.0, 2.0, 0.0],
        ];
        assert!(iscoplanar(&pts).unwrap());
    }

    #[test]
    fn collinear_hull_is_endpoints() {
        let pts = [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        assert_eq!(hull_vertices(&pts), vec![1, 2]);
        assert_eq!(hull_centroid(&pts), Some([1.5, 0.0, 0.0]));
    }

    #[test]
    fn square_ignores_edge_and_interior_points() {
        let pts = [
            [0.0, 0.0, 4.0],
            [2.0, 0.0, 4.0],
            [2.0, 2.0, 4.0],
            [0.0, 2.0, 4.0],
            [1.0, 0.0, 4.0],
            [1.0, 1.0, 4.0],
            [0.5, 0.25, 4.0],
        ];
        assert_eq!(hull_vertices(&pts), vec![0, 1, 2, 3]);
        assert_eq!(hull_centroid(&pts), Some([1.0, 1.0, 4.0]));
    }

    #[test]
    fn cube_grid_hull_is_corners() {
        let pts = cube_grid(3);
        let verts = hull_vertices(&pts);
        assert_eq!(verts.len(), 8);
        assert_eq!(hull_centroid(&pts), Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn large_grid_hull_is_corners() {
        let n = 12;
        let pts = cube_grid(n);
        let edge = (n - 1) as f64;
        let corners: Vec<usize> = (0..pts.len())
            .filter(|&i| pts[i].iter().all(|&x| x == 0.0 || x == edge))
            .collect();
        assert_eq!(corners.len(), 8);
        assert_eq!(hull_vertices(&pts), corners);
        assert_eq!(hull_centroid(&pts), Some([5.5, 5.5, 5.5]));
    }

    #[test]
    fn octahedron_drops_edge_face_and_interior_points() {
        let third = 1.0 / 3.0;
        let pts = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
            [0.5, 0.5, 0.0],
            [third, third, third],
            [0.1, -0.2, 0.3],
        ];
        assert_eq!(hull_vertices(&pts), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(hull_centroid(&pts), Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn skewed_cloud_centroid_differs_from_mean() {
        let mut pts = vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        pts.extend([[0.5, 0.5, 0.5], [0.4, 0.6, 0.5], [0.5, 0.3, 0.2]]);
        assert_eq!(hull_vertices(&pts), vec![0, 1, 2, 3]);
        assert_eq!(hull_centroid(&pts), Some([1.0, 1.0, 1.0]));
    }
}
