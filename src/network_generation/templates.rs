//! Voxel templates for spherical shells and cylindrical annuli.
//!
//! Both grids have odd side `2 * outer - 1` with the middle voxel as center.
//! A voxel at squared distance `d2` from the center is kept when
//! `d2 < outer^2` and, for a non-zero inner radius, `d2 > inner^2`.

use crate::network_error::NetworkError;
use crate::network_generation::VoxelMask;

fn check_radii(outer: usize, inner: usize) -> Result<(), NetworkError> {
    if outer == 0 {
        return Err(NetworkError::invalid("outer radius must be positive"));
    }
    if inner >= outer {
        return Err(NetworkError::invalid(format!(
            "inner radius {inner} must be smaller than outer radius {outer}"
        )));
    }
    Ok(())
}

#[inline]
fn in_shell(d2: usize, outer: usize, inner: usize) -> bool {
    d2 < outer * outer && (inner == 0 || d2 > inner * inner)
}

/// Spherical shell of voxels.
pub fn template_sphere_shell(outer_radius: usize, inner_radius: usize) -> Result<VoxelMask, NetworkError> {
    check_radii(outer_radius, inner_radius)?;
    let side = 2 * outer_radius - 1;
    let c = outer_radius - 1;
    let mut data = Vec::with_capacity(side * side * side);
    for i in 0..side {
        for j in 0..side {
            for k in 0..side {
                let d2 = i.abs_diff(c).pow(2) + j.abs_diff(c).pow(2) + k.abs_diff(c).pow(2);
                data.push(in_shell(d2, outer_radius, inner_radius));
            }
        }
    }
    VoxelMask::new([side; 3], data)
}

/// Annulus in the x/y plane stacked `height` voxels along z.
pub fn template_cylinder_annulus(
    height: usize,
    outer_radius: usize,
    inner_radius: usize,
) -> Result<VoxelMask, NetworkError> {
    if height == 0 {
        return Err(NetworkError::invalid("cylinder height must be positive"));
    }
    check_radii(outer_radius, inner_radius)?;
    let side = 2 * outer_radius - 1;
    let c = outer_radius - 1;
    let mut data = Vec::with_capacity(side * side * height);
    for i in 0..side {
        for j in 0..side {
            let keep = in_shell(
                i.abs_diff(c).pow(2) + j.abs_diff(c).pow(2),
                outer_radius,
                inner_radius,
            );
            data.extend(std::iter::repeat_n(keep, height));
        }
    }
    VoxelMask::new([side, side, height], data)
}
