use pore_topo::NetworkError;
use pore_topo::algs::{
    AdjacencyMatrix, FaceLabelOptions, PercolationMode, SurfaceOptions, find_surface_pores,
    ispercolating, label_faces,
};
use pore_topo::geometry::{find_pore_to_pore_distance, iscoplanar};
use pore_topo::network_generation::{Connectivity, CubicTemplate, TemplateBuilder, VoxelMask, cubic};
use pore_topo::topology::{Domain, Network};

fn lattice(shape: [usize; 3]) -> Network {
    cubic(shape, [1.0; 3], Connectivity::Six).expect("lattice")
}

/// Voxels with squared distance at most 9 from the center of a 7^3 grid.
fn ball() -> Network {
    let mut data = Vec::new();
    for i in 0..7i64 {
        for j in 0..7i64 {
            for k in 0..7i64 {
                data.push((i - 3).pow(2) + (j - 3).pow(2) + (k - 3).pow(2) <= 9);
            }
        }
    }
    let mask = VoxelMask::new([7; 3], data).expect("mask");
    CubicTemplate::default().build_from_mask(&mask, [1.0; 3]).expect("ball")
}

#[test]
fn faces_of_a_small_cube() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = lattice([3, 3, 3]);
    let surface = label_faces(&mut net, &FaceLabelOptions::default())?;
    assert_eq!(surface.len(), 26);
    for face in ["front", "back", "left", "right", "bottom", "top"] {
        assert_eq!(net.pores(face)?.len(), 9, "{face}");
    }
    assert!(!net.label(Domain::Pore, "surface")?[13]);

    // shifted and jittered coordinates still land on the faces
    for c in net.coords_mut() {
        for x in c.iter_mut() {
            *x += 5.0;
        }
    }
    net.coords_mut()[0][0] += 0.1;
    let options = FaceLabelOptions {
        tol: 0.2,
        ..FaceLabelOptions::default()
    };
    assert_eq!(label_faces(&mut net, &options)?.len(), 26);
    assert_eq!(net.pores("front")?.len(), 9);
    Ok(())
}

#[test]
fn flat_lattice_has_no_z_faces() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = lattice([4, 4, 1]);
    assert!(net.property(Domain::Pore, "top").is_none());
    assert!(net.property(Domain::Pore, "bottom").is_none());
    assert_eq!(net.pores("surface")?.len(), 12);
    Ok(())
}

#[test]
fn surface_of_a_voxel_ball() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = ball();
    assert_eq!(net.np(), 123);
    let surface = find_surface_pores(&mut net, None, &SurfaceOptions::default())?;
    assert_eq!(surface.len(), 90);
    assert!(!surface.contains(&(net.np() / 2)));
    Ok(())
}

#[test]
fn surface_markers_in_two_and_three_dimensions() -> Result<(), Box<dyn std::error::Error>> {
    let markers_2d = vec![vec![-1.0, 2.0], vec![2.0, -1.0], vec![2.0, 5.0], vec![5.0, 2.0]];
    let mut flat = lattice([4, 4, 1]);
    let found = find_surface_pores(&mut flat, Some(&markers_2d), &SurfaceOptions::default())?;
    assert_eq!(found.len(), 12);

    for bad in [vec![vec![-1.0]], vec![vec![-1.0, 2.0, 2.0]]] {
        assert!(matches!(
            find_surface_pores(&mut flat, Some(&bad), &SurfaceOptions::default()),
            Err(NetworkError::DimensionMismatch { expected: 2, .. })
        ));
    }

    let markers_3d = vec![
        vec![-1.0, 2.0, 2.0],
        vec![2.0, -1.0, 2.0],
        vec![2.0, 5.0, 2.0],
        vec![5.0, 2.0, 2.0],
    ];
    let mut cube = lattice([4, 4, 4]);
    let found = find_surface_pores(&mut cube, Some(&markers_3d), &SurfaceOptions::default())?;
    assert_eq!(found.len(), 48);
    // no marker looks along z, so the middle of the top face is hidden
    let top_center = (1 * 4 + 1) * 4 + 3;
    assert!(!found.contains(&top_center));
    Ok(())
}

#[test]
fn coplanarity() -> Result<(), Box<dyn std::error::Error>> {
    let net = lattice([3, 3, 3]);
    let top = net.pores("top")?;
    let pts: Vec<[f64; 3]> = top.iter().map(|&p| net.coords()[p]).collect();
    assert!(iscoplanar(&pts)?);

    let mut skew = pts.clone();
    skew.push([0.5, 0.5, 0.5]);
    assert!(!iscoplanar(&skew)?);

    // collinear points lie in infinitely many planes
    assert!(iscoplanar(&[[0.0; 3], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]])?);
    assert!(iscoplanar(&pts[..2]).is_err());
    Ok(())
}

#[test]
fn distances_between_opposite_faces() -> Result<(), Box<dyn std::error::Error>> {
    let net = lattice([3, 3, 3]);
    let left = net.pores("left")?;
    let right = net.pores("right")?;
    let d = find_pore_to_pore_distance(&net, &left, &right)?;
    assert_eq!(d.len(), 9);
    assert!(d.iter().all(|row| row.len() == 9));

    let mut unique: Vec<f64> = d.into_iter().flatten().collect();
    unique.sort_by(f64::total_cmp);
    unique.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    let expected = [4.0f64, 5.0, 6.0, 8.0, 9.0, 12.0].map(f64::sqrt);
    assert_eq!(unique.len(), expected.len());
    for (u, e) in unique.iter().zip(&expected) {
        assert!((u - e).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn percolation_across_a_lattice() -> Result<(), Box<dyn std::error::Error>> {
    let net = lattice([4, 4, 4]);
    let inlets = net.pores("front")?;
    let outlets = net.pores("back")?;

    let open = AdjacencyMatrix::from_mask(&net, &vec![true; net.nt()])?;
    assert_eq!(open.n(), 64);
    assert_eq!(open.nnz(), 2 * net.nt());
    assert!(ispercolating(&open, PercolationMode::Bond, &inlets, &outlets)?);

    // close every throat along x between the first and second layer
    let blocked: Vec<bool> = net
        .conns()
        .iter()
        .map(|&[a, b]| {
            let (xa, xb) = (net.coords()[a][0], net.coords()[b][0]);
            !(xa.min(xb) < 1.0 && xa.max(xb) > 1.0)
        })
        .collect();
    let cut = AdjacencyMatrix::from_mask(&net, &blocked)?;
    assert!(!ispercolating(&cut, PercolationMode::Bond, &inlets, &outlets)?);
    // both layers stay occupied, so the cut throats still join sites
    assert!(ispercolating(&cut, PercolationMode::Site, &inlets, &outlets)?);
    Ok(())
}
