//! # pore-topo
//!
//! pore-topo edits and analyzes spatial pore networks: pores with 3-D
//! coordinates joined by throats, each carrying named per-pore and
//! per-throat properties and labels that always stay aligned with the
//! topology.
//!
//! ## Features
//! - A [`Network`](topology::Network) with a typed, length-checked property store
//! - Atomic topology mutators (extend, trim, connect, clone, merge, subdivide,
//!   coordination reduction, boundary pores) that keep every aligned array
//!   and every attached dependent container consistent
//! - Face and surface labeling, coplanarity and pore-to-pore distances
//! - Weighted adjacency matrices with bond and site percolation tests
//! - Voxel templates (sphere shells, cylinder annuli) and cubic lattices
//!
//! ## Determinism
//!
//! All randomized decisions use `SmallRng` seeds drawn from option structs
//! (see [`CoordinationOptions`](algs::CoordinationOptions)) so runs are
//! reproducible. Unit tests fix seeds explicitly.
//!
//! ## Invariant checking
//!
//! Debug builds, and builds with the `check-invariants` or `strict-invariants`
//! feature, re-validate the network after every committed edit and panic on
//! a violation.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod network_error;
pub mod network_generation;
pub mod shared;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use network_error::NetworkError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::{
        AdjacencyMatrix, CloneMode, CoordinationOptions, DuplicatePolicy, FaceLabelOptions,
        PercolationMode, SurfaceOptions, add_boundary_pores, clone_pores, connect_pores, extend,
        find_surface_pores, ispercolating, label_faces, merge_networks, merge_pores,
        reduce_coordination, subdivide, trim,
    };
    pub use crate::data::{PropertyArray, PropertyKind, PropertyScalar, PropertyStore};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{find_pore_to_pore_distance, iscoplanar};
    pub use crate::network_error::NetworkError;
    pub use crate::network_generation::{
        Connectivity, TemplateBuilder, VoxelMask, cubic, template_cylinder_annulus,
        template_sphere_shell,
    };
    pub use crate::shared::SharedNetwork;
    pub use crate::topology::{
        DependentStore, Domain, GeometryStore, Network, PhaseStore, SetMode,
        check_network_health, find_neighbor_pores, find_neighbor_throats,
    };
}
