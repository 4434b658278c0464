//! Topology mutators and network analysis algorithms.
//!
//! Mutators take `&mut Network`, validate everything up front and commit
//! atomically:
//! - [`extend`](extend::extend), [`trim`](extend::trim)
//! - [`connect_pores`](connect::connect_pores), [`clone_pores`](connect::clone_pores),
//!   [`add_boundary_pores`](connect::add_boundary_pores)
//! - [`merge_pores`](merge::merge_pores), [`merge_networks`](merge::merge_networks)
//! - [`subdivide`](subdivide::subdivide)
//! - [`reduce_coordination`](coordination::reduce_coordination)
//!
//! Labeling and analysis:
//! - [`label_faces`](faces::label_faces), [`find_surface_pores`](surface::find_surface_pores)
//! - [`AdjacencyMatrix`](percolation::AdjacencyMatrix) and
//!   [`ispercolating`](percolation::ispercolating)

pub mod connect;
pub mod coordination;
pub mod extend;
pub mod faces;
pub mod merge;
pub mod percolation;
pub mod subdivide;
pub mod surface;
pub(crate) mod union_find;

pub use connect::{CloneMode, DuplicatePolicy, add_boundary_pores, clone_pores, connect_pores};
pub use coordination::{CoordinationOptions, reduce_coordination};
pub use extend::{TrimReport, extend, trim};
pub use faces::{FaceLabelOptions, label_faces};
pub use merge::{MergeReport, merge_networks, merge_pores};
pub use percolation::{
    AdjacencyMatrix, Clusters, PercolationMode, bond_percolation, ispercolating,
    site_percolation,
};
pub use subdivide::{SUBDIVIDED_FROM, subdivide};
pub use surface::{SurfaceOptions, find_surface_pores};
