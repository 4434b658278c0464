//! Geometric helpers for pore networks.
//!
//! This module provides distance and bounding-box metrics for pore
//! coordinates, plus rank, coplanarity and convex-hull utilities used when
//! pores are merged.

pub mod hull;
pub mod metrics;

pub use hull::{centered_rank, hull_centroid, hull_vertices, iscoplanar};
pub use metrics::{bounding_box, dimensionality, distance, find_pore_to_pore_distance};
