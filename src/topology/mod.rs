//! Network topology: the [`Network`] type and the machinery that keeps its
//! arrays aligned.
//!
//! This module provides:
//! - `Network` with its coordinates, connections and property store
//! - atomic edits and the [`IndexMap`] they report
//! - the dependent-container contract ([`DependentStore`])
//! - neighbor queries and the network health report

pub mod dependent;
pub mod edit;
pub mod health;
pub mod neighbors;
pub mod network;

pub use dependent::{DependentId, DependentStore, GeometryStore, PhaseStore};
pub use edit::{EditOutcome, IndexMap, reindex_edges};
pub use health::{HealthReport, check_network_health};
pub use neighbors::{
    SetMode, find_connecting_throat, find_neighbor_pores, find_neighbor_throats, num_neighbors,
};
pub use network::{Domain, Network};

#[cfg(test)]
mod tests;
