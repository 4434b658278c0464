//! The pore network: coordinates, connections and aligned property arrays.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::property::{PropertyArray, PropertyScalar};
use crate::data::property_store::PropertyStore;
use crate::debug_invariants::DebugInvariants;
use crate::network_error::NetworkError;
use crate::topology::dependent::{DependentId, DependentStore};

/// Which set of rows a property array is aligned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    Pore,
    Throat,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Pore => "pore",
            Domain::Throat => "throat",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spatial graph of pores (nodes with coordinates) and throats (edges).
///
/// Pores and throats are dense `0..Np` / `0..Nt` indices. Every property
/// array stays aligned with these counts across all edits, and each
/// registered [`DependentStore`] is consulted before a count changes.
pub struct Network {
    pub(crate) coords: Vec<[f64; 3]>,
    pub(crate) conns: Vec<[usize; 2]>,
    pub(crate) store: PropertyStore,
    spacing: Option<[f64; 3]>,
    shape: Option<[usize; 3]>,
    pub(crate) dependents: Vec<(DependentId, Box<dyn DependentStore>)>,
    next_dependent: usize,
}

impl Network {
    /// Build a network, rejecting self-loops and out-of-range endpoints.
    pub fn new(coords: Vec<[f64; 3]>, conns: Vec<[usize; 2]>) -> Result<Self, NetworkError> {
        let np = coords.len();
        for &conn in &conns {
            check_conn(conn, np)?;
        }
        let store = PropertyStore::new(np, conns.len());
        Ok(Self {
            coords,
            conns,
            store,
            spacing: None,
            shape: None,
            dependents: Vec::new(),
            next_dependent: 0,
        })
    }

    /// A network with no pores or throats.
    pub fn empty() -> Self {
        Self {
            coords: Vec::new(),
            conns: Vec::new(),
            store: PropertyStore::new(0, 0),
            spacing: None,
            shape: None,
            dependents: Vec::new(),
            next_dependent: 0,
        }
    }

    /// Number of pores.
    pub fn np(&self) -> usize {
        self.coords.len()
    }

    /// Number of throats.
    pub fn nt(&self) -> usize {
        self.conns.len()
    }

    pub fn count(&self, domain: Domain) -> usize {
        match domain {
            Domain::Pore => self.np(),
            Domain::Throat => self.nt(),
        }
    }

    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// Pores may be moved in place; their number is fixed.
    pub fn coords_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.coords
    }

    pub fn conns(&self) -> &[[usize; 2]] {
        &self.conns
    }

    /// Lattice spacing, if the network came from a regular lattice.
    pub fn spacing(&self) -> Option<[f64; 3]> {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: Option<[f64; 3]>) {
        self.spacing = spacing;
    }

    /// Lattice shape, if the network came from a regular lattice.
    pub fn shape(&self) -> Option<[usize; 3]> {
        self.shape
    }

    pub fn set_shape(&mut self, shape: Option<[usize; 3]>) {
        self.shape = shape;
    }

    /// Read-only view of every property array.
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn property(&self, domain: Domain, name: &str) -> Option<&PropertyArray> {
        self.store.get(domain, name)
    }

    /// Insert or replace a property array of length `Np` or `Nt`.
    pub fn set_property(
        &mut self,
        domain: Domain,
        name: &str,
        array: impl Into<PropertyArray>,
    ) -> Result<Option<PropertyArray>, NetworkError> {
        self.store.insert(domain, name, array)
    }

    pub fn remove_property(
        &mut self,
        domain: Domain,
        name: &str,
    ) -> Result<PropertyArray, NetworkError> {
        self.store.remove(domain, name)
    }

    pub fn values<T: PropertyScalar>(&self, domain: Domain, name: &str) -> Result<&[T], NetworkError> {
        self.store.values(domain, name)
    }

    pub fn values_mut<T: PropertyScalar>(
        &mut self,
        domain: Domain,
        name: &str,
    ) -> Result<&mut [T], NetworkError> {
        self.store.values_mut(domain, name)
    }

    pub fn label(&self, domain: Domain, name: &str) -> Result<&[bool], NetworkError> {
        self.store.label(domain, name)
    }

    /// Set `name` on the given indices, creating the label if needed.
    pub fn set_label(
        &mut self,
        domain: Domain,
        name: &str,
        indices: &[usize],
    ) -> Result<(), NetworkError> {
        self.store.set_label(domain, name, indices)
    }

    /// Pores carrying a label.
    pub fn pores(&self, label: &str) -> Result<Vec<usize>, NetworkError> {
        self.store.indices_with(Domain::Pore, label)
    }

    /// Throats carrying a label.
    pub fn throats(&self, label: &str) -> Result<Vec<usize>, NetworkError> {
        self.store.indices_with(Domain::Throat, label)
    }

    /// Register a dependent container.
    pub fn attach(&mut self, dependent: Box<dyn DependentStore>) -> DependentId {
        let id = DependentId(self.next_dependent);
        self.next_dependent += 1;
        log::debug!("attached dependent `{}` as {:?}", dependent.name(), id);
        self.dependents.push((id, dependent));
        id
    }

    /// Unregister a dependent container and hand it back.
    pub fn detach(&mut self, id: DependentId) -> Option<Box<dyn DependentStore>> {
        let pos = self.dependents.iter().position(|(d, _)| *d == id)?;
        Some(self.dependents.remove(pos).1)
    }

    /// Borrow a registered dependent as its concrete type.
    pub fn dependent<T: DependentStore>(&self, id: DependentId) -> Option<&T> {
        self.dependents
            .iter()
            .find(|(d, _)| *d == id)
            .and_then(|(_, dep)| dep.as_any().downcast_ref::<T>())
    }

    pub fn dependent_mut<T: DependentStore>(&mut self, id: DependentId) -> Option<&mut T> {
        self.dependents
            .iter_mut()
            .find(|(d, _)| *d == id)
            .and_then(|(_, dep)| dep.as_any_mut().downcast_mut::<T>())
    }

    pub fn num_dependents(&self) -> usize {
        self.dependents.len()
    }

    pub(crate) fn check_pores(&self, pores: &[usize]) -> Result<(), NetworkError> {
        check_indices(Domain::Pore, pores, self.np())
    }

    pub(crate) fn check_throats(&self, throats: &[usize]) -> Result<(), NetworkError> {
        check_indices(Domain::Throat, throats, self.nt())
    }
}

pub(crate) fn check_conn(conn: [usize; 2], np: usize) -> Result<(), NetworkError> {
    if conn[0] == conn[1] {
        return Err(NetworkError::InvalidEdge {
            conn,
            reason: "throat connects a pore to itself",
        });
    }
    if conn[0] >= np || conn[1] >= np {
        return Err(NetworkError::InvalidEdge {
            conn,
            reason: "throat references a pore that does not exist",
        });
    }
    Ok(())
}

pub(crate) fn check_indices(domain: Domain, indices: &[usize], count: usize) -> Result<(), NetworkError> {
    match indices.iter().find(|&&i| i >= count) {
        Some(&index) => Err(NetworkError::IndexOutOfRange {
            domain,
            index,
            count,
        }),
        None => Ok(()),
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("np", &self.np())
            .field("nt", &self.nt())
            .field("pore_arrays", &self.store.names(Domain::Pore).collect::<Vec<_>>())
            .field("throat_arrays", &self.store.names(Domain::Throat).collect::<Vec<_>>())
            .field("spacing", &self.spacing)
            .field("shape", &self.shape)
            .field("dependents", &self.dependents)
            .finish()
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::empty()
    }
}

impl DebugInvariants for Network {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Network");
    }

    fn validate_invariants(&self) -> Result<(), NetworkError> {
        let np = self.np();
        for &conn in &self.conns {
            check_conn(conn, np)?;
        }
        if self.store.count(Domain::Pore) != np {
            return Err(NetworkError::LengthMismatch {
                domain: Domain::Pore,
                name: "coords".into(),
                expected: self.store.count(Domain::Pore),
                found: np,
            });
        }
        if self.store.count(Domain::Throat) != self.nt() {
            return Err(NetworkError::LengthMismatch {
                domain: Domain::Throat,
                name: "conns".into(),
                expected: self.store.count(Domain::Throat),
                found: self.nt(),
            });
        }
        self.store.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_loops_and_dangling_throats() {
        let coords = vec![[0.0; 3], [1.0, 0.0, 0.0]];
        assert!(matches!(
            Network::new(coords.clone(), vec![[1, 1]]),
            Err(NetworkError::InvalidEdge { conn: [1, 1], .. })
        ));
        assert!(matches!(
            Network::new(coords.clone(), vec![[0, 2]]),
            Err(NetworkError::InvalidEdge { conn: [0, 2], .. })
        ));
        let net = Network::new(coords, vec![[0, 1]]).unwrap();
        assert_eq!((net.np(), net.nt()), (2, 1));
        assert_eq!(net.label(Domain::Throat, "all").unwrap(), &[true]);
        net.validate_invariants().unwrap();
    }

    #[test]
    fn domain_display_and_serde() {
        assert_eq!(Domain::Throat.to_string(), "throat");
        let json = serde_json::to_string(&Domain::Pore).unwrap();
        assert_eq!(serde_json::from_str::<Domain>(&json).unwrap(), Domain::Pore);
    }
}
