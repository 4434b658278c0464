//! Containers whose rows must follow the network's pore and throat counts.
//!
//! A dependent is asked, through [`DependentStore::on_resize`], whether it
//! can follow every count change of an edit before anything is committed. If
//! every dependent agrees the edit is committed and shrinking edits are then
//! replayed through [`DependentStore::on_rebuild`].
//!
//! Two stores are provided:
//! - [`GeometryStore`] owns a subset of pores/throats. Growth does not concern
//!   it; trims remap (and drop) its indices.
//! - [`PhaseStore`] holds one row per pore and throat. It cannot invent values
//!   for new rows, so it rejects growth; trims compact it.

use std::any::Any;
use std::fmt;

use crate::data::property::{PropertyArray, PropertyScalar};
use crate::data::property_store::PropertyStore;
use crate::network_error::NetworkError;
use crate::topology::edit::IndexMap;
use crate::topology::network::{Domain, Network, check_indices};

/// Handle returned by [`Network::attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DependentId(pub(crate) usize);

/// Resize/rebuild contract for containers bound to a network.
pub trait DependentStore: Any + Send + fmt::Debug {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Validate a count change of `domain` from `old_count` to `new_count`.
    ///
    /// Must not mutate; returning an error aborts the whole edit.
    fn on_resize(&self, domain: Domain, old_count: usize, new_count: usize)
    -> Result<(), NetworkError>;

    /// Apply a committed shrinking edit.
    fn on_rebuild(&mut self, domain: Domain, map: &IndexMap);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Subset container: properties for a chosen set of pores and throats.
#[derive(Clone, Debug)]
pub struct GeometryStore {
    name: String,
    pores: Vec<usize>,
    throats: Vec<usize>,
    props: PropertyStore,
}

impl GeometryStore {
    /// Bind to `pores` and `throats` of `net`.
    pub fn new(
        name: &str,
        net: &Network,
        pores: Vec<usize>,
        throats: Vec<usize>,
    ) -> Result<Self, NetworkError> {
        check_indices(Domain::Pore, &pores, net.np())?;
        check_indices(Domain::Throat, &throats, net.nt())?;
        let props = PropertyStore::new(pores.len(), throats.len());
        Ok(Self {
            name: name.to_string(),
            pores,
            throats,
            props,
        })
    }

    /// Network pore indices owned by this store, row order.
    pub fn pores(&self) -> &[usize] {
        &self.pores
    }

    pub fn throats(&self) -> &[usize] {
        &self.throats
    }

    pub fn set_property(
        &mut self,
        domain: Domain,
        name: &str,
        array: impl Into<PropertyArray>,
    ) -> Result<Option<PropertyArray>, NetworkError> {
        self.props.insert(domain, name, array)
    }

    pub fn values<T: PropertyScalar>(&self, domain: Domain, name: &str) -> Result<&[T], NetworkError> {
        self.props.values(domain, name)
    }
}

impl DependentStore for GeometryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_resize(&self, _domain: Domain, _old: usize, _new: usize) -> Result<(), NetworkError> {
        Ok(())
    }

    fn on_rebuild(&mut self, domain: Domain, map: &IndexMap) {
        let indices = match domain {
            Domain::Pore => &mut self.pores,
            Domain::Throat => &mut self.throats,
        };
        let keep: Vec<bool> = indices.iter().map(|&i| map.get(i).is_some()).collect();
        *indices = indices.iter().filter_map(|&i| map.get(i)).collect();
        self.props.retain(domain, &keep);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Full-coverage container: one row per pore and per throat.
#[derive(Clone, Debug)]
pub struct PhaseStore {
    name: String,
    props: PropertyStore,
}

impl PhaseStore {
    pub fn new(name: &str, net: &Network) -> Self {
        Self {
            name: name.to_string(),
            props: PropertyStore::new(net.np(), net.nt()),
        }
    }

    pub fn count(&self, domain: Domain) -> usize {
        self.props.count(domain)
    }

    pub fn set_property(
        &mut self,
        domain: Domain,
        name: &str,
        array: impl Into<PropertyArray>,
    ) -> Result<Option<PropertyArray>, NetworkError> {
        self.props.insert(domain, name, array)
    }

    pub fn values<T: PropertyScalar>(&self, domain: Domain, name: &str) -> Result<&[T], NetworkError> {
        self.props.values(domain, name)
    }
}

impl DependentStore for PhaseStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_resize(&self, domain: Domain, old: usize, new: usize) -> Result<(), NetworkError> {
        if new > old {
            return Err(NetworkError::ResizeRejected {
                container: self.name.clone(),
                domain,
                old_count: old,
                new_count: new,
                reason: "new rows would have no values".to_string(),
            });
        }
        Ok(())
    }

    fn on_rebuild(&mut self, domain: Domain, map: &IndexMap) {
        let keep: Vec<bool> = (0..self.props.count(domain))
            .map(|i| map.get(i).is_some())
            .collect();
        self.props.retain(domain, &keep);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
