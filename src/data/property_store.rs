//! Name-keyed property storage aligned to pore and throat counts.
//!
//! `PropertyStore` keeps one [`PropertyArray`] per `(domain, name)` and
//! guarantees that every pore array has `Np` rows and every throat array `Nt`
//! rows. The `all` label exists in both domains and is always all-true.

use std::collections::BTreeMap;

use crate::data::property::{PropertyArray, PropertyKind, PropertyScalar};
use crate::network_error::NetworkError;
use crate::topology::network::Domain;

/// Names managed by the network itself.
pub const RESERVED_NAMES: [&str; 3] = ["coords", "conns", "all"];

/// Aligned property arrays for the pore and throat domains.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyStore {
    pores: BTreeMap<String, PropertyArray>,
    throats: BTreeMap<String, PropertyArray>,
    np: usize,
    nt: usize,
}

impl PropertyStore {
    /// Empty store sized for `np` pores and `nt` throats.
    pub fn new(np: usize, nt: usize) -> Self {
        let mut store = Self {
            pores: BTreeMap::new(),
            throats: BTreeMap::new(),
            np,
            nt,
        };
        store.refill_all(Domain::Pore);
        store.refill_all(Domain::Throat);
        store
    }

    fn map(&self, domain: Domain) -> &BTreeMap<String, PropertyArray> {
        match domain {
            Domain::Pore => &self.pores,
            Domain::Throat => &self.throats,
        }
    }

    fn map_mut(&mut self, domain: Domain) -> &mut BTreeMap<String, PropertyArray> {
        match domain {
            Domain::Pore => &mut self.pores,
            Domain::Throat => &mut self.throats,
        }
    }

    fn refill_all(&mut self, domain: Domain) {
        let n = self.count(domain);
        self.map_mut(domain)
            .insert("all".to_string(), PropertyArray::Bool(vec![true; n]));
    }

    fn check_name(name: &str) -> Result<(), NetworkError> {
        if RESERVED_NAMES.contains(&name) {
            Err(NetworkError::ReservedName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn check_rows(domain: Domain, name: &str, array: &PropertyArray) -> Result<(), NetworkError> {
        if array.is_ragged() {
            return Err(NetworkError::invalid(format!(
                "`{domain}.{name}` is {} but its data is not a whole number of rows",
                array.kind()
            )));
        }
        Ok(())
    }

    /// Row count of a domain.
    pub fn count(&self, domain: Domain) -> usize {
        match domain {
            Domain::Pore => self.np,
            Domain::Throat => self.nt,
        }
    }

    /// Insert or replace an array; returns the previous one.
    pub fn insert(
        &mut self,
        domain: Domain,
        name: &str,
        array: impl Into<PropertyArray>,
    ) -> Result<Option<PropertyArray>, NetworkError> {
        Self::check_name(name)?;
        let array = array.into();
        Self::check_rows(domain, name, &array)?;
        let expected = self.count(domain);
        if array.len() != expected {
            return Err(NetworkError::LengthMismatch {
                domain,
                name: name.to_string(),
                expected,
                found: array.len(),
            });
        }
        Ok(self.map_mut(domain).insert(name.to_string(), array))
    }

    /// Remove an array and hand it back.
    pub fn remove(&mut self, domain: Domain, name: &str) -> Result<PropertyArray, NetworkError> {
        Self::check_name(name)?;
        self.map_mut(domain)
            .remove(name)
            .ok_or_else(|| NetworkError::MissingProperty {
                domain,
                name: name.to_string(),
            })
    }

    pub fn get(&self, domain: Domain, name: &str) -> Option<&PropertyArray> {
        self.map(domain).get(name)
    }

    pub fn contains(&self, domain: Domain, name: &str) -> bool {
        self.map(domain).contains_key(name)
    }

    /// Array names of a domain in sorted order, `all` included.
    pub fn names(&self, domain: Domain) -> impl Iterator<Item = &str> {
        self.map(domain).keys().map(String::as_str)
    }

    /// Names of the boolean arrays of a domain.
    pub fn labels(&self, domain: Domain) -> impl Iterator<Item = &str> {
        self.map(domain)
            .iter()
            .filter(|(_, a)| a.kind() == PropertyKind::Bool)
            .map(|(k, _)| k.as_str())
    }

    /// Typed read access.
    pub fn values<T: PropertyScalar>(&self, domain: Domain, name: &str) -> Result<&[T], NetworkError> {
        let array = self
            .map(domain)
            .get(name)
            .ok_or_else(|| NetworkError::MissingProperty {
                domain,
                name: name.to_string(),
            })?;
        T::slice(array).ok_or_else(|| NetworkError::PropertyKindMismatch {
            domain,
            name: name.to_string(),
            expected: T::KIND,
            found: array.kind(),
        })
    }

    /// Typed write access; the length of the slice is fixed.
    pub fn values_mut<T: PropertyScalar>(
        &mut self,
        domain: Domain,
        name: &str,
    ) -> Result<&mut [T], NetworkError> {
        Self::check_name(name)?;
        let array = self
            .map_mut(domain)
            .get_mut(name)
            .ok_or_else(|| NetworkError::MissingProperty {
                domain,
                name: name.to_string(),
            })?;
        let found = array.kind();
        T::slice_mut(array).ok_or_else(|| NetworkError::PropertyKindMismatch {
            domain,
            name: name.to_string(),
            expected: T::KIND,
            found,
        })
    }

    /// Label lookup.
    pub fn label(&self, domain: Domain, name: &str) -> Result<&[bool], NetworkError> {
        self.values::<bool>(domain, name)
    }

    /// Indices where a label is true.
    pub fn indices_with(&self, domain: Domain, name: &str) -> Result<Vec<usize>, NetworkError> {
        Ok(self
            .label(domain, name)?
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect())
    }

    /// Set a label to true on `indices`, creating it (all false) if absent.
    pub fn set_label(
        &mut self,
        domain: Domain,
        name: &str,
        indices: &[usize],
    ) -> Result<(), NetworkError> {
        Self::check_name(name)?;
        let count = self.count(domain);
        if let Some(&index) = indices.iter().find(|&&i| i >= count) {
            return Err(NetworkError::IndexOutOfRange {
                domain,
                index,
                count,
            });
        }
        if let Some(existing) = self.map(domain).get(name) {
            if existing.kind() != PropertyKind::Bool {
                return Err(NetworkError::PropertyKindMismatch {
                    domain,
                    name: name.to_string(),
                    expected: PropertyKind::Bool,
                    found: existing.kind(),
                });
            }
        }
        let entry = self
            .map_mut(domain)
            .entry(name.to_string())
            .or_insert_with(|| PropertyArray::Bool(vec![false; count]));
        if let PropertyArray::Bool(mask) = entry {
            for &i in indices {
                mask[i] = true;
            }
        }
        Ok(())
    }

    /// Grow or truncate every array of a domain to `new_count` rows.
    pub fn resize(&mut self, domain: Domain, new_count: usize) {
        let old = self.count(domain);
        if new_count >= old {
            for array in self.map_mut(domain).values_mut() {
                array.grow(new_count - old);
            }
        } else {
            let keep: Vec<bool> = (0..old).map(|i| i < new_count).collect();
            for array in self.map_mut(domain).values_mut() {
                array.retain(&keep);
            }
        }
        self.set_count(domain, new_count);
        self.refill_all(domain);
    }

    /// Physically remove the rows whose mask entry is false.
    pub fn retain(&mut self, domain: Domain, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.count(domain));
        for array in self.map_mut(domain).values_mut() {
            array.retain(keep);
        }
        let kept = keep.iter().filter(|&&k| k).count();
        self.set_count(domain, kept);
        self.refill_all(domain);
    }

    /// Remove the listed rows; survivors compact downward in order.
    pub fn remove_rows(&mut self, domain: Domain, rows: &[usize]) -> Result<(), NetworkError> {
        let count = self.count(domain);
        let mut keep = vec![true; count];
        for &r in rows {
            if r >= count {
                return Err(NetworkError::IndexOutOfRange {
                    domain,
                    index: r,
                    count,
                });
            }
            keep[r] = false;
        }
        self.retain(domain, &keep);
        Ok(())
    }

    /// Append copies of existing rows, keeping every kind unchanged.
    pub fn append_rows(&mut self, domain: Domain, source_rows: &[usize]) -> Result<(), NetworkError> {
        let count = self.count(domain);
        if let Some(&index) = source_rows.iter().find(|&&r| r >= count) {
            return Err(NetworkError::IndexOutOfRange {
                domain,
                index,
                count,
            });
        }
        for array in self.map_mut(domain).values_mut() {
            let copies = array.gather(source_rows);
            // same kind on both sides, cannot conflict
            let _ = array.append(copies);
        }
        self.set_count(domain, count + source_rows.len());
        self.refill_all(domain);
        Ok(())
    }

    /// Concatenate another store below this one.
    ///
    /// Arrays missing on either side are padded. Nothing is modified when a
    /// conflict is found.
    pub fn absorb(&mut self, other: PropertyStore) -> Result<(), NetworkError> {
        let mut merged = self.clone();
        for domain in [Domain::Pore, Domain::Throat] {
            let base_rows = self.count(domain);
            let donor_rows = other.count(domain);
            let donor = other.map(domain);
            let target = merged.map_mut(domain);
            for (name, array) in target.iter_mut() {
                match donor.get(name) {
                    Some(theirs) => {
                        array.append(theirs.clone()).map_err(|(mine, found)| {
                            NetworkError::IncompatibleMerge {
                                domain,
                                name: name.clone(),
                                reason: format!("{mine} cannot be joined with {found}"),
                            }
                        })?;
                    }
                    None => array.grow(donor_rows),
                }
            }
            for (name, theirs) in donor {
                if target.contains_key(name) {
                    continue;
                }
                let mut array = PropertyArray::padding(theirs.kind(), base_rows);
                array
                    .append(theirs.clone())
                    .map_err(|(mine, found)| NetworkError::IncompatibleMerge {
                        domain,
                        name: name.clone(),
                        reason: format!("{mine} cannot be joined with {found}"),
                    })?;
                target.insert(name.clone(), array);
            }
            merged.set_count(domain, base_rows + donor_rows);
            merged.refill_all(domain);
        }
        *self = merged;
        Ok(())
    }

    fn set_count(&mut self, domain: Domain, n: usize) {
        match domain {
            Domain::Pore => self.np = n,
            Domain::Throat => self.nt = n,
        }
    }

    /// Check that every array matches its domain length.
    pub fn validate(&self) -> Result<(), NetworkError> {
        for domain in [Domain::Pore, Domain::Throat] {
            let expected = self.count(domain);
            for (name, array) in self.map(domain) {
                Self::check_rows(domain, name, array)?;
                if array.len() != expected {
                    return Err(NetworkError::LengthMismatch {
                        domain,
                        name: name.clone(),
                        expected,
                        found: array.len(),
                    });
                }
            }
            if self.label(domain, "all")?.iter().any(|&b| !b) {
                return Err(NetworkError::invalid(format!(
                    "`{domain}.all` contains false entries"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_checks_length_and_reserved_names() {
        let mut store = PropertyStore::new(3, 2);
        assert!(matches!(
            store.insert(Domain::Pore, "diameter", vec![1.0, 2.0]),
            Err(NetworkError::LengthMismatch { expected: 3, found: 2, .. })
        ));
        assert_eq!(
            store.insert(Domain::Pore, "all", vec![true; 3]),
            Err(NetworkError::ReservedName("all".into()))
        );
        assert!(store.remove(Domain::Throat, "conns").is_err());
        store.insert(Domain::Throat, "length", vec![0.5, 0.25]).unwrap();
        assert_eq!(store.values::<f64>(Domain::Throat, "length").unwrap(), &[0.5, 0.25]);
    }

    #[test]
    fn insert_rejects_ragged_vectors() {
        let mut store = PropertyStore::new(3, 0);
        let ragged = PropertyArray::Vector {
            width: 2,
            data: vec![0.0; 7],
        };
        assert!(matches!(
            store.insert(Domain::Pore, "normal", ragged),
            Err(NetworkError::InvalidArgument(_))
        ));
        let mut empty = PropertyStore::new(0, 0);
        let zero_width = PropertyArray::Vector {
            width: 0,
            data: vec![],
        };
        assert!(matches!(
            empty.insert(Domain::Pore, "normal", zero_width),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert!(!store.contains(Domain::Pore, "normal"));
        store
            .insert(Domain::Pore, "normal", PropertyArray::from_rows(&[[0.0, 1.0]; 3]))
            .unwrap();
        store.validate().unwrap();
    }

    #[test]
    fn validate_catches_ragged_vectors() {
        let mut store = PropertyStore::new(3, 0);
        store.pores.insert(
            "normal".to_string(),
            PropertyArray::Vector {
                width: 2,
                data: vec![0.0; 7],
            },
        );
        assert!(matches!(store.validate(), Err(NetworkError::InvalidArgument(_))));
    }

    #[test]
    fn values_reports_kind_mismatch() {
        let mut store = PropertyStore::new(2, 0);
        store.insert(Domain::Pore, "id", vec![3i64, 4]).unwrap();
        let err = store.values::<f64>(Domain::Pore, "id").unwrap_err();
        assert_eq!(
            err,
            NetworkError::PropertyKindMismatch {
                domain: Domain::Pore,
                name: "id".into(),
                expected: PropertyKind::Real,
                found: PropertyKind::Int,
            }
        );
        store.values_mut::<i64>(Domain::Pore, "id").unwrap()[1] = 9;
        assert_eq!(store.values::<i64>(Domain::Pore, "id").unwrap(), &[3, 9]);
    }

    #[test]
    fn resize_pads_and_refills_all() {
        let mut store = PropertyStore::new(2, 1);
        store.set_label(Domain::Pore, "inlet", &[1]).unwrap();
        store.insert(Domain::Pore, "id", vec![7i64, 8]).unwrap();
        store.resize(Domain::Pore, 4);
        assert_eq!(store.label(Domain::Pore, "all").unwrap(), &[true; 4]);
        assert_eq!(
            store.label(Domain::Pore, "inlet").unwrap(),
            &[false, true, false, false]
        );
        let ids = store.values::<f64>(Domain::Pore, "id").unwrap();
        assert_eq!(&ids[..2], &[7.0, 8.0]);
        assert!(ids[2].is_nan() && ids[3].is_nan());
        store.resize(Domain::Pore, 1);
        assert_eq!(store.count(Domain::Pore), 1);
        store.validate().unwrap();
    }

    #[test]
    fn remove_rows_compacts_in_order() {
        let mut store = PropertyStore::new(4, 0);
        store.insert(Domain::Pore, "x", vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        store.remove_rows(Domain::Pore, &[0, 2]).unwrap();
        assert_eq!(store.values::<f64>(Domain::Pore, "x").unwrap(), &[1.0, 3.0]);
        assert!(matches!(
            store.remove_rows(Domain::Pore, &[5]),
            Err(NetworkError::IndexOutOfRange { index: 5, count: 2, .. })
        ));
    }

    #[test]
    fn absorb_pads_both_sides_and_is_atomic() {
        let mut base = PropertyStore::new(2, 0);
        base.insert(Domain::Pore, "a", vec![1i64, 2]).unwrap();
        let mut donor = PropertyStore::new(1, 0);
        donor.insert(Domain::Pore, "a", vec![0.5]).unwrap();
        donor.set_label(Domain::Pore, "donor", &[0]).unwrap();
        base.absorb(donor).unwrap();
        assert_eq!(base.count(Domain::Pore), 3);
        assert_eq!(base.values::<f64>(Domain::Pore, "a").unwrap(), &[1.0, 2.0, 0.5]);
        assert_eq!(
            base.label(Domain::Pore, "donor").unwrap(),
            &[false, false, true]
        );

        let before = base.clone();
        let mut clash = PropertyStore::new(1, 0);
        clash.insert(Domain::Pore, "donor", vec![1.0]).unwrap();
        assert!(matches!(
            base.absorb(clash),
            Err(NetworkError::IncompatibleMerge { .. })
        ));
        assert_eq!(base.count(Domain::Pore), before.count(Domain::Pore));
        assert_eq!(base.label(Domain::Pore, "donor"), before.label(Domain::Pore, "donor"));
    }
}
