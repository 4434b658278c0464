//! Atomic structural edits.
//!
//! Every mutator describes its change as an [`Edit`]: pores and throats to
//! append, pores and throats to drop. `Network::apply` validates the whole
//! edit, offers each count change to the registered dependents, builds the
//! new arrays off to the side, and only then swaps them in. A failing edit
//! leaves the network untouched.

use crate::debug_invariants::DebugInvariants;
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network, check_conn, check_indices};

/// Old index to new index map produced by a shrinking edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexMap {
    old_to_new: Vec<Option<usize>>,
    new_len: usize,
}

impl IndexMap {
    /// Map that keeps every one of `n` rows in place.
    pub fn identity(n: usize) -> Self {
        Self {
            old_to_new: (0..n).map(Some).collect(),
            new_len: n,
        }
    }

    /// Survivors compact downward in their original order.
    pub fn from_keep_mask(keep: &[bool]) -> Self {
        let mut next = 0;
        let old_to_new = keep
            .iter()
            .map(|&k| {
                k.then(|| {
                    next += 1;
                    next - 1
                })
            })
            .collect();
        Self {
            old_to_new,
            new_len: next,
        }
    }

    /// New index of `old`, or `None` if it was removed (or never existed).
    #[inline]
    pub fn get(&self, old: usize) -> Option<usize> {
        self.old_to_new.get(old).copied().flatten()
    }

    pub fn old_len(&self) -> usize {
        self.old_to_new.len()
    }

    pub fn new_len(&self) -> usize {
        self.new_len
    }

    pub fn is_identity(&self) -> bool {
        self.new_len == self.old_to_new.len()
    }

    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.old_to_new
    }

    /// Old indices that did not survive.
    pub fn removed(&self) -> impl Iterator<Item = usize> + '_ {
        self.old_to_new
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.is_none().then_some(i))
    }

    /// Keep mask over the old indices.
    pub fn keep_mask(&self) -> Vec<bool> {
        self.old_to_new.iter().map(Option::is_some).collect()
    }
}

/// Where the property rows of new pores come from.
#[derive(Clone, Debug, Default)]
pub(crate) enum RowSource {
    /// Padding per the property padding table.
    #[default]
    Padded,
    /// Copies of these existing pore rows, one per new pore.
    CopyOf(Vec<usize>),
}

/// A complete description of one structural change.
#[derive(Clone, Debug, Default)]
pub(crate) struct Edit {
    pub new_coords: Vec<[f64; 3]>,
    pub pore_rows: RowSource,
    /// May reference pores `>= Np`, i.e. the new ones.
    pub new_conns: Vec<[usize; 2]>,
    pub pore_labels: Vec<String>,
    pub throat_labels: Vec<String>,
    pub drop_pores: Vec<usize>,
    pub drop_throats: Vec<usize>,
}

/// Rewrite throat endpoints through `pore_map`, dropping throats that touch
/// a removed pore.
pub fn reindex_edges(conns: &[[usize; 2]], pore_map: &IndexMap) -> Vec<[usize; 2]> {
    conns
        .iter()
        .filter_map(|c| Some([pore_map.get(c[0])?, pore_map.get(c[1])?]))
        .collect()
}

/// What an applied edit produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    /// Final indices of the appended pores.
    pub new_pores: Vec<usize>,
    /// Final indices of the appended throats that survived.
    pub new_throats: Vec<usize>,
    /// Map from `old Np + appended` pore indices to final indices.
    pub pore_map: IndexMap,
    /// Map from `old Nt + appended` throat indices to final indices.
    pub throat_map: IndexMap,
}

impl Network {
    pub(crate) fn apply(&mut self, edit: Edit) -> Result<EditOutcome, NetworkError> {
        let old_np = self.np();
        let old_nt = self.nt();
        let grown_np = old_np + edit.new_coords.len();
        let grown_nt = old_nt + edit.new_conns.len();

        if let RowSource::CopyOf(rows) = &edit.pore_rows {
            if rows.len() != edit.new_coords.len() {
                return Err(NetworkError::invalid(format!(
                    "{} source rows for {} new pores",
                    rows.len(),
                    edit.new_coords.len()
                )));
            }
            check_indices(Domain::Pore, rows, old_np)?;
        }
        for &conn in &edit.new_conns {
            check_conn(conn, grown_np)?;
        }
        check_indices(Domain::Pore, &edit.drop_pores, grown_np)?;
        check_indices(Domain::Throat, &edit.drop_throats, grown_nt)?;

        let mut keep_pores = vec![true; grown_np];
        for &p in &edit.drop_pores {
            keep_pores[p] = false;
        }
        let mut keep_throats = vec![true; grown_nt];
        for &t in &edit.drop_throats {
            keep_throats[t] = false;
        }
        for (t, conn) in self.conns.iter().chain(&edit.new_conns).enumerate() {
            if !keep_pores[conn[0]] || !keep_pores[conn[1]] {
                keep_throats[t] = false;
            }
        }
        let pore_map = IndexMap::from_keep_mask(&keep_pores);
        let throat_map = IndexMap::from_keep_mask(&keep_throats);

        for (_, dep) in &self.dependents {
            if grown_np > old_np {
                dep.on_resize(Domain::Pore, old_np, grown_np)?;
            }
            if grown_nt > old_nt {
                dep.on_resize(Domain::Throat, old_nt, grown_nt)?;
            }
            if pore_map.new_len() < grown_np {
                dep.on_resize(Domain::Pore, grown_np, pore_map.new_len())?;
            }
            if throat_map.new_len() < grown_nt {
                dep.on_resize(Domain::Throat, grown_nt, throat_map.new_len())?;
            }
        }

        let mut store = self.store.clone();
        match &edit.pore_rows {
            RowSource::Padded => store.resize(Domain::Pore, grown_np),
            RowSource::CopyOf(rows) => store.append_rows(Domain::Pore, rows)?,
        }
        store.resize(Domain::Throat, grown_nt);
        let added_pores: Vec<usize> = (old_np..grown_np).collect();
        let added_throats: Vec<usize> = (old_nt..grown_nt).collect();
        for label in &edit.pore_labels {
            store.set_label(Domain::Pore, label, &added_pores)?;
        }
        for label in &edit.throat_labels {
            store.set_label(Domain::Throat, label, &added_throats)?;
        }
        store.retain(Domain::Pore, &keep_pores);
        store.retain(Domain::Throat, &keep_throats);

        let coords: Vec<[f64; 3]> = self
            .coords
            .iter()
            .chain(&edit.new_coords)
            .zip(&keep_pores)
            .filter_map(|(c, &k)| k.then_some(*c))
            .collect();
        let kept: Vec<[usize; 2]> = self
            .conns
            .iter()
            .chain(&edit.new_conns)
            .zip(&keep_throats)
            .filter_map(|(c, &k)| k.then_some(*c))
            .collect();
        // kept throats never touch a dropped pore, so nothing more is removed here
        let conns = reindex_edges(&kept, &pore_map);

        self.coords = coords;
        self.conns = conns;
        self.store = store;
        for (_, dep) in &mut self.dependents {
            if !pore_map.is_identity() {
                dep.on_rebuild(Domain::Pore, &pore_map);
            }
            if !throat_map.is_identity() {
                dep.on_rebuild(Domain::Throat, &throat_map);
            }
        }
        crate::debug_invariants!(self.validate_invariants(), "network edit");

        log::debug!(
            "edit applied: pores {old_np} -> {} ({} added), throats {old_nt} -> {} ({} added)",
            self.np(),
            added_pores.len(),
            self.nt(),
            added_throats.len()
        );
        Ok(EditOutcome {
            new_pores: added_pores.iter().filter_map(|&p| pore_map.get(p)).collect(),
            new_throats: added_throats
                .iter()
                .filter_map(|&t| throat_map.get(t))
                .collect(),
            pore_map,
            throat_map,
        })
    }
}
