//! Adjacency matrices and percolation tests.
//!
//! [`AdjacencyMatrix`] is a symmetric, self-loop-free pore adjacency with one
//! weight per throat, stored both as the throat list and in CSR form. Zero
//! weights are kept as explicit entries: in site mode they still join two
//! occupied pores.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::algs::union_find::UnionFind;
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network, check_conn, check_indices};

/// Which elements are occupied in a percolation test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercolationMode {
    /// Throats with non-zero weight are occupied.
    #[default]
    Bond,
    /// Pores touched by a non-zero throat are occupied; any throat between
    /// two occupied pores connects them.
    Site,
}

/// Symmetric weighted pore adjacency.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix {
    n: usize,
    conns: Vec<[usize; 2]>,
    weights: Vec<f64>,
    /// CSR offsets into `adjncy` for each pore.
    xadj: Vec<usize>,
    /// CSR neighbor list, both directions of every throat.
    adjncy: Vec<usize>,
    /// Throat behind each CSR entry.
    entry_throat: Vec<usize>,
}

impl AdjacencyMatrix {
    /// Build from raw connections and throat-aligned weights.
    pub fn from_conns(n: usize, conns: &[[usize; 2]], weights: &[f64]) -> Result<Self, NetworkError> {
        if weights.len() != conns.len() {
            return Err(NetworkError::LengthMismatch {
                domain: Domain::Throat,
                name: "weights".into(),
                expected: conns.len(),
                found: weights.len(),
            });
        }
        for &c in conns {
            check_conn(c, n)?;
        }
        let mut xadj = vec![0usize; n + 1];
        for c in conns {
            xadj[c[0] + 1] += 1;
            xadj[c[1] + 1] += 1;
        }
        for i in 0..n {
            xadj[i + 1] += xadj[i];
        }
        let mut fill = xadj.clone();
        let mut adjncy = vec![0usize; xadj[n]];
        let mut entry_throat = vec![0usize; xadj[n]];
        for (t, &[a, b]) in conns.iter().enumerate() {
            for (from, to) in [(a, b), (b, a)] {
                adjncy[fill[from]] = to;
                entry_throat[fill[from]] = t;
                fill[from] += 1;
            }
        }
        Ok(Self {
            n,
            conns: conns.to_vec(),
            weights: weights.to_vec(),
            xadj,
            adjncy,
            entry_throat,
        })
    }

    /// Weighted adjacency of a network.
    pub fn from_weights(net: &Network, weights: &[f64]) -> Result<Self, NetworkError> {
        Self::from_conns(net.np(), net.conns(), weights)
    }

    /// Unit weight where `mask` is true, explicit zero elsewhere.
    pub fn from_mask(net: &Network, mask: &[bool]) -> Result<Self, NetworkError> {
        let weights: Vec<f64> = mask.iter().map(|&m| if m { 1.0 } else { 0.0 }).collect();
        Self::from_weights(net, &weights)
    }

    /// Number of pores (rows).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.adjncy.len()
    }

    /// Sum of the entries at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.n {
            return 0.0;
        }
        (self.xadj[i]..self.xadj[i + 1])
            .filter(|&e| self.adjncy[e] == j)
            .map(|e| self.weights[self.entry_throat[e]])
            .sum()
    }

    /// Neighbor pores of `i`, one per incident throat.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adjncy[self.xadj[i]..self.xadj[i + 1]]
    }

    pub fn conns(&self) -> &[[usize; 2]] {
        &self.conns
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Cluster labels per pore and per throat; `None` means unoccupied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clusters {
    pub sites: Vec<Option<usize>>,
    pub bonds: Vec<Option<usize>>,
    /// Number of distinct clusters.
    pub count: usize,
}

fn label_clusters(am: &AdjacencyMatrix, site_occupied: &[bool], bond_open: &[bool]) -> Clusters {
    let mut uf = UnionFind::new(am.n);
    for (t, &[a, b]) in am.conns.iter().enumerate() {
        if bond_open[t] {
            uf.union(a, b);
        }
    }
    let mut dense = vec![usize::MAX; am.n];
    let mut count = 0;
    let mut sites = vec![None; am.n];
    for p in 0..am.n {
        if !site_occupied[p] {
            continue;
        }
        let root = uf.find(p);
        if dense[root] == usize::MAX {
            dense[root] = count;
            count += 1;
        }
        sites[p] = Some(dense[root]);
    }
    let bonds = am
        .conns
        .iter()
        .enumerate()
        .map(|(t, &[a, _])| if bond_open[t] { sites[a] } else { None })
        .collect();
    Clusters {
        sites,
        bonds,
        count,
    }
}

/// Clusters formed by throats with non-zero weight.
pub fn bond_percolation(am: &AdjacencyMatrix) -> Clusters {
    let open: Vec<bool> = am.weights.iter().map(|&w| w != 0.0).collect();
    let mut occupied = vec![false; am.n];
    for (t, &[a, b]) in am.conns.iter().enumerate() {
        if open[t] {
            occupied[a] = true;
            occupied[b] = true;
        }
    }
    label_clusters(am, &occupied, &open)
}

/// Clusters of pores touched by a non-zero throat, joined by any throat.
pub fn site_percolation(am: &AdjacencyMatrix) -> Clusters {
    let mut occupied = vec![false; am.n];
    for (t, &[a, b]) in am.conns.iter().enumerate() {
        if am.weights[t] != 0.0 {
            occupied[a] = true;
            occupied[b] = true;
        }
    }
    let open: Vec<bool> = am
        .conns
        .iter()
        .map(|&[a, b]| occupied[a] && occupied[b])
        .collect();
    label_clusters(am, &occupied, &open)
}

/// True when one cluster holds at least one inlet and one outlet.
pub fn ispercolating(
    am: &AdjacencyMatrix,
    mode: PercolationMode,
    inlets: &[usize],
    outlets: &[usize],
) -> Result<bool, NetworkError> {
    check_indices(Domain::Pore, inlets, am.n)?;
    check_indices(Domain::Pore, outlets, am.n)?;
    let clusters = match mode {
        PercolationMode::Bond => bond_percolation(am),
        PercolationMode::Site => site_percolation(am),
    };
    let reached: HashSet<usize> = inlets.iter().filter_map(|&p| clusters.sites[p]).collect();
    Ok(outlets
        .iter()
        .filter_map(|&p| clusters.sites[p])
        .any(|c| reached.contains(&c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 - 1 - 2 - 3 chain.
    fn chain(weights: &[f64]) -> AdjacencyMatrix {
        AdjacencyMatrix::from_conns(4, &[[0, 1], [1, 2], [2, 3]], weights).unwrap()
    }

    #[test]
    fn explicit_zeros_are_stored() {
        let am = chain(&[1.0, 0.0, 2.0]);
        assert_eq!(am.nnz(), 6);
        assert_eq!(am.get(2, 1), 0.0);
        assert_eq!(am.get(3, 2), 2.0);
        assert_eq!(am.get(0, 3), 0.0);
        assert_eq!(am.neighbors(1), &[0, 2]);
    }

    #[test]
    fn duplicate_throats_sum() {
        let am = AdjacencyMatrix::from_conns(2, &[[0, 1], [1, 0]], &[1.5, 2.0]).unwrap();
        assert_eq!(am.get(0, 1), 3.5);
        assert_eq!(am.get(1, 0), 3.5);
    }

    #[test]
    fn bond_and_site_modes_differ_on_zero_throats() {
        let am = chain(&[1.0, 0.0, 1.0]);
        assert!(!ispercolating(&am, PercolationMode::Bond, &[0], &[3]).unwrap());
        assert!(ispercolating(&am, PercolationMode::Site, &[0], &[3]).unwrap());

        let bonds = bond_percolation(&am);
        assert_eq!(bonds.count, 2);
        assert_eq!(bonds.bonds, vec![Some(0), None, Some(1)]);
        let sites = site_percolation(&am);
        assert_eq!(sites.count, 1);
        assert_eq!(sites.sites, vec![Some(0); 4]);
    }

    #[test]
    fn unoccupied_ends_do_not_percolate() {
        let am = chain(&[0.0, 1.0, 0.0]);
        assert!(!ispercolating(&am, PercolationMode::Site, &[0], &[3]).unwrap());
        assert!(ispercolating(&am, PercolationMode::Site, &[1], &[2]).unwrap());
        assert!(matches!(
            ispercolating(&am, PercolationMode::Bond, &[4], &[0]),
            Err(NetworkError::IndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn rejects_bad_weights() {
        assert!(matches!(
            AdjacencyMatrix::from_conns(3, &[[0, 1]], &[]),
            Err(NetworkError::LengthMismatch { .. })
        ));
        assert!(AdjacencyMatrix::from_conns(3, &[[0, 0]], &[1.0]).is_err());
    }
}
