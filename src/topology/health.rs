//! Structural health checks.

use hashbrown::HashMap;

use crate::algs::union_find::UnionFind;
use crate::topology::network::Network;

/// Findings of [`check_network_health`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HealthReport {
    /// Pores of every connected cluster except the largest, one entry per cluster.
    pub disconnected_clusters: Vec<Vec<usize>>,
    /// Pores with no throats.
    pub isolated_pores: Vec<usize>,
    /// Groups of throats joining the same pair, lowest index first.
    pub duplicate_throats: Vec<Vec<usize>>,
    /// Throats with an endpoint outside `0..Np`.
    pub headless_throats: Vec<usize>,
    /// Throats joining a pore to itself.
    pub looped_throats: Vec<usize>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.disconnected_clusters.is_empty()
            && self.isolated_pores.is_empty()
            && self.duplicate_throats.is_empty()
            && self.headless_throats.is_empty()
            && self.looped_throats.is_empty()
    }
}

/// Inspect a network for disconnected clusters, isolated pores and
/// duplicate throats.
pub fn check_network_health(net: &Network) -> HealthReport {
    check_connection_health(net.np(), net.conns())
}

/// Same checks on raw arrays, before they become a [`Network`].
pub fn check_connection_health(np: usize, conns: &[[usize; 2]]) -> HealthReport {
    let mut report = HealthReport::default();
    let mut uf = UnionFind::new(np);
    let mut degree = vec![0usize; np];
    let mut pairs: HashMap<[usize; 2], Vec<usize>> = HashMap::new();

    for (t, &[a, b]) in conns.iter().enumerate() {
        if a >= np || b >= np {
            report.headless_throats.push(t);
            continue;
        }
        if a == b {
            report.looped_throats.push(t);
            continue;
        }
        degree[a] += 1;
        degree[b] += 1;
        uf.union(a, b);
        pairs.entry([a.min(b), a.max(b)]).or_default().push(t);
    }

    report.isolated_pores = (0..np).filter(|&p| degree[p] == 0).collect();

    let mut dups: Vec<Vec<usize>> = pairs.into_values().filter(|ts| ts.len() > 1).collect();
    dups.sort_unstable();
    report.duplicate_throats = dups;

    let (labels, k) = uf.labels();
    if k > 1 {
        let mut clusters = vec![Vec::new(); k];
        for (p, &c) in labels.iter().enumerate() {
            clusters[c].push(p);
        }
        let largest = clusters
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.len(), std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        report.disconnected_clusters = clusters
            .into_iter()
            .enumerate()
            .filter_map(|(i, c)| (i != largest).then_some(c))
            .collect();
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_every_problem() {
        let conns = [[0, 1], [1, 0], [2, 2], [3, 9], [1, 2], [4, 5]];
        let report = check_connection_health(7, &conns);
        assert_eq!(report.duplicate_throats, vec![vec![0, 1]]);
        assert_eq!(report.looped_throats, vec![2]);
        assert_eq!(report.headless_throats, vec![3]);
        assert_eq!(report.isolated_pores, vec![3, 6]);
        assert_eq!(report.disconnected_clusters, vec![vec![3], vec![4, 5], vec![6]]);
        assert!(!report.is_healthy());
    }

    #[test]
    fn chain_is_healthy() {
        let coords = (0..3).map(|i| [i as f64, 0.0, 0.0]).collect();
        let net = Network::new(coords, vec![[0, 1], [1, 2]]).unwrap();
        assert!(check_network_health(&net).is_healthy());
    }
}
