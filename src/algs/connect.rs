//! New throats between existing pores, and pores cloned from existing ones.

use hashbrown::HashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::geometry::metrics::add;
use crate::network_error::NetworkError;
use crate::topology::edit::{Edit, RowSource};
use crate::topology::network::Network;

/// What to do with a requested throat that already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Skip pairs already connected (either orientation) or repeated in the request.
    #[default]
    Skip,
    /// Create every requested throat.
    Allow,
}

/// How cloned pores are connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloneMode {
    /// Each clone is joined to its original.
    #[default]
    Parents,
    /// Clones are joined to each other wherever their originals are.
    Siblings,
    /// No new throats.
    Isolated,
}

#[inline]
fn key(a: usize, b: usize) -> [usize; 2] {
    [a.min(b), a.max(b)]
}

/// Connect every pore of `groups1[i]` to every pore of `groups2[i]`.
///
/// Returns the indices of the created throats, which is empty when every
/// requested pair already existed under [`DuplicatePolicy::Skip`]. Requesting
/// no pair at all is an [`EmptySelection`](NetworkError::EmptySelection).
pub fn connect_pores(
    net: &mut Network,
    groups1: &[Vec<usize>],
    groups2: &[Vec<usize>],
    policy: DuplicatePolicy,
    labels: &[&str],
) -> Result<Vec<usize>, NetworkError> {
    if groups1.len() != groups2.len() {
        return Err(NetworkError::invalid(format!(
            "{} source groups but {} target groups",
            groups1.len(),
            groups2.len()
        )));
    }
    if groups1.iter().zip(groups2).all(|(g1, g2)| g1.is_empty() || g2.is_empty()) {
        return Err(NetworkError::EmptySelection("connect_pores"));
    }
    let mut seen: HashSet<[usize; 2]> = match policy {
        DuplicatePolicy::Skip => net.conns().iter().map(|c| key(c[0], c[1])).collect(),
        DuplicatePolicy::Allow => HashSet::new(),
    };
    let mut conns = Vec::new();
    for (g1, g2) in groups1.iter().zip(groups2) {
        net.check_pores(g1)?;
        net.check_pores(g2)?;
        for (&a, &b) in g1.iter().cartesian_product(g2) {
            if a == b {
                return Err(NetworkError::InvalidEdge {
                    conn: [a, b],
                    reason: "throat connects a pore to itself",
                });
            }
            if policy == DuplicatePolicy::Skip && !seen.insert(key(a, b)) {
                continue;
            }
            conns.push([a, b]);
        }
    }
    if conns.is_empty() {
        log::debug!("connect_pores: every requested throat already exists");
        return Ok(Vec::new());
    }
    let out = net.apply(Edit {
        new_conns: conns,
        throat_labels: labels.iter().map(|s| s.to_string()).collect(),
        ..Edit::default()
    })?;
    Ok(out.new_throats)
}

/// Duplicate `pores`, copying their property values, and connect the copies
/// according to `mode`. Returns the new pore indices.
pub fn clone_pores(
    net: &mut Network,
    pores: &[usize],
    mode: CloneMode,
    labels: &[&str],
) -> Result<Vec<usize>, NetworkError> {
    if pores.is_empty() {
        return Err(NetworkError::EmptySelection("clone_pores"));
    }
    net.check_pores(pores)?;
    let sources: Vec<usize> = pores.iter().copied().unique().collect();
    let np = net.np();
    let new_coords = sources.iter().map(|&p| net.coords()[p]).collect();

    let new_conns = match mode {
        CloneMode::Parents => sources.iter().enumerate().map(|(i, &p)| [p, np + i]).collect(),
        CloneMode::Siblings => {
            let mut clone_of = vec![usize::MAX; np];
            for (i, &p) in sources.iter().enumerate() {
                clone_of[p] = np + i;
            }
            net.conns()
                .iter()
                .filter(|c| clone_of[c[0]] != usize::MAX && clone_of[c[1]] != usize::MAX)
                .map(|c| [clone_of[c[0]], clone_of[c[1]]])
                .collect()
        }
        CloneMode::Isolated => Vec::new(),
    };
    let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
    let out = net.apply(Edit {
        new_coords,
        pore_rows: RowSource::CopyOf(sources),
        new_conns,
        pore_labels: labels.clone(),
        throat_labels: labels,
        ..Edit::default()
    })?;
    Ok(out.new_pores)
}

/// Add one pore at `coord + offset` per listed pore, joined to it by a new
/// throat. New pores and throats carry `label`; their other values are padded.
pub fn add_boundary_pores(
    net: &mut Network,
    pores: &[usize],
    offset: [f64; 3],
    label: &str,
) -> Result<Vec<usize>, NetworkError> {
    if pores.is_empty() {
        return Err(NetworkError::EmptySelection("add_boundary_pores"));
    }
    if offset.iter().any(|d| !d.is_finite()) {
        return Err(NetworkError::invalid(format!("offset must be finite, got {offset:?}")));
    }
    net.check_pores(pores)?;
    let sources: Vec<usize> = pores.iter().copied().unique().collect();
    let np = net.np();
    let new_coords = sources.iter().map(|&p| add(net.coords()[p], offset)).collect();
    let out = net.apply(Edit {
        new_coords,
        new_conns: sources.iter().enumerate().map(|(i, &p)| [p, np + i]).collect(),
        pore_labels: vec![label.to_string()],
        throat_labels: vec![label.to_string()],
        ..Edit::default()
    })?;
    Ok(out.new_pores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::network::Domain;

    fn square() -> Network {
        let coords = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        Network::new(coords, vec![[0, 1], [1, 2], [2, 3], [3, 0]]).unwrap()
    }

    #[test]
    fn connect_adds_product_and_skips_existing() {
        let mut net = square();
        let made = connect_pores(
            &mut net,
            &[vec![0], vec![1]],
            &[vec![1, 2], vec![3]],
            DuplicatePolicy::Skip,
            &["new"],
        )
        .unwrap();
        // [0, 1] already exists
        assert_eq!(made, vec![4, 5]);
        assert_eq!(&net.conns()[4..], &[[0, 2], [1, 3]]);
        assert_eq!(net.throats("new").unwrap(), vec![4, 5]);

        let made = connect_pores(&mut net, &[vec![0]], &[vec![1]], DuplicatePolicy::Allow, &[]).unwrap();
        assert_eq!(made, vec![6]);
    }

    #[test]
    fn connect_rejects_self_pairs_and_mismatched_groups() {
        let mut net = square();
        assert!(matches!(
            connect_pores(&mut net, &[vec![2]], &[vec![2]], DuplicatePolicy::Skip, &[]),
            Err(NetworkError::InvalidEdge { conn: [2, 2], .. })
        ));
        assert!(matches!(
            connect_pores(&mut net, &[vec![0], vec![1]], &[vec![2]], DuplicatePolicy::Skip, &[]),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert_eq!(net.nt(), 4);
    }

    #[test]
    fn connect_reports_empty_requests() {
        let mut net = square();
        for (g1, g2) in [(vec![], vec![]), (vec![vec![]], vec![vec![1]]), (vec![vec![0]], vec![vec![]])] {
            assert_eq!(
                connect_pores(&mut net, &g1, &g2, DuplicatePolicy::Skip, &[]),
                Err(NetworkError::EmptySelection("connect_pores"))
            );
        }
        // all pairs present is not an empty request
        let made = connect_pores(&mut net, &[vec![0]], &[vec![1, 3]], DuplicatePolicy::Skip, &[]).unwrap();
        assert!(made.is_empty());
        assert_eq!(net.nt(), 4);
    }

    #[test]
    fn clone_copies_values() {
        let mut net = square();
        net.set_property(Domain::Pore, "diameter", vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let clones = clone_pores(&mut net, &[1, 2], CloneMode::Siblings, &["copy"]).unwrap();
        assert_eq!(clones, vec![4, 5]);
        assert_eq!(net.conns().last(), Some(&[4, 5]));
        assert_eq!(&net.values::<f64>(Domain::Pore, "diameter").unwrap()[4..], &[0.2, 0.3]);
        assert_eq!(net.coords()[5], [1.0, 1.0, 0.0]);
        assert_eq!(net.pores("copy").unwrap(), vec![4, 5]);
    }

    #[test]
    fn boundary_pores_are_offset_and_padded() {
        let mut net = square();
        net.set_property(Domain::Pore, "diameter", vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let added = add_boundary_pores(&mut net, &[0, 3], [-1.0, 0.0, 0.0], "boundary").unwrap();
        assert_eq!(added, vec![4, 5]);
        assert_eq!(net.coords()[5], [-1.0, 1.0, 0.0]);
        assert_eq!(&net.conns()[4..], &[[0, 4], [3, 5]]);
        assert!(net.values::<f64>(Domain::Pore, "diameter").unwrap()[4].is_nan());
        assert_eq!(net.throats("boundary").unwrap(), vec![4, 5]);
    }
}
