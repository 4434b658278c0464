//! Collapsing pore groups and joining whole networks.

use std::ops::Range;

use hashbrown::HashSet;

use crate::algs::subdivide::origin_of;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::hull::hull_centroid;
use crate::network_error::NetworkError;
use crate::topology::edit::Edit;
use crate::topology::network::{Domain, Network};

/// Collapse each group of pores into one pore placed at the centroid of the
/// group's convex hull.
///
/// Sub-pores made by [`subdivide`](crate::algs::subdivide) enter the hull at
/// the position of the pore they replaced, so a group placed before and after
/// a subdivision lands on the same point.
///
/// Throats from a group to outside pores are rewired to the new pore (to the
/// other group's new pore when the outside pore was merged too); throats
/// inside a group disappear and duplicates are collapsed. Returns the final
/// indices of the new pores, one per group.
pub fn merge_pores(net: &mut Network, groups: &[Vec<usize>], label: &str) -> Result<Vec<usize>, NetworkError> {
    if groups.is_empty() || groups.iter().any(Vec::is_empty) {
        return Err(NetworkError::EmptySelection("merge_pores"));
    }
    let np = net.np();
    let mut group_of: Vec<Option<usize>> = vec![None; np];
    for (g, members) in groups.iter().enumerate() {
        net.check_pores(members)?;
        for &p in members {
            match group_of[p] {
                Some(other) if other != g => {
                    return Err(NetworkError::invalid(format!(
                        "pore {p} appears in merge groups {other} and {g}"
                    )));
                }
                _ => group_of[p] = Some(g),
            }
        }
    }

    let mut new_coords = Vec::with_capacity(groups.len());
    for members in groups {
        let pts: Vec<[f64; 3]> = members.iter().map(|&p| origin_of(net, p)).collect();
        let center = hull_centroid(&pts).ok_or(NetworkError::EmptySelection("merge_pores"))?;
        new_coords.push(center);
    }

    let rep = |g: usize| np + g;
    let mut seen: HashSet<[usize; 2]> = HashSet::new();
    let mut new_conns = Vec::new();
    for c in net.conns() {
        let conn = match (group_of[c[0]], group_of[c[1]]) {
            (None, None) => continue,
            (Some(a), Some(b)) if a == b => continue,
            (Some(a), Some(b)) => [rep(a), rep(b)],
            (Some(a), None) => [rep(a), c[1]],
            (None, Some(b)) => [c[0], rep(b)],
        };
        if seen.insert([conn[0].min(conn[1]), conn[0].max(conn[1])]) {
            new_conns.push(conn);
        }
    }

    let drop_pores: Vec<usize> = (0..np).filter(|&p| group_of[p].is_some()).collect();
    let out = net.apply(Edit {
        new_coords,
        new_conns,
        pore_labels: vec![label.to_string()],
        throat_labels: vec![label.to_string()],
        drop_pores,
        ..Edit::default()
    })?;
    Ok(out.new_pores)
}

/// Index ranges of the rows appended by [`merge_networks`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeReport {
    pub pores: Range<usize>,
    pub throats: Range<usize>,
}

/// Append `donor` to `base` as a disjoint component.
///
/// Donor throats are offset by `base.np()`. Arrays present on one side only
/// are padded on the other; `Int` and `Real` arrays combine into `Real`. The
/// donor is consumed and its dependents are dropped.
pub fn merge_networks(base: &mut Network, donor: Network) -> Result<MergeReport, NetworkError> {
    let (np, nt) = (base.np(), base.nt());
    let (dnp, dnt) = (donor.np(), donor.nt());
    for (_, dep) in &base.dependents {
        if dnp > 0 {
            dep.on_resize(Domain::Pore, np, np + dnp)?;
        }
        if dnt > 0 {
            dep.on_resize(Domain::Throat, nt, nt + dnt)?;
        }
    }
    if !donor.dependents.is_empty() {
        log::debug!("dropping {} dependents of the donor network", donor.dependents.len());
    }

    let mut store = base.store.clone();
    store.absorb(donor.store)?;

    if base.spacing().is_some() {
        log::warn!("merged network is no longer a single lattice; clearing spacing and shape");
    }
    base.set_spacing(None);
    base.set_shape(None);
    base.coords.extend(donor.coords);
    base.conns
        .extend(donor.conns.into_iter().map(|[a, b]| [a + np, b + np]));
    base.store = store;
    crate::debug_invariants!(base.validate_invariants(), "merge_networks");
    log::debug!("merged networks: pores {np} -> {}, throats {nt} -> {}", base.np(), base.nt());

    Ok(MergeReport {
        pores: np..np + dnp,
        throats: nt..nt + dnt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::property::PropertyArray;

    /// 0 - 1 - 2 - 3 along x, 4 hanging off 1.
    fn comb() -> Network {
        let coords = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
        ];
        Network::new(coords, vec![[0, 1], [1, 2], [2, 3], [1, 4]]).unwrap()
    }

    #[test]
    fn merge_rewires_outside_neighbors() {
        let mut net = comb();
        let reps = merge_pores(&mut net, &[vec![1, 2]], "merged").unwrap();
        assert_eq!(reps, vec![3]);
        assert_eq!(net.np(), 4);
        assert_eq!(net.coords()[3], [1.5, 0.0, 0.0]);
        let mut conns: Vec<[usize; 2]> = net.conns().to_vec();
        conns.sort_unstable();
        assert_eq!(conns, vec![[0, 3], [3, 1], [3, 2]]);
        assert_eq!(net.throats("merged").unwrap().len(), 3);
    }

    #[test]
    fn merge_joins_two_groups_once() {
        let mut net = comb();
        let reps = merge_pores(&mut net, &[vec![0, 1], vec![2, 3]], "merged").unwrap();
        assert_eq!(reps, vec![1, 2]);
        assert_eq!(net.np(), 3);
        // 4 survives at index 0; the 1-2 throat becomes one rep-rep throat
        assert_eq!(net.nt(), 2);
        assert_eq!(net.coords()[1], [0.5, 0.0, 0.0]);
    }

    #[test]
    fn merge_rejects_overlap_and_empty() {
        let mut net = comb();
        assert!(matches!(
            merge_pores(&mut net, &[vec![0, 1], vec![1, 2]], "m"),
            Err(NetworkError::InvalidArgument(_))
        ));
        assert_eq!(
            merge_pores(&mut net, &[vec![]], "m"),
            Err(NetworkError::EmptySelection("merge_pores"))
        );
        assert_eq!(net.np(), 5);
    }

    #[test]
    fn merge_networks_offsets_and_pads() {
        let mut base = comb();
        base.set_property(Domain::Pore, "id", vec![0i64, 1, 2, 3, 4]).unwrap();
        let mut donor = Network::new(vec![[9.0, 0.0, 0.0], [9.0, 1.0, 0.0]], vec![[0, 1]]).unwrap();
        donor.set_label(Domain::Pore, "donor", &[0, 1]).unwrap();
        let report = merge_networks(&mut base, donor).unwrap();
        assert_eq!(report.pores, 5..7);
        assert_eq!(base.conns().last(), Some(&[5, 6]));
        assert_eq!(base.pores("donor").unwrap(), vec![5, 6]);
        let Some(PropertyArray::Real(ids)) = base.property(Domain::Pore, "id") else {
            panic!("padded int column should be real");
        };
        assert!(ids[6].is_nan());
    }

    #[test]
    fn merge_networks_conflict_leaves_base_alone() {
        let mut base = comb();
        base.set_label(Domain::Throat, "flag", &[0]).unwrap();
        let mut donor = Network::new(vec![[9.0, 0.0, 0.0], [9.0, 1.0, 0.0]], vec![[0, 1]]).unwrap();
        donor.set_property(Domain::Throat, "flag", vec![2.5]).unwrap();
        assert!(matches!(
            merge_networks(&mut base, donor),
            Err(NetworkError::IncompatibleMerge { .. })
        ));
        assert_eq!((base.np(), base.nt()), (5, 4));
    }
}
