//! Neighbor queries over the pore/throat incidence structure.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::network_error::NetworkError;
use crate::topology::network::Network;

/// How per-pore neighbor sets are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetMode {
    /// Neighbors of at least one input.
    #[default]
    Or,
    /// Neighbors of exactly one input.
    Xor,
    /// Neighbors shared by two or more inputs.
    Xnor,
    /// Neighbors shared by every input.
    And,
}

impl SetMode {
    fn accepts(self, hits: usize, inputs: usize) -> bool {
        match self {
            SetMode::Or => hits >= 1,
            SetMode::Xor => hits == 1,
            SetMode::Xnor => hits >= 2,
            SetMode::And => hits == inputs,
        }
    }
}

/// CSR pore-to-throat incidence.
#[derive(Clone, Debug)]
pub struct Incidence {
    /// Offsets into `throats` for each pore.
    pub xadj: Vec<usize>,
    /// Incident throat indices, ascending per pore.
    pub throats: Vec<usize>,
}

impl Incidence {
    pub fn build(np: usize, conns: &[[usize; 2]]) -> Self {
        let mut xadj = vec![0usize; np + 1];
        for c in conns {
            xadj[c[0] + 1] += 1;
            xadj[c[1] + 1] += 1;
        }
        for i in 0..np {
            xadj[i + 1] += xadj[i];
        }
        let mut fill = xadj.clone();
        let mut throats = vec![0usize; xadj[np]];
        for (t, c) in conns.iter().enumerate() {
            for &p in c {
                throats[fill[p]] = t;
                fill[p] += 1;
            }
        }
        Self { xadj, throats }
    }

    /// Throats incident to pore `p`.
    #[inline]
    pub fn throats_of(&self, p: usize) -> &[usize] {
        &self.throats[self.xadj[p]..self.xadj[p + 1]]
    }
}

impl Network {
    /// Pore-to-throat incidence of the current topology.
    pub fn incidence(&self) -> Incidence {
        Incidence::build(self.np(), self.conns())
    }

    /// Incident throat count of every pore.
    pub fn degrees(&self) -> Vec<usize> {
        let mut deg = vec![0; self.np()];
        for c in self.conns() {
            deg[c[0]] += 1;
            deg[c[1]] += 1;
        }
        deg
    }
}

/// Pores adjacent to `pores`, combined by `mode`; the inputs are excluded.
pub fn find_neighbor_pores(
    net: &Network,
    pores: &[usize],
    mode: SetMode,
) -> Result<Vec<usize>, NetworkError> {
    net.check_pores(pores)?;
    let inc = net.incidence();
    let mut inputs = pores.to_vec();
    inputs.sort_unstable();
    inputs.dedup();
    let mut hits: HashMap<usize, usize> = HashMap::new();
    for &p in &inputs {
        let mut seen: Vec<usize> = inc
            .throats_of(p)
            .iter()
            .map(|&t| other_end(net.conns()[t], p))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        for q in seen {
            *hits.entry(q).or_default() += 1;
        }
    }
    let mut out: Vec<usize> = hits
        .into_iter()
        .filter(|&(q, n)| mode.accepts(n, inputs.len()) && inputs.binary_search(&q).is_err())
        .map(|(q, _)| q)
        .collect();
    out.sort_unstable();
    Ok(out)
}

/// Throats touching `pores`, combined by `mode`.
///
/// `Xnor` keeps throats with both ends in the input set, `Xor` those with
/// exactly one.
pub fn find_neighbor_throats(
    net: &Network,
    pores: &[usize],
    mode: SetMode,
) -> Result<Vec<usize>, NetworkError> {
    net.check_pores(pores)?;
    let mut inputs = pores.to_vec();
    inputs.sort_unstable();
    inputs.dedup();
    let mut member = vec![false; net.np()];
    for &p in &inputs {
        member[p] = true;
    }
    Ok(net
        .conns()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            let hits = member[c[0]] as usize + member[c[1]] as usize;
            mode.accepts(hits, inputs.len())
        })
        .map(|(t, _)| t)
        .collect())
}

/// Number of distinct neighboring pores of each input pore.
pub fn num_neighbors(net: &Network, pores: &[usize]) -> Result<Vec<usize>, NetworkError> {
    net.check_pores(pores)?;
    let inc = net.incidence();
    Ok(pores
        .iter()
        .map(|&p| {
            let mut nbrs: Vec<usize> = inc
                .throats_of(p)
                .iter()
                .map(|&t| other_end(net.conns()[t], p))
                .collect();
            nbrs.sort_unstable();
            nbrs.dedup();
            nbrs.len()
        })
        .collect())
}

/// Lowest-index throat joining `a` and `b`, if any.
pub fn find_connecting_throat(
    net: &Network,
    a: usize,
    b: usize,
) -> Result<Option<usize>, NetworkError> {
    net.check_pores(&[a, b])?;
    Ok(net
        .conns()
        .iter()
        .position(|c| (c[0] == a && c[1] == b) || (c[0] == b && c[1] == a)))
}

#[inline]
pub(crate) fn other_end(conn: [usize; 2], p: usize) -> usize {
    if conn[0] == p { conn[1] } else { conn[0] }
}
