//! Lowering the mean coordination number by removing throats.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::algs::union_find::UnionFind;
use crate::network_error::NetworkError;
use crate::topology::edit::Edit;
use crate::topology::network::Network;

/// Options for [`reduce_coordination`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinationOptions {
    /// Seed for the throat shuffle; equal seeds give equal results.
    pub rng_seed: u64,
}

impl Default for CoordinationOptions {
    fn default() -> Self {
        Self { rng_seed: 42 }
    }
}

/// Remove throats until `Nt == floor(Np * z / 2)`, keeping a random spanning
/// forest so that no cluster is split and no pore loses its last throat.
///
/// Throats whose two endpoints are both above the target degree go first.
/// Returns the removed throat indices (as numbered before the call).
pub fn reduce_coordination(
    net: &mut Network,
    z: f64,
    options: &CoordinationOptions,
) -> Result<Vec<usize>, NetworkError> {
    let (np, nt) = (net.np(), net.nt());
    if !(z.is_finite() && z > 0.0) {
        return Err(NetworkError::invalid(format!(
            "target coordination must be positive, got {z}"
        )));
    }
    if np == 0 {
        return Err(NetworkError::EmptySelection("reduce_coordination"));
    }
    let current = 2.0 * nt as f64 / np as f64;
    if z > current {
        return Err(NetworkError::invalid(format!(
            "target coordination {z} exceeds the current mean {current:.3}"
        )));
    }
    let exact = np as f64 * z / 2.0;
    let target_nt = exact.floor() as usize;
    if exact.fract() != 0.0 {
        log::warn!(
            "coordination {z} is not reachable exactly with {np} pores; keeping {target_nt} throats"
        );
    }

    let mut order: Vec<usize> = (0..nt).collect();
    let mut rng = SmallRng::seed_from_u64(options.rng_seed);
    order.shuffle(&mut rng);

    let mut uf = UnionFind::new(np);
    let mut in_forest = vec![false; nt];
    let conns = net.conns();
    for &t in &order {
        let [a, b] = conns[t];
        in_forest[t] = uf.union(a, b);
    }
    let forest = in_forest.iter().filter(|&&f| f).count();
    if target_nt < forest {
        return Err(NetworkError::invalid(format!(
            "target coordination {z} needs {target_nt} throats but {forest} keep the network connected"
        )));
    }

    let mut to_remove = nt - target_nt;
    let mut degree = net.degrees();
    let mut removed = vec![false; nt];
    let candidates: Vec<usize> = order.into_iter().filter(|&t| !in_forest[t]).collect();
    for prefer_high in [true, false] {
        for &t in &candidates {
            if to_remove == 0 {
                break;
            }
            if removed[t] {
                continue;
            }
            let [a, b] = conns[t];
            if prefer_high && !(degree[a] as f64 > z && degree[b] as f64 > z) {
                continue;
            }
            removed[t] = true;
            degree[a] -= 1;
            degree[b] -= 1;
            to_remove -= 1;
        }
    }

    let drop: Vec<usize> = (0..nt).filter(|&t| removed[t]).collect();
    if drop.is_empty() {
        log::debug!("reduce_coordination: already at the target");
        return Ok(drop);
    }
    net.apply(Edit {
        drop_throats: drop.clone(),
        ..Edit::default()
    })?;
    Ok(drop)
}
