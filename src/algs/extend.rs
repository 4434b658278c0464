//! Adding and removing pores and throats.

use crate::network_error::NetworkError;
use crate::topology::edit::{Edit, EditOutcome, IndexMap};
use crate::topology::network::Network;

/// Pore and throat index maps reported by [`trim`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimReport {
    pub pores: IndexMap,
    pub throats: IndexMap,
}

/// Append pores and throats; `throat_conns` may reference the new pores.
///
/// Existing property arrays are padded on the new rows and `labels` is set on
/// every new pore and throat.
pub fn extend(
    net: &mut Network,
    pore_coords: &[[f64; 3]],
    throat_conns: &[[usize; 2]],
    labels: &[&str],
) -> Result<EditOutcome, NetworkError> {
    if pore_coords.is_empty() && throat_conns.is_empty() {
        return Err(NetworkError::EmptySelection("extend"));
    }
    let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
    net.apply(Edit {
        new_coords: pore_coords.to_vec(),
        new_conns: throat_conns.to_vec(),
        pore_labels: if pore_coords.is_empty() { Vec::new() } else { labels.clone() },
        throat_labels: if throat_conns.is_empty() { Vec::new() } else { labels },
        ..Edit::default()
    })
}

/// Remove pores (with every incident throat) and throats.
pub fn trim(net: &mut Network, pores: &[usize], throats: &[usize]) -> Result<TrimReport, NetworkError> {
    if pores.is_empty() && throats.is_empty() {
        return Err(NetworkError::EmptySelection("trim"));
    }
    net.check_pores(pores)?;
    net.check_throats(throats)?;
    let out = net.apply(Edit {
        drop_pores: pores.to_vec(),
        drop_throats: throats.to_vec(),
        ..Edit::default()
    })?;
    Ok(TrimReport {
        pores: out.pore_map,
        throats: out.throat_map,
    })
}
