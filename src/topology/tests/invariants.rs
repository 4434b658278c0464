#![cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]

use crate::debug_invariants::DebugInvariants;
use crate::network_error::NetworkError;
use crate::topology::network::{Domain, Network};

fn chain() -> Network {
    Network::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], vec![[0, 1], [1, 2]]).unwrap()
}

#[test]
fn healthy_network_passes() {
    let net = chain();
    net.debug_assert_invariants();
    assert!(net.validate_invariants().is_ok());
}

#[test]
#[should_panic]
fn dangling_throat_panics_in_debug() {
    let mut net = chain();
    net.conns[1] = [1, 7];
    net.debug_assert_invariants();
}

#[test]
#[should_panic]
fn store_out_of_step_panics_in_debug() {
    let mut net = chain();
    net.coords.push([3.0, 0.0, 0.0]);
    net.debug_assert_invariants();
}

#[test]
fn extra_coordinate_is_reported_as_length_mismatch() {
    let mut net = chain();
    net.coords.push([3.0, 0.0, 0.0]);
    assert!(matches!(
        net.validate_invariants(),
        Err(NetworkError::LengthMismatch { domain: Domain::Pore, expected: 3, found: 4, .. })
    ));
}
