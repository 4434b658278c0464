use pore_topo::algs::{
    CloneMode, CoordinationOptions, DuplicatePolicy, FaceLabelOptions, PercolationMode,
    SurfaceOptions,
};
use pore_topo::data::{PropertyArray, PropertyKind};
use pore_topo::network_generation::{Connectivity, CubicTemplate};
use pore_topo::topology::{Domain, SetMode};
use serde::Serialize;
use serde::de::DeserializeOwned;

fn round_trip<T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug>(value: T) {
    let json = serde_json::to_string(&value).expect("serialize");
    let back: T = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, value, "{json}");
}

#[test]
fn option_structs_survive_json() {
    round_trip(CoordinationOptions { rng_seed: 7 });
    round_trip(FaceLabelOptions {
        tol: 0.25,
        surface_label: "skin".into(),
    });
    round_trip(SurfaceOptions {
        label: "outer".into(),
        grid_resolution: 64,
    });
    round_trip(CubicTemplate {
        connectivity: Connectivity::Eighteen,
    });
}

#[test]
fn enums_survive_json() {
    round_trip(CloneMode::Siblings);
    round_trip(DuplicatePolicy::Allow);
    round_trip(PercolationMode::Site);
    round_trip(SetMode::Xnor);
    round_trip(Domain::Throat);
    round_trip(PropertyKind::Vector(3));
}

#[test]
fn property_arrays_survive_json() {
    round_trip(PropertyArray::Bool(vec![true, false]));
    round_trip(PropertyArray::Int(vec![-1, 4]));
    round_trip(PropertyArray::from_rows(&[[1.0, 2.0], [3.0, 4.0]]));
}

#[test]
fn defaults_match_documentation() {
    assert_eq!(CoordinationOptions::default().rng_seed, 42);
    assert_eq!(FaceLabelOptions::default().tol, 0.0);
    assert_eq!(SurfaceOptions::default().label, "surface");
    assert_eq!(Connectivity::default(), Connectivity::Six);
    assert_eq!(PercolationMode::default(), PercolationMode::Bond);
}
