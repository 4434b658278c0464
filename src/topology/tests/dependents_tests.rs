use crate::algs::extend::{extend, trim};
use crate::algs::merge::merge_networks;
use crate::network_error::NetworkError;
use crate::topology::dependent::{GeometryStore, PhaseStore};
use crate::topology::network::{Domain, Network};

/// 0 - 1 - 2 - 3 - 4 along x.
fn chain5() -> Network {
    let coords = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
    Network::new(coords, vec![[0, 1], [1, 2], [2, 3], [3, 4]]).unwrap()
}

#[test]
fn geometry_follows_trim() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = chain5();
    let mut geo = GeometryStore::new("geo", &net, vec![1, 3], vec![0, 3])?;
    geo.set_property(Domain::Pore, "diameter", vec![0.5, 0.7])?;
    geo.set_property(Domain::Throat, "length", vec![1.5, 2.5])?;
    let id = net.attach(Box::new(geo));

    trim(&mut net, &[1], &[])?;
    let geo = net.dependent::<GeometryStore>(id).ok_or("geometry missing")?;
    assert_eq!(geo.pores(), &[2]);
    assert_eq!(geo.values::<f64>(Domain::Pore, "diameter")?, &[0.7]);
    // throat [0, 1] went with pore 1; [3, 4] is now throat 1
    assert_eq!(geo.throats(), &[1]);
    assert_eq!(geo.values::<f64>(Domain::Throat, "length")?, &[2.5]);
    Ok(())
}

#[test]
fn geometry_ignores_growth() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = chain5();
    let id = net.attach(Box::new(GeometryStore::new("geo", &net, vec![0], vec![])?));
    extend(&mut net, &[[5.0, 0.0, 0.0]], &[[4, 5]], &[])?;
    assert_eq!(net.np(), 6);
    let geo = net.dependent::<GeometryStore>(id).ok_or("geometry missing")?;
    assert_eq!(geo.pores(), &[0]);
    Ok(())
}

#[test]
fn phase_rejects_growth_and_leaves_network_untouched() {
    let mut net = chain5();
    net.attach(Box::new(PhaseStore::new("water", &net)));
    let before = (net.coords().to_vec(), net.conns().to_vec(), net.store().clone());

    let err = extend(&mut net, &[[5.0, 0.0, 0.0]], &[[4, 5]], &[]).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::ResizeRejected { domain: Domain::Pore, old_count: 5, new_count: 6, .. }
    ));
    assert_eq!(before, (net.coords().to_vec(), net.conns().to_vec(), net.store().clone()));

    let donor = chain5();
    assert!(matches!(
        merge_networks(&mut net, donor),
        Err(NetworkError::ResizeRejected { .. })
    ));
    assert_eq!(net.np(), 5);
}

#[test]
fn phase_compacts_on_trim() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = chain5();
    let mut phase = PhaseStore::new("water", &net);
    phase.set_property(Domain::Pore, "pressure", vec![0.0, 1.0, 2.0, 3.0, 4.0])?;
    let id = net.attach(Box::new(phase));

    trim(&mut net, &[0, 4], &[])?;
    let phase = net.dependent::<PhaseStore>(id).ok_or("phase missing")?;
    assert_eq!(phase.count(Domain::Pore), 3);
    assert_eq!(phase.count(Domain::Throat), 2);
    assert_eq!(phase.values::<f64>(Domain::Pore, "pressure")?, &[1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn detached_dependents_stop_following() -> Result<(), Box<dyn std::error::Error>> {
    let mut net = chain5();
    let id = net.attach(Box::new(PhaseStore::new("water", &net)));
    assert_eq!(net.num_dependents(), 1);
    let dep = net.detach(id).ok_or("not attached")?;
    assert_eq!(dep.name(), "water");
    assert_eq!(net.num_dependents(), 0);
    assert!(net.detach(id).is_none());
    extend(&mut net, &[[5.0, 0.0, 0.0]], &[], &[])?;
    assert_eq!(net.np(), 6);
    Ok(())
}
