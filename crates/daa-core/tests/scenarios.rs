use daa_core::units::{from_deg, from_ft, from_knots, from_nmi};
use daa_core::{
    BandsRegion, CdCylinder, DaaMonitor, Detector, Dimension, KinematicBands, OwnshipState,
    Position, TrafficState, Vect3, Wcv, WcvTable,
};
use std::f64::consts::PI;

fn ownship_ok() -> TrafficState {
    TrafficState::new(
        "ownship",
        Position::lat_lon(33.95, -96.7, from_ft(8700.0)),
        Vect3::from_trk_gs_vs(from_deg(206.0), from_knots(151.0), 0.0),
    )
}

fn intruder_ok() -> TrafficState {
    TrafficState::new(
        "intruder",
        Position::lat_lon(33.8619, -96.7327, from_ft(9000.0)),
        Vect3::from_trk_gs_vs(0.0, from_knots(210.0), 0.0),
    )
}

fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(2.0 * PI);
    d.min(2.0 * PI - d)
}

#[test]
fn test_converging_geodetic_encounter() {
    let mut monitor = DaaMonitor::new();
    monitor.set_ownship_state(ownship_ok(), 0.0);
    let idx = monitor.add_traffic_state(intruder_ok(), 0.0);
    assert_eq!(idx, 1);

    let det = monitor.time_interval_of_violation(idx).unwrap();
    assert!(det.conflict());
    assert!(det.time_in() > 0.0);
    let t2v = monitor.time_to_violation(idx).unwrap().unwrap();
    assert!(t2v.is_finite() && t2v > 0.0 && t2v < 180.0);
    assert!(monitor.alerting(idx).unwrap() >= 1);

    let own = monitor.ownship_state().unwrap();
    let si = own.traffic_s(&monitor.traffic_state_at(idx, 0.0).unwrap());
    let bearing = si.x.atan2(si.y).rem_euclid(2.0 * PI);

    let mut bands = monitor.kinematic_bands().unwrap();
    let out = bands.bands(Dimension::Track).unwrap().clone();
    let near_towards_intruder = out.iter().any(|(iv, region)| {
        *region == BandsRegion::Near
            && [iv.low, iv.up, (iv.low + iv.up) / 2.0]
                .iter()
                .any(|&trk| angle_diff(trk, bearing) <= PI / 2.0)
    });
    assert!(near_towards_intruder, "{}", out);
}

#[test]
fn test_aircraft_inside_thresholds_are_in_violation() {
    let own = OwnshipState::new(TrafficState::new(
        "own",
        Position::xyz(0.0, 0.0, from_ft(5000.0)),
        Vect3::from_trk_gs_vs(0.0, from_knots(150.0), 0.0),
    ));
    let ac = TrafficState::new(
        "ac",
        Position::xyz(300.0, 600.0, from_ft(5200.0)),
        Vect3::from_trk_gs_vs(PI / 2.0, from_knots(120.0), 0.0),
    );
    let detectors: [Detector; 2] = [
        Wcv::taumod(WcvTable::default()).into(),
        CdCylinder::new(from_nmi(1.0), from_ft(1000.0)).into(),
    ];
    for det in detectors {
        let (so, vo) = (own.s(), own.v());
        let (si, vi) = (own.traffic_s(&ac), own.traffic_v(&ac));
        assert!(det.violation(&so, &vo, &si, &vi), "{}", det);
        let cd = det.conflict_detection(&so, &vo, &si, &vi, 0.0, 180.0);
        assert!(cd.conflict());
        assert_eq!(cd.time_in(), 0.0, "{}", det);
    }
}

#[test]
fn test_no_traffic_gives_full_none_bands() {
    let mut bands = KinematicBands::default();
    bands.set_recovery_bands(true);
    bands.set_ownship(OwnshipState::new(ownship_ok()));
    for dim in Dimension::ALL {
        let out = bands.bands(dim).unwrap().clone();
        assert_eq!(out.len(), 1, "{}", dim);
        assert_eq!(out.regions[0], BandsRegion::None);
        let (min, max) = bands.range(dim);
        assert_eq!((out.intervals[0].low, out.intervals[0].up), (min, max));
        assert_eq!(out.recovery_time, 0.0);
    }
}

#[test]
fn test_monitor_bands_follow_stale_traffic() {
    let mut monitor = DaaMonitor::new();
    monitor.set_ownship_state(ownship_ok(), 10.0);
    monitor.add_traffic_state(intruder_ok(), 10.0);
    let fresh = monitor.time_to_violation(1).unwrap().unwrap();

    // Observed 4 s before the ownship, so it has since closed in.
    let mut stale = DaaMonitor::new();
    stale.set_ownship_state(ownship_ok(), 10.0);
    stale.add_traffic_state(intruder_ok(), 6.0);
    let projected = stale.time_to_violation(1).unwrap().unwrap();
    assert!(projected < fresh);
}
