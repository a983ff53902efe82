use crate::{
    prelude::*,
    tests::{init_logger, reference_epoch, resolved_observation, rover, sv_above, SKY_PLOT_DDEG},
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

fn sky(clock_bias_m: f64) -> Vec<SatelliteObservation> {
    let rx = rover();
    SKY_PLOT_DDEG
        .iter()
        .enumerate()
        .map(|(i, (lat, lon))| {
            resolved_observation(
                SV::new(Constellation::GPS, i as u8 + 1),
                sv_above(*lat, *lon),
                &rx,
                clock_bias_m,
                35.0 + 2.0 * i as f64,
            )
        })
        .collect()
}

fn apriori(offset: (f64, f64, f64)) -> Position {
    let (dx, dy, dz) = offset;
    Position::from_ecef(rover().ecef() + Vector3::new(dx, dy, dz))
}

fn solve(
    opts: SolverOpts,
    apriori: &Position,
    observations: &[SatelliteObservation],
) -> Result<PVTSolution, Error> {
    let refs = observations.iter().collect::<Vec<_>>();
    Solver::new(opts).solve(reference_epoch(), TimeScale::GPST, apriori, &refs)
}

#[rstest]
#[case((0.0, 0.0, 0.0))]
#[case((1000.0, -2000.0, 500.0))]
#[case((-50_000.0, 20_000.0, 80_000.0))]
fn noiseless_convergence(#[case] offset: (f64, f64, f64)) {
    init_logger();
    let solution = solve(SolverOpts::default(), &apriori(offset), &sky(0.0)).unwrap();

    assert!(solution.converged);
    let err = (solution.position().ecef() - rover().ecef()).norm();
    assert!(err < 1.0E-3, "position error {}m", err);
    assert!(solution.clock_bias_m.abs() < 1.0E-3);

    for contrib in solution.sv.iter() {
        assert!(contrib.residual_m.abs() < 1.0E-3, "{}", contrib.unique_id);
    }
}

#[rstest]
#[case(Weighting::Uniform)]
#[case(Weighting::Snr(SnrWeighting::default()))]
fn receiver_clock_bias(#[case] weighting: Weighting) {
    init_logger();
    let opts = SolverOpts {
        weighting,
        ..Default::default()
    };

    let solution = solve(opts, &apriori((3000.0, -2000.0, 1000.0)), &sky(10.0)).unwrap();

    let err = (solution.position().ecef() - rover().ecef()).norm();
    assert!(err < 1.0E-2, "position error {}m", err);
    assert!((solution.clock_bias_m - 10.0).abs() < 1.0E-2);
    assert!(solution.iterations > 1);

    // Duration resolves whole nanoseconds
    let offset = solution.clock_offset().to_seconds();
    assert!((offset - 10.0 / 299_792_458.0).abs() < 1.0E-9);
}

#[test]
fn solution_content() {
    init_logger();
    let solution = solve(
        SolverOpts::default(),
        &apriori((100.0, 100.0, 100.0)),
        &sky(0.0),
    )
    .unwrap();

    assert_eq!(solution.t, reference_epoch());
    assert_eq!(solution.timescale, TimeScale::GPST);
    assert_eq!(solution.week, crate::tests::REFERENCE_WEEK);
    assert!((solution.tow_s - 302_400.5).abs() < 1.0E-6);
    assert_eq!(solution.sv.len(), 6);
    assert_eq!(solution.sv[0].unique_id, "G1_L1");

    let (lat, lon, _) = solution.lat_long_alt_deg_deg_m;
    assert!((lat - 44.79).abs() < 0.1, "latitude {}", lat);
    assert!((lon - 6.11).abs() < 0.1, "longitude {}", lon);

    let dop = solution.dop;
    for value in [dop.gdop, dop.pdop, dop.hdop, dop.vdop, dop.tdop] {
        assert!(value.is_finite() && value > 0.0);
    }
    assert!(dop.gdop >= dop.pdop);
    assert!(dop.pdop >= dop.hdop);
    assert!(dop.pdop >= dop.vdop);
    assert!(((dop.hdop.powi(2) + dop.vdop.powi(2)).sqrt() - dop.pdop).abs() < 1.0E-6);
}

#[test]
fn noisy_measurements() {
    init_logger();
    let mut rng = SmallRng::seed_from_u64(42);
    let mut observations = sky(25.0);
    for obs in observations.iter_mut() {
        if let Some(pr) = obs.pseudo_range_m.as_mut() {
            *pr += rng.random_range(-1.0..1.0);
        }
    }

    let solution = solve(
        SolverOpts::default(),
        &apriori((500.0, 500.0, 500.0)),
        &observations,
    )
    .unwrap();
    assert!(solution.converged);

    let err = (solution.position().ecef() - rover().ecef()).norm();
    // meter level noise, DOP in the few units
    assert!(err < 30.0, "position error {}m", err);
}

#[test]
fn corrections_are_accounted_for() {
    init_logger();
    let mut observations = sky(0.0);
    for obs in observations.iter_mut() {
        let report = CorrectionReport {
            terms: vec![("tropo", 2.5), ("iono", 4.0)],
        };
        if let Some(pr) = obs.pseudo_range_m.as_mut() {
            *pr += report.total_m();
        }
        obs.corrections = Some(report);
    }

    let solution = solve(
        SolverOpts::default(),
        &apriori((10.0, 10.0, 10.0)),
        &observations,
    )
    .unwrap();
    let err = (solution.position().ecef() - rover().ecef()).norm();
    assert!(err < 1.0E-3, "position error {}m", err);
    assert!(solution.clock_bias_m.abs() < 1.0E-3);
    assert_eq!(solution.sv[0].correction_m, 6.5);
}

#[test]
fn satellite_clock_is_accounted_for() {
    init_logger();
    let mut observations = sky(0.0);
    for obs in observations.iter_mut() {
        let state = obs.state.as_mut().unwrap();
        state.clock_bias_s = 1.0E-6;
        if let Some(pr) = obs.pseudo_range_m.as_mut() {
            // satellite clock ahead: signal looks shorter
            *pr -= state.clock_range_m();
        }
    }
    let solution = solve(
        SolverOpts::default(),
        &apriori((10.0, 10.0, 10.0)),
        &observations,
    )
    .unwrap();
    let err = (solution.position().ecef() - rover().ecef()).norm();
    assert!(err < 1.0E-3, "position error {}m", err);
}

#[rstest]
#[case(0)]
#[case(4)]
fn not_enough_candidates(#[case] count: usize) {
    let observations = sky(0.0).into_iter().take(count).collect::<Vec<_>>();
    assert_eq!(
        solve(SolverOpts::default(), &rover(), &observations),
        Err(Error::NotEnoughCandidates(count))
    );
}

#[test]
fn unresolved_observations_are_not_candidates() {
    let mut observations = sky(0.0);
    observations[0].state = None;
    observations[1].pseudo_range_m = None;
    assert_eq!(
        solve(SolverOpts::default(), &rover(), &observations),
        Err(Error::NotEnoughCandidates(4))
    );

    let opts = SolverOpts {
        min_sv: 4,
        ..Default::default()
    };
    assert!(solve(opts, &apriori((100.0, 0.0, 0.0)), &observations).is_ok());
}

#[test]
fn iteration_cap() {
    init_logger();
    let opts = SolverOpts {
        max_iterations: 1,
        ..Default::default()
    };
    let solution = solve(opts, &apriori((-50_000.0, 20_000.0, 80_000.0)), &sky(0.0)).unwrap();
    assert!(!solution.converged, "best estimate is still returned");
    assert_eq!(solution.iterations, 1);
}

#[test]
fn masked_satellite_does_not_contribute() {
    init_logger();
    let rx = rover();
    let observations = sky(0.0);

    let mut low = resolved_observation(
        SV::new(Constellation::GPS, 30),
        sv_above(-21.8, 6.1),
        &rx,
        0.0,
        45.0,
    );
    // grossly wrong pseudo range
    low.pseudo_range_m = low.pseudo_range_m.map(|pr| pr + 1000.0);

    let mut all = observations.clone();
    all.push(low);

    let epoch = EpochObservations {
        constellation: Constellation::GPS,
        t: reference_epoch(),
        week: 0,
        tow_s: 0.0,
        used: all,
        unused: Vec::new(),
        visible_not_used: 0,
    }
    .apply_mask(20.0);

    assert_eq!(epoch.unused.len(), 1);

    let reference = solve(
        SolverOpts::default(),
        &apriori((10.0, 0.0, 0.0)),
        &observations,
    )
    .unwrap();
    let masked = solve(SolverOpts::default(), &apriori((10.0, 0.0, 0.0)), &epoch.used).unwrap();
    assert_eq!(reference.pos_m, masked.pos_m);
    assert_eq!(masked.sv.len(), 6);
}
