//! Synthetic constellations and receiver measurements
use hifitime::Unit;

use crate::{
    constants::{L1_FREQUENCY_HZ, NANOS_PER_WEEK, SPEED_OF_LIGHT_M_S},
    prelude::*,
    time::time_of_week,
};

/// Reference receiver location
pub const ROVER_REFERENCE_COORDS_ECEF_M: (f64, f64, f64) = (4510731.0, 482872.0, 4473531.5);

/// GPS week of the reference epoch
pub const REFERENCE_WEEK: u32 = 2200;

/// Time of week (ns) of the reference epoch
pub const REFERENCE_TOW_NANOS: i64 = 302_400_500_000_000;

/// Arbitrary receiver hardware counter value at the reference epoch (ns)
pub const REFERENCE_TIME_NANOS: i64 = 5_000_000_000_000;

pub fn rover() -> Position {
    let (x, y, z) = ROVER_REFERENCE_COORDS_ECEF_M;
    Position::from_ecef(Vector3::new(x, y, z))
}

/// [ReceiverClock] that resolves to the reference epoch
pub fn reference_clock() -> ReceiverClock {
    let gps_nanos = REFERENCE_WEEK as i64 * NANOS_PER_WEEK + REFERENCE_TOW_NANOS;
    ReceiverClock {
        time_nanos: REFERENCE_TIME_NANOS,
        full_bias_nanos: Some(REFERENCE_TIME_NANOS - gps_nanos),
        bias_nanos: 0.0,
    }
}

/// Reference epoch, in GPST
pub fn reference_epoch() -> Epoch {
    Epoch::from_time_of_week(
        REFERENCE_WEEK,
        REFERENCE_TOW_NANOS as u64,
        TimeScale::GPST,
    )
}

/// Builds a realistic, healthy, Kepler [Ephemeris] frame.
/// `toe` is converted to the [SV] timescale.
pub fn kepler_ephemeris(sv: SV, toe: Epoch, omega0_rad: f64, m0_rad: f64) -> Ephemeris {
    let timescale = sv.constellation.timescale().unwrap_or(TimeScale::GPST);
    let toe = toe.to_time_scale(timescale);
    let (week, _) = time_of_week(toe, timescale);

    let (sqrt_a, i0_rad) = match sv.constellation {
        Constellation::Galileo => (5440.6, 56.0_f64.to_radians()),
        _ => (5153.7, 55.0_f64.to_radians()),
    };

    Ephemeris {
        sv,
        toe,
        toc: toe,
        week,
        sqrt_a,
        eccentricity: 0.01,
        m0_rad,
        dn_rad: 4.5E-9,
        i0_rad,
        idot_rad_s: 1.0E-10,
        omega0_rad,
        omega_rad: 0.5,
        omega_dot_rad_s: -8.0E-9,
        cus_cuc_rad: (5.0E-6, -1.0E-6),
        cis_cic_rad: (1.0E-7, -5.0E-8),
        crs_crc_m: (20.0, 250.0),
        clock_polynomials: (0.0, 0.0, 0.0),
        tgd_s: 0.0,
        health: 0,
        fit_interval_h: 4.0,
        iode: 1,
        iodc: 1,
    }
}

/// Walker like constellation: 10 planes of 6 satellites
pub fn walker_constellation(constellation: Constellation, toe: Epoch) -> Vec<Ephemeris> {
    use std::f64::consts::PI;
    let mut frames = Vec::with_capacity(60);
    for plane in 0..10 {
        for slot in 0..6 {
            let sv = SV::new(constellation, (plane * 6 + slot + 1) as u8);
            let omega0 = plane as f64 * 2.0 * PI / 10.0;
            let m0 = slot as f64 * 2.0 * PI / 6.0 + plane as f64 * PI / 30.0;
            frames.push(kepler_ephemeris(sv, toe, omega0, m0));
        }
    }
    frames
}

/// Geometric range (m) and transmission position, for a signal
/// received at `t_rx` by `rx`, solved by light time iteration.
pub fn geometric_range(eph: &Ephemeris, t_rx: Epoch, rx: &Position) -> (f64, Vector3<f64>) {
    let mut range = 0.075 * SPEED_OF_LIGHT_M_S;
    let mut position = Vector3::zeros();
    for _ in 0..5 {
        let t_tx = t_rx - (range / SPEED_OF_LIGHT_M_S) * Unit::Second;
        position = eph.resolve_state(t_tx).unwrap().0;
        range = (position - rx.ecef()).norm();
    }
    (range, position)
}

/// [Measurement] at the reference epoch, carrying this pseudo range (m)
pub fn measurement(sv: SV, pseudo_range_m: f64) -> Measurement {
    let dt_nanos = pseudo_range_m / SPEED_OF_LIGHT_M_S * 1.0E9;
    let whole = dt_nanos.floor();
    Measurement {
        sv,
        carrier_frequency_hz: Some(L1_FREQUENCY_HZ),
        cn0_dbhz: 45.0,
        state: MeasurementState::CODE_LOCK | MeasurementState::TOW_DECODED,
        received_sv_time_nanos: REFERENCE_TOW_NANOS - whole as i64,
        time_offset_nanos: dt_nanos - whole,
    }
}

/// Builds the [MeasurementEvent] a perfect receiver located at `rx`
/// would report at the reference epoch, for all [SV]s whose elevation
/// satisfies `keep`. The receiver clock bias (m) applies to all pseudo ranges.
/// Returns the event and the (SV, elevation) of each measurement.
pub fn synthetic_event<F: Fn(f64) -> bool>(
    ephemeris: &[Ephemeris],
    rx: &Position,
    clock_bias_m: f64,
    keep: F,
) -> (MeasurementEvent, Vec<(SV, f64)>) {
    let t_rx = reference_epoch();
    let mut measurements = Vec::new();
    let mut visible = Vec::new();

    for eph in ephemeris.iter() {
        let (range, position) = geometric_range(eph, t_rx, rx);
        let (elevation, _) = rx.elevation_azimuth(&position);
        if !keep(elevation) {
            continue;
        }
        measurements.push(measurement(eph.sv, range + clock_bias_m));
        visible.push((eph.sv, elevation));
    }

    (
        MeasurementEvent {
            clock: reference_clock(),
            measurements,
        },
        visible,
    )
}

/// Fully resolved [SatelliteObservation], as the solver expects it:
/// the satellite sits at this ECEF position with a perfect clock.
pub fn resolved_observation(
    sv: SV,
    sv_position: Vector3<f64>,
    rx: &Position,
    clock_bias_m: f64,
    cn0_dbhz: f64,
) -> SatelliteObservation {
    let range = (sv_position - rx.ecef()).norm();
    let mut obs = SatelliteObservation::new(
        sv,
        "L1",
        Some(range + clock_bias_m),
        cn0_dbhz,
        Some(L1_FREQUENCY_HZ),
    );
    obs.state = Some(SatelliteState {
        sv,
        t_tx: reference_epoch(),
        position: sv_position,
        velocity: Vector3::zeros(),
        clock_bias_s: 0.0,
        clock_drift_s_s: 0.0,
    });
    obs.elevation_azimuth_deg = Some(rx.elevation_azimuth(&sv_position));
    obs
}

/// Six well spread satellites (geodetic ddeg) above the reference rover
pub const SKY_PLOT_DDEG: [(f64, f64); 6] = [
    (44.0, 6.0),
    (65.0, -20.0),
    (25.0, 30.0),
    (40.0, -35.0),
    (60.0, 50.0),
    (15.0, -5.0),
];

/// Satellite ECEF position, at GPS altitude above this location
pub fn sv_above(lat_ddeg: f64, lon_ddeg: f64) -> Vector3<f64> {
    Position::from_geo_ddeg(lat_ddeg, lon_ddeg, 20_200_000.0).ecef()
}
