//! Satellite state at signal transmission time
use hifitime::Unit;
use log::debug;
use nalgebra::Rotation3;

use crate::{
    cfg::Modeling,
    constants::{EARTH_ANGULAR_VEL_RAD, MAX_PSEUDO_RANGE_M, SPEED_OF_LIGHT_M_S},
    ephemeris::Ephemeris,
    error::Error,
    prelude::{Epoch, Vector3, SV},
};

/// Transmission time refinement stops below this correction (s)
const TX_TIME_CONVERGENCE_S: f64 = 1.0E-12;

/// Maximal number of transmission time refinements
const TX_TIME_MAX_ITER: usize = 5;

/// [SatelliteState] of one [SV] at signal transmission time,
/// expressed in the ECEF frame at reception time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SatelliteState {
    /// [SV]
    pub sv: SV,
    /// Signal transmission [Epoch], in system time
    pub t_tx: Epoch,
    /// ECEF position (m)
    pub position: Vector3<f64>,
    /// ECEF velocity (m/s)
    pub velocity: Vector3<f64>,
    /// Onboard clock offset to system time (s), relativistic and group
    /// delay terms included when modeled.
    pub clock_bias_s: f64,
    /// Onboard clock drift (s.s⁻¹)
    pub clock_drift_s_s: f64,
}

impl SatelliteState {
    /// Returns the clock offset expressed as a range (m)
    pub fn clock_range_m(&self) -> f64 {
        self.clock_bias_s * SPEED_OF_LIGHT_M_S
    }
}

/// [Propagator] resolves [SatelliteState]s from [Ephemeris] frames,
/// at the time a signal was emitted.
#[derive(Debug, Copy, Clone, Default)]
pub struct Propagator {
    modeling: Modeling,
    iterate: bool,
}

impl Propagator {
    /// Builds a new [Propagator].
    /// When `iterate` is set, transmission time is refined until convergence,
    /// otherwise a single light time pass is performed.
    pub fn new(modeling: Modeling, iterate: bool) -> Self {
        Self { modeling, iterate }
    }

    /// Onboard clock offset (s) at this transmission [Epoch]
    fn clock_bias(&self, eph: &Ephemeris, t_tx: Epoch) -> Result<f64, Error> {
        let mut dt = 0.0;
        if self.modeling.sv_clock_bias {
            dt += eph.clock_correction(t_tx)?;
        }
        if self.modeling.relativistic_clock_bias {
            dt += eph.kepler(t_tx)?.dtr;
        }
        if self.modeling.sv_total_group_delay {
            dt -= eph.tgd_s;
        }
        Ok(dt)
    }

    /// Resolves [SatelliteState] for a signal received at `t_rx` (receiver time),
    /// with this pseudo range (m). `rx_clock_s` is the current receiver clock offset
    /// estimate (s), used to compute the earth rotation during signal flight.
    pub fn propagate(
        &self,
        eph: &Ephemeris,
        t_rx: Epoch,
        pseudo_range_m: f64,
        rx_clock_s: f64,
    ) -> Result<SatelliteState, Error> {
        if pseudo_range_m <= 0.0 {
            return Err(Error::PhysicalNonSenseRxPriorTx);
        }
        if pseudo_range_m > MAX_PSEUDO_RANGE_M {
            return Err(Error::PhysicalNonSenseRxTooLate);
        }

        // emission time, in SV time
        let t_tx_sv = t_rx - (pseudo_range_m / SPEED_OF_LIGHT_M_S) * Unit::Second;

        let mut clock_bias_s = self.clock_bias(eph, t_tx_sv)?;
        let mut t_tx = t_tx_sv - clock_bias_s * Unit::Second;

        if self.iterate {
            for _ in 0..TX_TIME_MAX_ITER {
                let refined = self.clock_bias(eph, t_tx)?;
                let delta = refined - clock_bias_s;
                clock_bias_s = refined;
                t_tx = t_tx_sv - clock_bias_s * Unit::Second;
                if delta.abs() < TX_TIME_CONVERGENCE_S {
                    break;
                }
            }
        }

        let kepler = eph.kepler(t_tx)?;
        let mut position = kepler.ecef_position();
        let mut velocity = kepler.ecef_velocity();

        if self.modeling.earth_rotation {
            let t_rx_true = t_rx - rx_clock_s * Unit::Second;
            let flight_s = (t_rx_true - t_tx).to_seconds();
            // frame rotates while the signal travels
            let rot = Rotation3::from_axis_angle(
                &Vector3::z_axis(),
                -EARTH_ANGULAR_VEL_RAD * flight_s,
            );
            position = rot * position;
            velocity = rot * velocity;
        }

        let clock_drift_s_s = if self.modeling.sv_clock_bias {
            let (_, a1, a2) = eph.clock_polynomials;
            let dt = (t_tx.to_time_scale(eph.toc.time_scale) - eph.toc).to_seconds();
            a1 + 2.0 * a2 * dt
        } else {
            0.0
        };

        debug!(
            "{}({}) - t_tx={} clock_bias={:.3E}s x={:.3}m y={:.3}m z={:.3}m",
            t_rx, eph.sv, t_tx, clock_bias_s, position[0], position[1], position[2]
        );

        Ok(SatelliteState {
            sv: eph.sv,
            t_tx,
            position,
            velocity,
            clock_bias_s,
            clock_drift_s_s,
        })
    }
}
