use crate::{
    bias::{BiasRuntime, Correction},
    constants::{EARTH_GRAVITATION_MU_M3_S2, SPEED_OF_LIGHT_M_S},
    prelude::Vector3,
};

/// Relativistic path range delay, due to space time curvature
/// along the signal path (a few centimeters at most).
#[derive(Debug, Default, Copy, Clone)]
pub struct ShapiroDelay;

impl ShapiroDelay {
    /// Shapiro delay (m) between these two ECEF positions (m)
    pub fn delay_m(sv: &Vector3<f64>, rx: &Vector3<f64>) -> f64 {
        let r_sv = sv.norm();
        let r_rx = rx.norm();
        let rho = (sv - rx).norm();
        2.0 * EARTH_GRAVITATION_MU_M3_S2 / SPEED_OF_LIGHT_M_S.powi(2)
            * ((r_sv + r_rx + rho) / (r_sv + r_rx - rho)).ln()
    }
}

impl Correction for ShapiroDelay {
    fn name(&self) -> &'static str {
        "shapiro"
    }
    fn correction_m(&self, rtm: &BiasRuntime) -> f64 {
        Self::delay_m(&rtm.sv_position, &rtm.rx.ecef())
    }
}
