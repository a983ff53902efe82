use crate::{
    bias::{BiasRuntime, Correction},
    constants::{L1_FREQUENCY_HZ, SPEED_OF_LIGHT_M_S},
    prelude::TimeScale,
    time::time_of_week,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Broadcast ionosphere models
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IonosphereModel {
    /// No model was broadcast: ionosphere delay is not compensated
    #[default]
    Unknown,
    /// Klobuchar model
    Klobuchar(KbModel),
}

impl IonosphereModel {
    /// Returns ionosphere delay (m) for this [BiasRuntime],
    /// 0 when no model is known.
    pub fn delay_m(&self, rtm: &BiasRuntime) -> f64 {
        match self {
            Self::Unknown => 0.0,
            Self::Klobuchar(kb) => kb.delay_m(rtm),
        }
    }
}

/// Klobuchar Model
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KbModel {
    /// alpha coefficients (s, s/semi-circle, s/semi-circle², s/semi-circle³)
    pub alpha: (f64, f64, f64, f64),
    /// beta coefficients (s, s/semi-circle, s/semi-circle², s/semi-circle³)
    pub beta: (f64, f64, f64, f64),
}

impl KbModel {
    /// Klobuchar delay (m), for this [BiasRuntime],
    /// scaled from L1 to the signal frequency.
    pub fn delay_m(&self, rtm: &BiasRuntime) -> f64 {
        use std::f64::consts::PI;

        let geo = rtm.rx.geodetic();

        // semi-circles
        let (phi_u, lambda_u) = (geo[0] / PI, geo[1] / PI);
        let elev = rtm.elevation_deg() / 180.0;
        let azim = rtm.azimuth_deg().to_radians();

        let (_, t_gpst) = time_of_week(rtm.t, TimeScale::GPST);

        // earth centered angle
        let psi = 0.0137 / (elev + 0.11) - 0.022;

        let phi_i = (phi_u + psi * azim.cos()).clamp(-0.416, 0.416);
        let lambda_i = lambda_u + psi * azim.sin() / (phi_i * PI).cos();

        // geomagnetic latitude
        let phi_m = phi_i + 0.064 * ((lambda_i - 1.617) * PI).cos();

        let t = (43.2E3 * lambda_i + t_gpst).rem_euclid(86.4E3);

        let a_i = (self.alpha.0
            + self.alpha.1 * phi_m
            + self.alpha.2 * phi_m.powi(2)
            + self.alpha.3 * phi_m.powi(3))
        .max(0.0);

        let p_i = (self.beta.0
            + self.beta.1 * phi_m
            + self.beta.2 * phi_m.powi(2)
            + self.beta.3 * phi_m.powi(3))
        .max(72.0E3);

        let x_i = 2.0 * PI * (t - 50400.0) / p_i;

        // obliquity factor
        let f = 1.0 + 16.0 * (0.53 - elev).powi(3);

        let delay_s = if x_i.abs() < 1.57 {
            f * (5.0E-9 + a_i * (1.0 - x_i.powi(2) / 2.0 + x_i.powi(4) / 24.0))
        } else {
            f * 5.0E-9
        };

        delay_s * SPEED_OF_LIGHT_M_S * (L1_FREQUENCY_HZ / rtm.frequency_hz).powi(2)
    }
}

/// [IonosphereDelay] applies the broadcast [IonosphereModel] of the runtime.
#[derive(Debug, Default, Copy, Clone)]
pub struct IonosphereDelay;

impl Correction for IonosphereDelay {
    fn name(&self) -> &'static str {
        "iono"
    }
    fn correction_m(&self, rtm: &BiasRuntime) -> f64 {
        rtm.ionosphere.delay_m(rtm)
    }
}
