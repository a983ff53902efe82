use crate::{
    bias::{BiasRuntime, Correction},
    cfg::Error,
    constants::{STANDARD_PRESSURE_MBAR, STANDARD_TEMPERATURE_K},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Saastamoinen model is not defined above this altitude (m)
const SAASTAMOINEN_MAX_HEIGHT_M: f64 = 5000.0;

/// Saastamoinen B correction term, tabulated against height (m)
const SAASTAMOINEN_B_LUT: [(f64, f64); 9] = [
    (0.0, 1.156),
    (500.0, 1.079),
    (1000.0, 1.006),
    (1500.0, 0.938),
    (2000.0, 0.874),
    (2500.0, 0.813),
    (3000.0, 0.757),
    (4000.0, 0.654),
    (5000.0, 0.563),
];

/// Troposphere delay models
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TropoModel {
    /// Saastamoinen model with standard atmosphere
    #[default]
    Saastamoinen,
    /// Niel mapping of a standard zenith delay
    Niel,
}

impl std::str::FromStr for TropoModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<TropoModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "saastamoinen" | "saas" => Ok(TropoModel::Saastamoinen),
            "niel" => Ok(TropoModel::Niel),
            _ => Err(Error::UnknownTropoModel(c)),
        }
    }
}

impl Correction for TropoModel {
    fn name(&self) -> &'static str {
        "tropo"
    }
    fn correction_m(&self, rtm: &BiasRuntime) -> f64 {
        let height_m = rtm.rx.altitude();
        match self {
            Self::Saastamoinen => saastamoinen_m(height_m, rtm.elevation_deg()),
            Self::Niel => niel_m(height_m, rtm.elevation_deg()),
        }
    }
}

/// Saastamoinen troposphere delay (m) for a receiver at this altitude (m),
/// observing a satellite at this elevation (degrees).
/// Returns 0 above 5000m, where the model is not valid.
pub fn saastamoinen_m(height_m: f64, elevation_deg: f64) -> f64 {
    const RELATIVE_HUMIDITY: f64 = 50.0;

    if height_m > SAASTAMOINEN_MAX_HEIGHT_M {
        return 0.0;
    }

    let mut elev = elevation_deg.abs().to_radians();
    if elev == 0.0 {
        elev += 0.01;
    }

    let p = STANDARD_PRESSURE_MBAR * (1.0 - 0.0000226 * height_m).powf(5.225);
    let t = STANDARD_TEMPERATURE_K - 0.0065 * height_m;
    let h = RELATIVE_HUMIDITY * (-0.0006396 * height_m).exp();

    let b = saastamoinen_b(height_m);

    let e = 0.01 * h * (-37.2465 + 0.213166 * t - 0.000256908 * t.powi(2)).exp();

    let sin_el = elev.sin();
    let tan2_el = elev.tan().powi(2);

    0.002277 / sin_el * (p - b / tan2_el) + 0.002277 / sin_el * (1255.0 / t + 0.05) * e
}

/// Piecewise linear interpolation of the B term, clamped below the first entry
fn saastamoinen_b(height_m: f64) -> f64 {
    if height_m < SAASTAMOINEN_B_LUT[0].0 {
        return SAASTAMOINEN_B_LUT[0].1;
    }
    SAASTAMOINEN_B_LUT
        .windows(2)
        .find(|w| height_m <= w[1].0)
        .map(|w| {
            let ((h0, b0), (h1, b1)) = (w[0], w[1]);
            b0 + (b1 - b0) * (height_m - h0) / (h1 - h0)
        })
        .unwrap_or(SAASTAMOINEN_B_LUT[SAASTAMOINEN_B_LUT.len() - 1].1)
}

/// Standard zenith delay mapped with the Niel mapping function (m)
pub fn niel_m(height_m: f64, elevation_deg: f64) -> f64 {
    const NS: f64 = 324.8;

    let elev = elevation_deg.to_radians();
    let h_km = height_m / 1000.0;

    let f = if elevation_deg < 90.0 {
        1.0_f64 / (elev.sin() + 0.00143 / (elev.tan() + 0.0455))
    } else {
        1.0
    };

    let delta_n = -7.32 * (0.005577 * NS).exp();

    let delta_r =
        (NS + 0.5 * delta_n - NS * h_km - 0.5 * delta_n * h_km.powi(2) + 1430.0 + 732.0) * 0.001;

    f * delta_r
}

#[cfg(test)]
mod test {
    use super::{saastamoinen_b, saastamoinen_m, TropoModel};
    use std::str::FromStr;

    #[test]
    fn b_term_interpolation() {
        assert_eq!(saastamoinen_b(-10.0), 1.156);
        assert_eq!(saastamoinen_b(0.0), 1.156);
        assert!((saastamoinen_b(250.0) - 1.1175).abs() < 1.0E-9);
        assert!((saastamoinen_b(5000.0) - 0.563).abs() < 1.0E-9);
    }

    #[test]
    fn zero_elevation_is_finite() {
        // horizon is nudged, the mapping is still out of its domain there
        for height_m in [-10.0, 0.0, 2500.0, 5000.0] {
            assert!(saastamoinen_m(height_m, 0.0).is_finite());
        }
        assert!(saastamoinen_m(0.0, 5.0) > 0.0);
    }

    #[test]
    fn tropo_model_parsing() {
        assert_eq!(
            TropoModel::from_str("Saastamoinen").unwrap(),
            TropoModel::Saastamoinen
        );
        assert_eq!(TropoModel::from_str(" niel ").unwrap(), TropoModel::Niel);
        assert!(TropoModel::from_str("unb3").is_err());
    }
}
