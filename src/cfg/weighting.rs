#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Carrier to noise density ratio based variance model:
/// σ² = a² + b² x 10^(-C/N0 / 10).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnrWeighting {
    /// Constant term (in [m])
    pub a: f64,
    /// Signal quality dependent term (in [m.Hz^1/2])
    pub b: f64,
}

impl Default for SnrWeighting {
    fn default() -> Self {
        Self { a: 0.3, b: 300.0 }
    }
}

impl SnrWeighting {
    /// Measurement variance (in [m²]) for this C/N0 (in [dB.Hz])
    pub(crate) fn variance(&self, cn0_dbhz: f64) -> f64 {
        self.a.powi(2) + self.b.powi(2) * 10.0_f64.powf(-cn0_dbhz / 10.0)
    }
}

/// Measurement weighting strategy, applied to the diagonal weight matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Weighting {
    /// All measurements contribute equally
    Uniform,
    /// Weight derived from signal strength: stronger signals contribute more.
    Snr(SnrWeighting),
}

impl Default for Weighting {
    fn default() -> Self {
        Self::Snr(SnrWeighting::default())
    }
}

impl Weighting {
    /// Returns the weight of a measurement with this C/N0 (in [dB.Hz])
    pub(crate) fn weight(&self, cn0_dbhz: f64) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Snr(snr) => 1.0 / snr.variance(cn0_dbhz),
        }
    }
}
