//! Per epoch satellite observations
use crate::{
    bias::CorrectionReport,
    error::Error,
    orbit::SatelliteState,
    prelude::SV,
};

/// Reason why an [SV] does not contribute to the solution, for one epoch
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionCause {
    /// Receiver state does not allow forming a pseudo range
    InvalidState,
    /// No valid ephemeris frame
    MissingEphemeris,
    /// Closest ephemeris frame is flagged unhealthy
    Unhealthy,
    /// Orbital state could not be resolved
    Propagation(Error),
    /// No receiver position to compute the topocentric geometry from
    NoApriori,
    /// Elevation (degrees) is below the constellation mask
    ElevationMask(f64),
}

impl std::fmt::Display for ExclusionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidState => write!(f, "invalid receiver state"),
            Self::MissingEphemeris => write!(f, "failed getting ephemeris data"),
            Self::Unhealthy => write!(f, "unhealthy satellite"),
            Self::Propagation(e) => write!(f, "propagation failure: {}", e),
            Self::NoApriori => write!(f, "no receiver position"),
            Self::ElevationMask(elev) => write!(f, "below elevation mask ({:.1}°)", elev),
        }
    }
}

/// [SatelliteObservation] gathers everything we know about one [SV] for one epoch.
/// Each processing stage returns a new, further resolved, [SatelliteObservation].
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteObservation {
    /// [SV]
    pub sv: SV,
    /// Unique identifier, combining constellation, satellite and signal (like "G12_L1")
    pub unique_id: String,
    /// Pseudo range (m), when the receiver state allowed forming one
    pub pseudo_range_m: Option<f64>,
    /// Carrier to noise density ratio (dB.Hz)
    pub cn0_dbhz: f64,
    /// Carrier frequency (Hz), when reported
    pub carrier_frequency_hz: Option<f64>,
    /// [SatelliteState] at transmission time
    pub state: Option<SatelliteState>,
    /// (elevation, azimuth) in degrees, seen from the receiver
    pub elevation_azimuth_deg: Option<(f64, f64)>,
    /// Evaluated corrections
    pub corrections: Option<CorrectionReport>,
    /// Set when this [SV] is excluded
    pub exclusion: Option<ExclusionCause>,
}

impl SatelliteObservation {
    /// Builds a new [SatelliteObservation], prior any orbital resolution
    pub(crate) fn new(
        sv: SV,
        signal: &str,
        pseudo_range_m: Option<f64>,
        cn0_dbhz: f64,
        carrier_frequency_hz: Option<f64>,
    ) -> Self {
        Self {
            sv,
            unique_id: format!("{:x}{}_{}", sv.constellation, sv.prn, signal),
            pseudo_range_m,
            cn0_dbhz,
            carrier_frequency_hz,
            state: None,
            elevation_azimuth_deg: None,
            corrections: None,
            exclusion: if pseudo_range_m.is_some() {
                None
            } else {
                Some(ExclusionCause::InvalidState)
            },
        }
    }

    /// Copies and returns [Self] marked as excluded
    pub(crate) fn excluded(&self, cause: ExclusionCause) -> Self {
        let mut s = self.clone();
        s.exclusion = Some(cause);
        s
    }

    /// True if this [SV] may contribute to the solution
    pub fn is_used(&self) -> bool {
        self.exclusion.is_none()
    }

    /// Accumulated correction (m), 0 when not evaluated
    pub fn correction_m(&self) -> f64 {
        self.corrections
            .as_ref()
            .map(|report| report.total_m())
            .unwrap_or_default()
    }

    /// Elevation angle (degrees), when resolved
    pub fn elevation_deg(&self) -> Option<f64> {
        self.elevation_azimuth_deg.map(|(elev, _)| elev)
    }
}
