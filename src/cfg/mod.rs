use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bias::TropoModel,
    constants::L1_FREQUENCY_HZ,
    prelude::{Constellation, TimeScale},
};

mod weighting;
pub use weighting::{SnrWeighting, Weighting};

/// Configuration Error
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tropo model \"{0}\"")]
    UnknownTropoModel(String),
}

fn default_timescale() -> TimeScale {
    TimeScale::GPST
}

fn default_max_iter() -> usize {
    20
}

fn default_convergence_m() -> f64 {
    1.0E-4
}

fn default_min_sv() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_freq_tolerance() -> f64 {
    0.1E9
}

fn default_carrier() -> f64 {
    L1_FREQUENCY_HZ
}

fn default_constellations() -> Vec<ConstellationSetup> {
    vec![ConstellationSetup::gps_l1(), ConstellationSetup::galileo_e1()]
}

/// Iterative solver options
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct SolverOpts {
    /// Maximal number of Gauss-Newton iterations per epoch
    #[cfg_attr(feature = "serde", serde(default = "default_max_iter"))]
    pub max_iterations: usize,
    /// Iterations stop when the position correction norm drops below this value (in [m])
    #[cfg_attr(feature = "serde", serde(default = "default_convergence_m"))]
    pub convergence_m: f64,
    /// Minimal number of used vehicles to attempt a solution.
    /// 4 unknowns (3D position + clock) plus 1 for observability margin.
    #[cfg_attr(feature = "serde", serde(default = "default_min_sv"))]
    pub min_sv: usize,
    /// Measurement [Weighting] strategy
    #[cfg_attr(feature = "serde", serde(default))]
    pub weighting: Weighting,
    /// Iterate the signal transmission time to convergence, instead of
    /// the single light time correction pass. Only needed for sub centimetric
    /// orbital accuracy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub iterate_transmission_time: bool,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iter(),
            convergence_m: default_convergence_m(),
            min_sv: default_min_sv(),
            weighting: Weighting::default(),
            iterate_transmission_time: false,
        }
    }
}

/// Atmospherical, Physical and Environmental modeling
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Modeling {
    /// Compensate for onboard clock offset to system time (+/- 100km)
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub sv_clock_bias: bool,
    /// Compensate for onboard circuitry delay (+/- 1m)
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub sv_total_group_delay: bool,
    /// Compensate for relativistic effect on onboard clock (+/- 1m)
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub relativistic_clock_bias: bool,
    /// Compensate for relativistic effect on signal propagation,
    /// also known as Shapiro delay (+/- 0.1 m)
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub relativistic_path_range: bool,
    /// Compensate for troposphere negative impact (+/- 10m)
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub tropo_delay: bool,
    /// Compensate for ionosphere negative impact (+/- 10m).
    /// Requires a broadcast ionosphere model to be effective.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub iono_delay: bool,
    /// Compensate for Earth rotation during signal propagation
    /// (static +5/+10m eastern error).
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub earth_rotation: bool,
}

impl Default for Modeling {
    fn default() -> Self {
        Self {
            sv_clock_bias: true,
            sv_total_group_delay: true,
            relativistic_clock_bias: true,
            relativistic_path_range: true,
            tropo_delay: true,
            iono_delay: true,
            earth_rotation: true,
        }
    }
}

/// Per [Constellation] signal selection and masking
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ConstellationSetup {
    /// [Constellation] this setup applies to
    pub constellation: Constellation,
    /// Nominal carrier frequency (Hz). Measurements that report a carrier
    /// frequency outside of the tolerance band are disregarded.
    #[cfg_attr(feature = "serde", serde(default = "default_carrier"))]
    pub carrier_frequency_hz: f64,
    /// Tolerance band around the nominal carrier frequency (Hz)
    #[cfg_attr(feature = "serde", serde(default = "default_freq_tolerance"))]
    pub frequency_tolerance_hz: f64,
    /// Minimal SV elevation angle (in degrees) for an SV to contribute to the solution.
    pub min_elevation_deg: f64,
    /// Signal designation, used to form unique satellite identifiers
    pub signal: String,
}

impl ConstellationSetup {
    /// GPS L1 C/A setup, with 20° elevation mask
    pub fn gps_l1() -> Self {
        Self {
            constellation: Constellation::GPS,
            carrier_frequency_hz: L1_FREQUENCY_HZ,
            frequency_tolerance_hz: default_freq_tolerance(),
            min_elevation_deg: 20.0,
            signal: "L1".to_string(),
        }
    }
    /// Galileo E1 setup, with 15° elevation mask
    pub fn galileo_e1() -> Self {
        Self {
            constellation: Constellation::Galileo,
            carrier_frequency_hz: L1_FREQUENCY_HZ,
            frequency_tolerance_hz: default_freq_tolerance(),
            min_elevation_deg: 15.0,
            signal: "E1".to_string(),
        }
    }
    /// Returns true if this carrier frequency matches our signal
    pub(crate) fn frequency_match(&self, frequency_hz: f64) -> bool {
        (frequency_hz - self.carrier_frequency_hz).abs() < self.frequency_tolerance_hz
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Time scale in which we express the solutions,
    /// [TimeScale::GPST] is the default value.
    #[cfg_attr(feature = "serde", serde(default = "default_timescale"))]
    pub timescale: TimeScale,
    /// Enabled constellations, processed in this order.
    #[cfg_attr(feature = "serde", serde(default = "default_constellations"))]
    pub constellations: Vec<ConstellationSetup>,
    /// [TropoModel] used when troposphere delay compensation is enabled
    #[cfg_attr(feature = "serde", serde(default))]
    pub tropo_model: TropoModel,
    /// Atmospherical and Physical [Modeling] used to improve the accuracy of solution.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modeling: Modeling,
    /// Solver customization
    #[cfg_attr(feature = "serde", serde(default))]
    pub solver: SolverOpts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timescale: default_timescale(),
            constellations: default_constellations(),
            tropo_model: TropoModel::default(),
            modeling: Modeling::default(),
            solver: SolverOpts::default(),
        }
    }
}

impl Config {
    /// Returns a GPS L1 only [Config]. You can then customize [Self] as you will.
    pub fn gps_only() -> Self {
        let mut s = Self::default();
        s.constellations = vec![ConstellationSetup::gps_l1()];
        s
    }
    /// Returns a Galileo E1 only [Config]. You can then customize [Self] as you will.
    pub fn galileo_only() -> Self {
        let mut s = Self::default();
        s.constellations = vec![ConstellationSetup::galileo_e1()];
        s.timescale = TimeScale::GST;
        s
    }
    /// Returns [Config] with all atmospherical and physical models disabled.
    /// Mostly useful to analyze raw measurements.
    pub fn without_modeling(&self) -> Self {
        let mut s = self.clone();
        s.modeling = Modeling {
            sv_clock_bias: false,
            sv_total_group_delay: false,
            relativistic_clock_bias: false,
            relativistic_path_range: false,
            tropo_delay: false,
            iono_delay: false,
            earth_rotation: false,
        };
        s
    }
    /// Returns the [ConstellationSetup] for this [Constellation], if enabled
    pub fn setup(&self, constellation: Constellation) -> Option<&ConstellationSetup> {
        self.constellations
            .iter()
            .find(|setup| setup.constellation == constellation)
    }
}
