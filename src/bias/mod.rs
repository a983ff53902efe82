use itertools::Itertools;

use crate::{
    cfg::{Config, Modeling},
    position::Position,
    prelude::{Epoch, Vector3, SV},
};

pub(crate) mod tropo;
pub use tropo::TropoModel;

pub(crate) mod iono;
pub use iono::{IonosphereDelay, IonosphereModel, KbModel};

pub(crate) mod shapiro;
pub use shapiro::ShapiroDelay;

/// [BiasRuntime] reflects the ongoing conditions, for one [SV] at one [Epoch].
#[derive(Debug, Clone, Copy)]
pub struct BiasRuntime {
    /// [Epoch] of reception
    pub t: Epoch,
    /// [SV]
    pub sv: SV,
    /// Receiver [Position]
    pub rx: Position,
    /// SV ECEF position (m)
    pub sv_position: Vector3<f64>,
    /// SV (elevation, azimuth) seen from receiver, in degrees
    pub sv_elevation_azimuth_deg_deg: (f64, f64),
    /// Signal carrier frequency (Hz)
    pub frequency_hz: f64,
    /// Broadcast [IonosphereModel]
    pub ionosphere: IonosphereModel,
}

impl BiasRuntime {
    /// SV elevation (degrees)
    pub fn elevation_deg(&self) -> f64 {
        self.sv_elevation_azimuth_deg_deg.0
    }
    /// SV azimuth (degrees)
    pub fn azimuth_deg(&self) -> f64 {
        self.sv_elevation_azimuth_deg_deg.1
    }
}

/// Any range [Correction] term. Implementations are pure: the returned value
/// only depends on the provided [BiasRuntime]. You can implement your own
/// and register it in the [CorrectionChain].
pub trait Correction {
    /// Readable name of this term
    fn name(&self) -> &'static str;

    /// Returns the range correction (m) for this [BiasRuntime].
    /// The correction is added to the geometric range.
    fn correction_m(&self, rtm: &BiasRuntime) -> f64;
}

/// Per term values of one [CorrectionChain] evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionReport {
    /// (name, value in meters), in registration order
    pub terms: Vec<(&'static str, f64)>,
}

impl CorrectionReport {
    /// Accumulated correction (m)
    pub fn total_m(&self) -> f64 {
        self.terms.iter().map(|(_, value)| value).sum()
    }

    /// Returns value of this named term, if it was evaluated
    pub fn get(&self, name: &str) -> Option<f64> {
        self.terms
            .iter()
            .find(|(term, _)| *term == name)
            .map(|(_, value)| *value)
    }
}

impl std::fmt::Display for CorrectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.terms
                .iter()
                .map(|(name, value)| format!("{}={:.3}m", name, value))
                .join(", ")
        )
    }
}

/// [CorrectionChain] sums the registered [Correction]s, in deterministic order.
#[derive(Default)]
pub struct CorrectionChain {
    terms: Vec<Box<dyn Correction + Send + Sync>>,
}

impl std::fmt::Debug for CorrectionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.terms.iter().map(|term| term.name()))
            .finish()
    }
}

impl CorrectionChain {
    /// Builds the [CorrectionChain] this [Config] enables:
    /// ionosphere, troposphere then Shapiro delay.
    pub fn from_config(cfg: &Config) -> Self {
        let Modeling {
            iono_delay,
            tropo_delay,
            relativistic_path_range,
            ..
        } = cfg.modeling;

        let mut chain = Self::default();
        if iono_delay {
            chain.push(IonosphereDelay);
        }
        if tropo_delay {
            chain.push(cfg.tropo_model);
        }
        if relativistic_path_range {
            chain.push(ShapiroDelay);
        }
        chain
    }

    /// Registers a new [Correction], evaluated after existing ones.
    pub fn push<C: Correction + Send + Sync + 'static>(&mut self, correction: C) {
        self.terms.push(Box::new(correction));
    }

    /// Number of registered terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no term is registered
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates all terms for this [BiasRuntime]
    pub fn evaluate(&self, rtm: &BiasRuntime) -> CorrectionReport {
        CorrectionReport {
            terms: self
                .terms
                .iter()
                .map(|term| (term.name(), term.correction_m(rtm)))
                .collect(),
        }
    }
}
