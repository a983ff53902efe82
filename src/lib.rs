#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod aggregator;
mod bias;
mod cfg;
mod constants;
mod ephemeris;
mod error;
mod measurement;
mod navigator;
mod observation;
mod orbit;
mod position;
mod processor;
mod solutions;
mod solver;
mod time;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::aggregator::EpochAggregate;
    pub use crate::bias::{
        BiasRuntime, Correction, CorrectionChain, CorrectionReport, IonosphereDelay,
        IonosphereModel, KbModel, ShapiroDelay, TropoModel,
    };
    pub use crate::cfg::{
        Config, ConstellationSetup, Error as ConfigError, Modeling, SnrWeighting, SolverOpts,
        Weighting,
    };
    pub use crate::ephemeris::{Ephemeris, EphemerisLookup, EphemerisStore, SharedEphemeris};
    pub use crate::error::Error;
    pub use crate::measurement::{Measurement, MeasurementEvent, MeasurementState};
    pub use crate::navigator::{EpochOutcome, Navigator};
    pub use crate::observation::{ExclusionCause, SatelliteObservation};
    pub use crate::orbit::{Propagator, SatelliteState};
    pub use crate::position::Position;
    pub use crate::processor::{ConstellationProcessor, EpochObservations, ProcessorKind};
    pub use crate::solutions::{DilutionOfPrecision, PVTSolution, SVContribution, SolutionWriter};
    pub use crate::solver::Solver;
    pub use crate::time::{
        epoch_from_time_of_week, milliseconds_to_time_of_week, time_of_week,
        time_of_week_to_milliseconds, ClockLatch, ReceiverClock, ReceptionTime,
    };
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
