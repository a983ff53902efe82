//! Per constellation measurement processing
use log::{debug, error};

use crate::{
    bias::{BiasRuntime, CorrectionChain},
    cfg::ConstellationSetup,
    ephemeris::{EphemerisLookup, EphemerisStore},
    error::Error,
    measurement::{Measurement, MeasurementEvent},
    observation::{ExclusionCause, SatelliteObservation},
    orbit::Propagator,
    position::Position,
    prelude::{Constellation, Epoch},
    time::{ClockLatch, ReceptionTime},
};

mod galileo;
mod gps;

/// Supported constellation processors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProcessorKind {
    /// GPS L1 C/A
    Gps,
    /// Galileo E1
    Galileo,
}

impl ProcessorKind {
    /// Selects the [ProcessorKind] for this [Constellation]
    pub fn from_constellation(constellation: Constellation) -> Result<Self, Error> {
        match constellation {
            Constellation::GPS => Ok(Self::Gps),
            Constellation::Galileo => Ok(Self::Galileo),
            c => Err(Error::UnsupportedConstellation(c)),
        }
    }

    /// [Constellation] this [ProcessorKind] handles
    pub fn constellation(&self) -> Constellation {
        match self {
            Self::Gps => Constellation::GPS,
            Self::Galileo => Constellation::Galileo,
        }
    }

    fn pseudo_range(&self, rx: &ReceptionTime, meas: &Measurement) -> Option<f64> {
        match self {
            Self::Gps => gps::pseudo_range(rx, meas),
            Self::Galileo => galileo::pseudo_range(rx, meas),
        }
    }
}

/// [EpochObservations] of one constellation. Each [SV] is either
/// `used` or `unused`, never both. Rebuilt from scratch every epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochObservations {
    /// [Constellation]
    pub constellation: Constellation,
    /// Reception [Epoch], expressed in [crate::prelude::TimeScale::GPST]
    pub t: Epoch,
    /// Week number
    pub week: u32,
    /// Time of week (s)
    pub tow_s: f64,
    /// Observations that may contribute to the solution
    pub used: Vec<SatelliteObservation>,
    /// Excluded observations
    pub unused: Vec<SatelliteObservation>,
    /// Number of [SV]s in sight that were excluded
    pub visible_not_used: usize,
}

impl EpochObservations {
    /// Applies this stage to every used observation.
    /// Observations the stage excludes are moved to the unused list.
    fn stage<F: Fn(&SatelliteObservation) -> SatelliteObservation>(self, f: F) -> Self {
        let (used, excluded): (Vec<_>, Vec<_>) =
            self.used.iter().map(f).partition(|obs| obs.is_used());

        for obs in excluded.iter() {
            if let Some(cause) = &obs.exclusion {
                debug!("{} ({}) : excluded - {}", self.t, obs.sv, cause);
            }
        }

        let visible_not_used = self.visible_not_used + excluded.len();
        let mut unused = self.unused;
        unused.extend(excluded);

        Self {
            used,
            unused,
            visible_not_used,
            ..self
        }
    }

    /// Resolves ephemeris and [crate::orbit::SatelliteState] at transmission time,
    /// for every used observation.
    pub fn resolve_orbits(
        self,
        ephemeris: &EphemerisStore,
        propagator: &Propagator,
        rx_clock_s: f64,
    ) -> Self {
        let t = self.t;
        self.stage(|obs| {
            let eph = match ephemeris.find(t, obs.sv) {
                EphemerisLookup::Found(eph) => eph,
                EphemerisLookup::Unhealthy => {
                    return obs.excluded(ExclusionCause::Unhealthy);
                },
                EphemerisLookup::NotFound => {
                    error!("{} ({}) : failed getting ephemeris data", t, obs.sv);
                    return obs.excluded(ExclusionCause::MissingEphemeris);
                },
            };

            let Some(pr) = obs.pseudo_range_m else {
                return obs.excluded(ExclusionCause::InvalidState);
            };

            match propagator.propagate(&eph, t, pr, rx_clock_s) {
                Ok(state) => {
                    let mut obs = obs.clone();
                    obs.state = Some(state);
                    obs
                },
                Err(e) => {
                    error!("{} ({}) : {}", t, obs.sv, e);
                    obs.excluded(ExclusionCause::Propagation(e))
                },
            }
        })
    }

    /// Computes the topocentric geometry seen from this receiver [Position],
    /// then evaluates the [CorrectionChain].
    pub fn apply_corrections(
        self,
        rx: &Position,
        chain: &CorrectionChain,
        ephemeris: &EphemerisStore,
        nominal_frequency_hz: f64,
    ) -> Self {
        let t = self.t;
        let ionosphere = ephemeris.ionosphere();
        self.stage(|obs| {
            let Some(state) = obs.state else {
                return obs.excluded(ExclusionCause::MissingEphemeris);
            };

            let elevation_azimuth = rx.elevation_azimuth(&state.position);

            let rtm = BiasRuntime {
                t,
                sv: obs.sv,
                rx: *rx,
                sv_position: state.position,
                sv_elevation_azimuth_deg_deg: elevation_azimuth,
                frequency_hz: obs.carrier_frequency_hz.unwrap_or(nominal_frequency_hz),
                ionosphere,
            };

            let report = chain.evaluate(&rtm);

            debug!(
                "{} ({}) : elev={:.2}° azim={:.2}° {}",
                t, obs.sv, elevation_azimuth.0, elevation_azimuth.1, report
            );

            let mut obs = obs.clone();
            obs.elevation_azimuth_deg = Some(elevation_azimuth);
            obs.corrections = Some(report);
            obs
        })
    }

    /// Excludes every observation below this elevation mask (degrees)
    pub fn apply_mask(self, min_elevation_deg: f64) -> Self {
        self.stage(|obs| match obs.elevation_deg() {
            Some(elev) if elev < min_elevation_deg => {
                obs.excluded(ExclusionCause::ElevationMask(elev))
            },
            Some(_) => obs.clone(),
            None => obs.excluded(ExclusionCause::NoApriori),
        })
    }

    /// Moves all used observations to the unused list, with this cause.
    pub(crate) fn exclude_all(self, cause: ExclusionCause) -> Self {
        self.stage(|obs| obs.excluded(cause.clone()))
    }
}

/// [ConstellationProcessor] turns raw [Measurement]s of one constellation
/// into [EpochObservations]. The only state carried from one epoch to
/// the next is the latched receiver clock bias.
#[derive(Debug, Clone)]
pub struct ConstellationProcessor {
    kind: ProcessorKind,
    setup: ConstellationSetup,
    latch: ClockLatch,
}

impl ConstellationProcessor {
    /// Builds a new [ConstellationProcessor] for this [ConstellationSetup]
    pub fn new(setup: ConstellationSetup) -> Result<Self, Error> {
        Ok(Self {
            kind: ProcessorKind::from_constellation(setup.constellation)?,
            setup,
            latch: ClockLatch::default(),
        })
    }

    /// [ProcessorKind]
    pub fn kind(&self) -> ProcessorKind {
        self.kind
    }

    /// [ConstellationSetup]
    pub fn setup(&self) -> &ConstellationSetup {
        &self.setup
    }

    /// Forget the latched receiver clock bias, to follow a receiver clock
    /// re-synchronization. Next [MeasurementEvent] will latch a new value.
    pub fn reset_clock(&mut self) {
        self.latch.reset();
    }

    /// Forms pseudo ranges from this [MeasurementEvent].
    /// Measurements of other constellations or carrier frequencies are ignored.
    pub fn observe(&mut self, event: &MeasurementEvent) -> Result<EpochObservations, Error> {
        let full_bias_nanos = self.latch.latch(&event.clock).ok_or(Error::UnlatchedClock)?;
        let reception = ReceptionTime::new(&event.clock, full_bias_nanos, 0.0)?;
        let constellation = self.kind.constellation();

        let mut used = Vec::new();
        let mut unused = Vec::new();

        for meas in event.measurements.iter() {
            if meas.sv.constellation != constellation {
                continue;
            }

            if let Some(frequency) = meas.carrier_frequency_hz {
                if !self.setup.frequency_match(frequency) {
                    continue;
                }
            }

            let rx = ReceptionTime::new(&event.clock, full_bias_nanos, meas.time_offset_nanos)?;
            let pr = self.kind.pseudo_range(&rx, meas);

            let obs = SatelliteObservation::new(
                meas.sv,
                &self.setup.signal,
                pr,
                meas.cn0_dbhz,
                meas.carrier_frequency_hz,
            );

            match pr {
                Some(pr) => {
                    debug!(
                        "{} ({}) : pr={:.3}m state={:?}",
                        reception.epoch(),
                        meas.sv,
                        pr,
                        meas.state
                    );
                    used.push(obs);
                },
                None => {
                    debug!(
                        "{} ({}) : invalid state {:?}",
                        reception.epoch(),
                        meas.sv,
                        meas.state
                    );
                    unused.push(obs);
                },
            }
        }

        Ok(EpochObservations {
            constellation,
            t: reception.epoch(),
            week: reception.week,
            tow_s: reception.tow_seconds(),
            visible_not_used: unused.len(),
            used,
            unused,
        })
    }

    /// Runs all processing stages for this [MeasurementEvent]: pseudo ranges,
    /// orbits, corrections then elevation mask. Without receiver [Position], the
    /// geometry cannot be resolved and all [SV]s end up unused.
    pub fn process(
        &mut self,
        event: &MeasurementEvent,
        rx: Option<&Position>,
        rx_clock_s: f64,
        ephemeris: &EphemerisStore,
        propagator: &Propagator,
        chain: &CorrectionChain,
    ) -> Result<EpochObservations, Error> {
        let observations = self
            .observe(event)?
            .resolve_orbits(ephemeris, propagator, rx_clock_s);

        match rx {
            Some(rx) => Ok(observations
                .apply_corrections(rx, chain, ephemeris, self.setup.carrier_frequency_hz)
                .apply_mask(self.setup.min_elevation_deg)),
            None => Ok(observations.exclude_all(ExclusionCause::NoApriori)),
        }
    }
}
