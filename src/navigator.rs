//! Epoch by epoch navigation pipeline
use log::{debug, error, warn};

use crate::{
    aggregator::EpochAggregate,
    bias::CorrectionChain,
    cfg::Config,
    constants::SPEED_OF_LIGHT_M_S,
    ephemeris::EphemerisStore,
    error::Error,
    measurement::MeasurementEvent,
    orbit::Propagator,
    position::Position,
    processor::ConstellationProcessor,
    solutions::PVTSolution,
    solver::Solver,
};

/// [EpochOutcome] of one [MeasurementEvent]
#[derive(Debug, Clone)]
pub struct EpochOutcome {
    /// Aggregated observations (used and unused)
    pub observations: EpochAggregate,
    /// [PVTSolution], when enough [crate::prelude::SV]s could be used
    /// and the solver did not fail.
    pub solution: Option<PVTSolution>,
    /// Solver failure, if any. Previous position is retained.
    pub failure: Option<Error>,
}

/// [Navigator] runs the complete pipeline for each [MeasurementEvent]:
/// pseudo ranges, orbits, corrections, masking, aggregation and solving.
/// It processes one event to completion before accepting the next one.
/// Wrap it in a [std::sync::Mutex] to share it between threads.
#[derive(Debug)]
pub struct Navigator {
    cfg: Config,
    processors: Vec<ConstellationProcessor>,
    propagator: Propagator,
    chain: CorrectionChain,
    solver: Solver,
    position: Option<Position>,
    solved: bool,
    clock_bias_m: f64,
    failures: usize,
}

impl Navigator {
    /// Builds a new [Navigator] from this [Config]
    pub fn new(cfg: Config) -> Result<Self, Error> {
        if cfg.constellations.is_empty() {
            return Err(Error::NoConstellation);
        }

        let processors = cfg
            .constellations
            .iter()
            .map(|setup| ConstellationProcessor::new(setup.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            processors,
            propagator: Propagator::new(cfg.modeling, cfg.solver.iterate_transmission_time),
            chain: CorrectionChain::from_config(&cfg),
            solver: Solver::new(cfg.solver.clone()),
            position: None,
            solved: false,
            clock_bias_m: 0.0,
            failures: 0,
            cfg,
        })
    }

    /// [Config] in use
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Mutable access to the [CorrectionChain], to register custom terms
    pub fn correction_chain_mut(&mut self) -> &mut CorrectionChain {
        &mut self.chain
    }

    /// Last known receiver [Position]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Number of epochs where the solver failed
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Forget the latched receiver clock biases,
    /// after a receiver clock re-synchronization.
    pub fn reset_clock(&mut self) {
        for processor in self.processors.iter_mut() {
            processor.reset_clock();
        }
    }

    /// Processes this [MeasurementEvent] to completion.
    ///
    /// ## Input
    /// - event: [MeasurementEvent]
    /// - apriori: coarse receiver [Position], if any. The latest one seeds
    ///   the solver until a first solution is obtained, it is ignored afterwards.
    /// - ephemeris: [EphemerisStore] snapshot
    ///
    /// ## Returns
    /// - [EpochOutcome], that may not contain a solution.
    /// - [Error] when the receiver time cannot be determined, for this epoch only.
    pub fn process(
        &mut self,
        event: &MeasurementEvent,
        apriori: Option<Position>,
        ephemeris: &EphemerisStore,
    ) -> Result<EpochOutcome, Error> {
        if !self.solved {
            if let Some(apriori) = apriori {
                debug!("seeding navigation with apriori {:?}", apriori.ecef());
                self.position = Some(apriori);
            }
        }

        let rx = self.position;
        if rx.is_none() {
            warn!("no receiver position: cannot resolve geometry");
        }

        let rx_clock_s = self.clock_bias_m / SPEED_OF_LIGHT_M_S;

        let mut constellations = Vec::with_capacity(self.processors.len());
        for processor in self.processors.iter_mut() {
            constellations.push(processor.process(
                event,
                rx.as_ref(),
                rx_clock_s,
                ephemeris,
                &self.propagator,
                &self.chain,
            )?);
        }

        let t = constellations
            .first()
            .map(|epoch| epoch.t)
            .ok_or(Error::NoConstellation)?;

        let observations = EpochAggregate::new(t, constellations);
        let used_count = observations.used_count();

        let (Some(rx), true) = (rx, used_count >= self.cfg.solver.min_sv) else {
            debug!(
                "{} : no fix ({} used, {} visible but not used)",
                t,
                used_count,
                observations.visible_not_used()
            );
            return Ok(EpochOutcome {
                observations,
                solution: None,
                failure: None,
            });
        };

        let solution = self
            .solver
            .solve(t, self.cfg.timescale, &rx, &observations.used());

        match solution {
            Ok(solution) => {
                self.position = Some(solution.position());
                self.solved = true;
                self.clock_bias_m = solution.clock_bias_m;
                Ok(EpochOutcome {
                    observations,
                    solution: Some(solution),
                    failure: None,
                })
            },
            Err(e) => {
                self.failures += 1;
                error!("{} : solver failure ({}) - {}", t, observations.used_ids(), e);
                Ok(EpochOutcome {
                    observations,
                    solution: None,
                    failure: Some(e),
                })
            },
        }
    }
}
