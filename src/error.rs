use thiserror::Error;

use crate::prelude::{Constellation, Epoch, SV};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Not enough candidates were proposed to the solver. This is not
    /// an actual failure: we simply do not have a fix for this epoch.
    #[error("not enough candidates provided: {0}")]
    NotEnoughCandidates(usize),

    /// No [Ephemeris] frame could be found for this [SV], or the closest
    /// frame has expired.
    #[error("{0}({1}) - failed getting ephemeris data")]
    MissingEphemeris(Epoch, SV),

    /// Closest [Ephemeris] frame is flagged as unhealthy.
    #[error("{0}({1}) - unhealthy satellite")]
    UnhealthyEphemeris(Epoch, SV),

    /// Kepler equation solving did not converge within the iteration limit.
    #[error("{0}({1}) - kepler solver in failure")]
    KeplerNonConvergence(Epoch, SV),

    /// Orbit model is not supported for this constellation
    #[error("orbit propagation is not supported for {0}")]
    UnsupportedOrbitModel(Constellation),

    /// Navigation requires at least one enabled constellation
    #[error("no constellation enabled")]
    NoConstellation,

    /// No processor is defined for this constellation
    #[error("no processor for constellation {0}")]
    UnsupportedConstellation(Constellation),

    /// Physical non sense due to bad signal data or invalid orbital state, will cause us
    /// abort with this message.
    #[error("physical non sense: rx prior tx")]
    PhysicalNonSenseRxPriorTx,

    /// Physical non sense due to bad signal data or invalid orbital state, will cause us
    /// abort with this message.
    #[error("physical non sense: t_rx is too late")]
    PhysicalNonSenseRxTooLate,

    /// Receiver clock has not been latched yet (no valid clock sample).
    #[error("receiver clock is not latched")]
    UnlatchedClock,

    /// Invalid orbital states or bad signal data may cause the algebric calculations
    /// to wind up here: collinear or too few vehicles.
    #[error("failed to invert matrix")]
    MatrixInversion,

    /// The iterative solver diverged to a non physical state.
    #[error("solver diverged to an invalid state")]
    Divergence,

    #[error("unknown SV timescale: cannot proceed")]
    UnknownTimescale,
}
