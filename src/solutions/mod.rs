//! PVT Solution
use std::io::Write;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    position::Position,
    prelude::{Duration, Epoch, TimeScale, SV},
};

mod dop;
pub use dop::DilutionOfPrecision;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Contribution of one [SV] to a [PVTSolution]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SVContribution {
    /// [SV]
    pub sv: SV,
    /// Unique identifier (like "E11_E1")
    pub unique_id: String,
    /// Weight in the least squares
    pub weight: f64,
    /// Post fit residual (m)
    pub residual_m: f64,
    /// Accumulated correction (m)
    pub correction_m: f64,
    /// Elevation (degrees), when resolved
    pub elevation_deg: Option<f64>,
}

/// [PVTSolution], one per successfully solved epoch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PVTSolution {
    /// [Epoch] of this solution
    pub t: Epoch,
    /// Timescale in which the timestamp is expressed
    pub timescale: TimeScale,
    /// Week number, in [Self::timescale]
    pub week: u32,
    /// Time of week (s), in [Self::timescale]
    pub tow_s: f64,
    /// Position in meters ECEF.
    pub pos_m: (f64, f64, f64),
    /// Latitude, longitude and altitude above mean sea level,
    /// in degrees and meters.
    pub lat_long_alt_deg_deg_m: (f64, f64, f64),
    /// Receiver clock bias, expressed as a range (m)
    pub clock_bias_m: f64,
    /// Space Vehicles that helped form this solution
    /// and data associated to each individual SV
    pub sv: Vec<SVContribution>,
    /// Geometry [DilutionOfPrecision]
    pub dop: DilutionOfPrecision,
    /// Number of iterations
    pub iterations: usize,
    /// False when the iteration cap was reached prior convergence.
    /// The solution is then the best available estimate.
    pub converged: bool,
}

impl PVTSolution {
    /// Receiver clock offset, rounded to the nanosecond.
    /// [Self::clock_bias_m] is the full precision value.
    pub fn clock_offset(&self) -> Duration {
        Duration::from_seconds(self.clock_bias_m / SPEED_OF_LIGHT_M_S)
    }

    /// Solution [Position]
    pub fn position(&self) -> Position {
        let (x, y, z) = self.pos_m;
        Position::from_ecef(crate::prelude::Vector3::new(x, y, z))
    }

    /// Returns the `timestamp,x,y,z` record of this solution,
    /// timestamp being the time of week in seconds.
    pub fn log_line(&self) -> String {
        let (x, y, z) = self.pos_m;
        format!("{},{},{},{}", self.tow_s, x, y, z)
    }
}

/// [SolutionWriter] streams [PVTSolution] records to any writer,
/// one `timestamp,x,y,z` line per solution.
pub struct SolutionWriter<W: Write> {
    writer: W,
}

impl<W: Write> SolutionWriter<W> {
    /// Builds new [SolutionWriter]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Appends this [PVTSolution]
    pub fn write(&mut self, solution: &PVTSolution) -> std::io::Result<()> {
        writeln!(self.writer, "{}", solution.log_line())
    }

    /// Flushes and returns the inner writer
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
