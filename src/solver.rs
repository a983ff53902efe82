//! Weighted least squares position solver
use itertools::Itertools;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector, Matrix4, MatrixXx4, Vector4};

use crate::{
    cfg::SolverOpts,
    error::Error,
    observation::SatelliteObservation,
    position::Position,
    prelude::{Epoch, TimeScale, Vector3},
    solutions::{DilutionOfPrecision, PVTSolution, SVContribution},
    time::time_of_week,
};

/// One row of the navigation system
#[derive(Debug, Clone)]
struct Row<'a> {
    obs: &'a SatelliteObservation,
    sv_position: Vector3<f64>,
    pseudo_range_m: f64,
    sv_clock_m: f64,
    correction_m: f64,
    weight: f64,
}

impl Row<'_> {
    /// Predicted pseudo range (m) from this receiver state
    fn predicted_m(&self, rx: &Vector3<f64>, clock_bias_m: f64) -> f64 {
        let rho = (self.sv_position - rx).norm();
        rho + clock_bias_m - self.sv_clock_m + self.correction_m
    }
}

/// [Solver] resolves the receiver position and clock bias from a set of
/// resolved [SatelliteObservation]s, by iterated weighted least squares
/// (Gauss-Newton).
#[derive(Debug, Clone, Default)]
pub struct Solver {
    opts: SolverOpts,
}

impl Solver {
    /// Builds a new [Solver]
    pub fn new(opts: SolverOpts) -> Self {
        Self { opts }
    }

    /// Forms the navigation rows, observations that are not fully resolved are skipped.
    fn rows<'a>(&self, observations: &[&'a SatelliteObservation]) -> Vec<Row<'a>> {
        observations
            .iter()
            .filter_map(|&obs| {
                let state = obs.state?;
                Some(Row {
                    obs,
                    sv_position: state.position,
                    pseudo_range_m: obs.pseudo_range_m?,
                    sv_clock_m: state.clock_range_m(),
                    correction_m: obs.correction_m(),
                    weight: self.opts.weighting.weight(obs.cn0_dbhz),
                })
            })
            .collect()
    }

    /// Design matrix and prefit residuals, at this receiver state
    fn linearize(
        rows: &[Row],
        rx: &Vector3<f64>,
        clock_bias_m: f64,
    ) -> (MatrixXx4<f64>, DVector<f64>) {
        let mut h = MatrixXx4::<f64>::zeros(rows.len());
        let mut b = DVector::<f64>::zeros(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let los = rx - row.sv_position;
            let rho = los.norm();
            h[(i, 0)] = los[0] / rho;
            h[(i, 1)] = los[1] / rho;
            h[(i, 2)] = los[2] / rho;
            h[(i, 3)] = 1.0;
            b[i] = row.pseudo_range_m - row.predicted_m(rx, clock_bias_m);
        }

        (h, b)
    }

    /// Resolves a [PVTSolution] at this [Epoch], starting from this apriori [Position].
    /// The solution timestamp is expressed in desired [TimeScale].
    ///
    /// ## Returns
    /// - [Error::NotEnoughCandidates] when less than the minimal number of [SV]s are proposed
    /// - [Error::MatrixInversion] on singular geometry
    /// - [Error::Divergence] when the estimate is no longer a number
    /// - [PVTSolution] otherwise, possibly flagged as not converged
    pub fn solve(
        &self,
        t: Epoch,
        timescale: TimeScale,
        apriori: &Position,
        observations: &[&SatelliteObservation],
    ) -> Result<PVTSolution, Error> {
        let rows = self.rows(observations);
        if rows.len() < self.opts.min_sv {
            return Err(Error::NotEnoughCandidates(rows.len()));
        }

        let w = DMatrix::<f64>::from_diagonal(&DVector::from_iterator(
            rows.len(),
            rows.iter().map(|row| row.weight),
        ));

        let mut rx = apriori.ecef();
        let mut clock_bias_m = 0.0_f64;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.opts.max_iterations {
            let (h, b) = Self::linearize(&rows, &rx, clock_bias_m);

            let ht = h.transpose();
            let ht_w = &ht * &w;
            let ht_w_h = &ht_w * &h;
            let ht_w_h_inv = ht_w_h.try_inverse().ok_or(Error::MatrixInversion)?;

            let dx: Vector4<f64> = ht_w_h_inv * (ht_w * b);

            rx += Vector3::new(dx[0], dx[1], dx[2]);
            clock_bias_m += dx[3];
            iterations += 1;

            if !rx.iter().all(|x| x.is_finite()) || !clock_bias_m.is_finite() {
                return Err(Error::Divergence);
            }

            let dx_norm = (dx[0].powi(2) + dx[1].powi(2) + dx[2].powi(2)).sqrt();
            debug!("{} : iter={} |dx|={:.6}m", t, iterations, dx_norm);

            if dx_norm < self.opts.convergence_m {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "{} : solver did not converge within {} iterations",
                t, self.opts.max_iterations
            );
        }

        let (h, residuals) = Self::linearize(&rows, &rx, clock_bias_m);
        let q: Matrix4<f64> = (h.transpose() * &h)
            .try_inverse()
            .ok_or(Error::MatrixInversion)?;

        let position = Position::from_ecef(rx);
        let geo = position.geodetic();
        let dop = DilutionOfPrecision::new(&q, geo[0], geo[1]);

        let sv = rows
            .iter()
            .zip(residuals.iter())
            .map(|(row, residual)| SVContribution {
                sv: row.obs.sv,
                unique_id: row.obs.unique_id.clone(),
                weight: row.weight,
                residual_m: *residual,
                correction_m: row.correction_m,
                elevation_deg: row.obs.elevation_deg(),
            })
            .collect::<Vec<_>>();

        let (week, tow_s) = time_of_week(t, timescale);

        info!(
            "{} : new solution x={:.3}m y={:.3}m z={:.3}m clock={:.3}m gdop={:.2} [{}]",
            t,
            rx[0],
            rx[1],
            rx[2],
            clock_bias_m,
            dop.gdop,
            sv.iter().map(|contrib| &contrib.unique_id).join(", ")
        );

        let (lat_ddeg, long_ddeg, alt_m) = position.geodetic_ddeg();

        Ok(PVTSolution {
            t,
            timescale,
            week,
            tow_s,
            pos_m: (rx[0], rx[1], rx[2]),
            lat_long_alt_deg_deg_m: (lat_ddeg, long_ddeg, alt_m),
            clock_bias_m,
            sv,
            dop,
            iterations,
            converged,
        })
    }
}
