use log::{debug, error};
use nalgebra::{Rotation3, SMatrix, Vector4};

use crate::{
    constants::{
        EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_MU_M3_S2, GPS_GRAVITATION_MU_M3_S2,
        SPEED_OF_LIGHT_M_S,
    },
    ephemeris::Ephemeris,
    error::Error,
    prelude::{Constellation, Epoch, Vector3},
    time::{time_of_week, wrap_half_week},
};

/// Kepler equation is solved to this precision (in radians)
const KEPLER_TOLERANCE_RAD: f64 = 1.0E-12;

/// Kepler solver gives up after this many iterations
const KEPLER_MAX_ITER: usize = 15;

/// Returns (gravitational constant, earth rotation rate) that the [Constellation] ICD uses
fn orbit_constants(constellation: Constellation) -> Result<(f64, f64), Error> {
    match constellation {
        Constellation::GPS | Constellation::QZSS => {
            Ok((GPS_GRAVITATION_MU_M3_S2, EARTH_ANGULAR_VEL_RAD))
        },
        Constellation::Galileo => Ok((EARTH_GRAVITATION_MU_M3_S2, EARTH_ANGULAR_VEL_RAD)),
        c => Err(Error::UnsupportedOrbitModel(c)),
    }
}

/// Solves Kepler equation M = E - e sin(E) for the eccentric anomaly E,
/// using Newton-Raphson. Returns None on non convergence.
pub(crate) fn eccentric_anomaly(m: f64, e: f64) -> Option<f64> {
    let mut e_k = m;
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (e_k - e * e_k.sin() - m) / (1.0 - e * e_k.cos());
        e_k -= delta;
        if delta.abs() < KEPLER_TOLERANCE_RAD {
            return Some(e_k);
        }
    }
    None
}

/// [Kepler] state resolved at a specific instant, with
/// the first derivative of each corrected term.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kepler {
    /// Argument of latitude (corrected)
    pub u_k: f64,
    /// Radius (corrected)
    pub r_k: f64,
    /// Orbital inclination (corrected)
    pub i_k: f64,
    /// Longitude of ascending node
    pub omega_k: f64,
    /// First derivative of argument of latitude
    pub fd_u_k: f64,
    /// First derivative of radius
    pub fd_r_k: f64,
    /// First derivative of inclination
    pub fd_i_k: f64,
    /// First derivative of longitude of ascending node
    pub fd_omega_k: f64,
    /// Relativistic clock correction (s)
    pub dtr: f64,
}

impl Kepler {
    /// Position within the orbital plane
    fn orbit_position(&self) -> (f64, f64) {
        let (sin_u_k, cos_u_k) = self.u_k.sin_cos();
        (self.r_k * cos_u_k, self.r_k * sin_u_k)
    }

    /// Velocity within the orbital plane
    fn orbit_velocity(&self) -> (f64, f64) {
        let (sin_u_k, cos_u_k) = self.u_k.sin_cos();
        let fd_x = self.fd_r_k * cos_u_k - self.r_k * self.fd_u_k * sin_u_k;
        let fd_y = self.fd_r_k * sin_u_k + self.r_k * self.fd_u_k * cos_u_k;
        (fd_x, fd_y)
    }

    /// Orbital plane to ECEF rotation
    fn rotation(&self) -> Rotation3<f64> {
        let rot_x3 = Rotation3::from_axis_angle(&Vector3::x_axis(), self.i_k);
        let rot_z3 = Rotation3::from_axis_angle(&Vector3::z_axis(), self.omega_k);
        rot_z3 * rot_x3
    }

    /// ECEF position (m)
    pub fn ecef_position(&self) -> Vector3<f64> {
        let (x, y) = self.orbit_position();
        self.rotation() * Vector3::new(x, y, 0.0)
    }

    /// ECEF velocity (m/s)
    pub fn ecef_velocity(&self) -> Vector3<f64> {
        let (x, y) = self.orbit_position();
        let (fd_x, fd_y) = self.orbit_velocity();
        let (sin_omega_k, cos_omega_k) = self.omega_k.sin_cos();
        let (sin_i_k, cos_i_k) = self.i_k.sin_cos();

        let mut fd_r = SMatrix::<f64, 3, 4>::zeros();
        fd_r[(0, 0)] = cos_omega_k;
        fd_r[(0, 1)] = -sin_omega_k * cos_i_k;
        fd_r[(0, 2)] = -(x * sin_omega_k + y * cos_omega_k * cos_i_k);
        fd_r[(0, 3)] = y * sin_omega_k * sin_i_k;
        fd_r[(1, 0)] = sin_omega_k;
        fd_r[(1, 1)] = cos_omega_k * cos_i_k;
        fd_r[(1, 2)] = x * cos_omega_k - y * sin_omega_k * cos_i_k;
        fd_r[(1, 3)] = -y * cos_omega_k * sin_i_k;
        fd_r[(2, 1)] = sin_i_k;
        fd_r[(2, 3)] = y * cos_i_k;

        fd_r * Vector4::new(fd_x, fd_y, self.fd_omega_k, self.fd_i_k)
    }
}

impl Ephemeris {
    /// Resolves Kepler equations at this [Epoch], which may be expressed in any timescale.
    pub(crate) fn kepler(&self, t: Epoch) -> Result<Kepler, Error> {
        let (mu, omega_e) = orbit_constants(self.sv.constellation)?;
        let timescale = self
            .sv
            .constellation
            .timescale()
            .ok_or(Error::UnknownTimescale)?;

        let t = t.to_time_scale(timescale);
        let t_k = wrap_half_week((t - self.toe.to_time_scale(timescale)).to_seconds());
        let (_, toe_sow) = time_of_week(self.toe, timescale);

        let e = self.eccentricity;
        let a = self.semi_major_axis_m();

        let (cus, cuc) = self.cus_cuc_rad;
        let (cis, cic) = self.cis_cic_rad;
        let (crs, crc) = self.crs_crc_m;

        let n0 = (mu / a.powi(3)).sqrt();
        let n = n0 + self.dn_rad;
        let m_k = self.m0_rad + n * t_k;

        let e_k = eccentric_anomaly(m_k, e).ok_or_else(|| {
            error!("{}({}) - kepler solver in failure", t, self.sv);
            Error::KeplerNonConvergence(t, self.sv)
        })?;

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let one_minus_ecos = 1.0 - e * cos_e_k;
        let sqrt_1_e2 = (1.0 - e.powi(2)).sqrt();

        let v_k = (sqrt_1_e2 * sin_e_k).atan2(cos_e_k - e);
        let phi_k = v_k + self.omega_rad;
        let (sin_2phi, cos_2phi) = (2.0 * phi_k).sin_cos();

        let u_k = phi_k + cuc * cos_2phi + cus * sin_2phi;
        let r_k = a * one_minus_ecos + crc * cos_2phi + crs * sin_2phi;
        let i_k = self.i0_rad + self.idot_rad_s * t_k + cic * cos_2phi + cis * sin_2phi;
        let omega_k =
            self.omega0_rad + (self.omega_dot_rad_s - omega_e) * t_k - omega_e * toe_sow;

        // derivatives
        let fd_e_k = n / one_minus_ecos;
        let fd_phi_k = sqrt_1_e2 * fd_e_k / one_minus_ecos;
        let fd_u_k = fd_phi_k * (1.0 + 2.0 * (cus * cos_2phi - cuc * sin_2phi));
        let fd_r_k =
            a * e * sin_e_k * fd_e_k + 2.0 * fd_phi_k * (crs * cos_2phi - crc * sin_2phi);
        let fd_i_k = self.idot_rad_s + 2.0 * fd_phi_k * (cis * cos_2phi - cic * sin_2phi);
        let fd_omega_k = self.omega_dot_rad_s - omega_e;

        let dtr = -2.0 * mu.sqrt() / SPEED_OF_LIGHT_M_S.powi(2) * e * self.sqrt_a * sin_e_k;

        debug!(
            "{}({}) - kepler t_k={:.3}s e_k={:.9} r_k={:.3}m",
            t, self.sv, t_k, e_k, r_k
        );

        Ok(Kepler {
            u_k,
            r_k,
            i_k,
            omega_k,
            fd_u_k,
            fd_r_k,
            fd_i_k,
            fd_omega_k,
            dtr,
        })
    }

    /// Onboard clock offset to system time at this [Epoch] (s),
    /// from the clock correction polynomial.
    pub fn clock_correction(&self, t: Epoch) -> Result<f64, Error> {
        let timescale = self
            .sv
            .constellation
            .timescale()
            .ok_or(Error::UnknownTimescale)?;
        let dt = wrap_half_week(
            (t.to_time_scale(timescale) - self.toc.to_time_scale(timescale)).to_seconds(),
        );
        let (a0, a1, a2) = self.clock_polynomials;
        Ok(a0 + a1 * dt + a2 * dt.powi(2))
    }

    /// Resolves ECEF (position (m), velocity (m/s)) at this [Epoch],
    /// without light time nor earth rotation corrections.
    pub fn resolve_state(&self, t: Epoch) -> Result<(Vector3<f64>, Vector3<f64>), Error> {
        let kepler = self.kepler(t)?;
        Ok((kepler.ecef_position(), kepler.ecef_velocity()))
    }
}
